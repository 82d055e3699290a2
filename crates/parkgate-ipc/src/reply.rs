//! Reply delivery over requester-owned pipes

use async_trait::async_trait;
use futures::SinkExt;
use parkgate_api::{Reply, ReplyCodec};
use parkgate_util::ChannelId;
use std::time::Duration;
use tokio::net::unix::pipe;
use tokio::time::Instant;
use tokio_util::codec::FramedWrite;

use crate::{IpcError, IpcResult};

/// How often to retry opening a reply pipe whose reader has not shown up
const OPEN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Delivers one reply to one requester.
///
/// Delivery is at most once: a failure is reported to the caller, who
/// logs it and moves on.
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn send_reply(&self, channel: &ChannelId, reply: &Reply) -> IpcResult<()>;
}

/// Writes replies into the FIFO named by the requester
#[derive(Debug, Clone)]
pub struct FifoReplySender {
    timeout: Duration,
}

impl FifoReplySender {
    /// `timeout` bounds both waiting for the requester to open its end and
    /// the write itself
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn open(&self, channel: &ChannelId, deadline: Instant) -> IpcResult<pipe::Sender> {
        loop {
            match pipe::OpenOptions::new().open_sender(channel.as_path()) {
                Ok(sender) => return Ok(sender),
                // ENXIO: the pipe exists but nobody is reading it yet
                Err(e) if e.raw_os_error() == Some(nix::libc::ENXIO) => {
                    if Instant::now() >= deadline {
                        return Err(IpcError::ReplyTimeout(channel.clone()));
                    }
                    tokio::time::sleep(OPEN_POLL_INTERVAL).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl ReplySender for FifoReplySender {
    async fn send_reply(&self, channel: &ChannelId, reply: &Reply) -> IpcResult<()> {
        let deadline = Instant::now() + self.timeout;
        let sender = self.open(channel, deadline).await?;

        let mut frames = FramedWrite::new(sender, ReplyCodec::new());
        tokio::time::timeout_at(deadline, frames.send(reply.clone()))
            .await
            .map_err(|_| IpcError::ReplyTimeout(channel.clone()))??;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_fifo;
    use futures::StreamExt;
    use tempfile::tempdir;
    use tokio_util::codec::FramedRead;

    #[tokio::test]
    async fn test_delivers_to_open_reader() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reply.pipe");
        create_fifo(&path).unwrap();

        let receiver = pipe::OpenOptions::new()
            .read_write(true)
            .open_receiver(&path)
            .unwrap();

        let sender = FifoReplySender::new(Duration::from_millis(200));
        let channel = ChannelId::new(path.to_string_lossy().to_string());
        let reply = Reply::Welcome { current_hour: 11 };
        sender.send_reply(&channel, &reply).await.unwrap();

        let mut frames = FramedRead::new(receiver, ReplyCodec::new());
        let received = frames.next().await.unwrap().unwrap().unwrap();
        assert_eq!(received, reply);
    }

    #[tokio::test]
    async fn test_times_out_without_reader() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reply.pipe");
        create_fifo(&path).unwrap();

        let sender = FifoReplySender::new(Duration::from_millis(50));
        let channel = ChannelId::new(path.to_string_lossy().to_string());
        let result = sender
            .send_reply(&channel, &Reply::Welcome { current_hour: 7 })
            .await;
        assert!(matches!(result, Err(IpcError::ReplyTimeout(_))));
    }

    #[tokio::test]
    async fn test_missing_pipe_fails_fast() {
        let dir = tempdir().unwrap();
        let sender = FifoReplySender::new(Duration::from_secs(5));
        let channel = ChannelId::new(dir.path().join("nope.pipe").to_string_lossy().to_string());
        let result = sender
            .send_reply(&channel, &Reply::Welcome { current_hour: 7 })
            .await;
        assert!(matches!(result, Err(IpcError::Io(_))));
    }
}
