//! Agent-side client
//!
//! Sends one message per call and waits for its reply on a fresh reply
//! pipe, which is removed afterwards. There is no retry: a caller that
//! wants one decides its own policy.

use futures::{SinkExt, StreamExt};
use parkgate_api::{
    Hello, Message, MessageCodec, Reply, ReplyCodec, ReservationRequest, Response, encode_message,
};
use parkgate_util::{AgentName, ChannelId, FamilyName, Hour, reply_pipe_path};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::unix::pipe;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, warn};

use crate::{IpcError, IpcResult, create_fifo, remove_fifo};

const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for talking to parkgated as one agent
pub struct AgentClient {
    agent: AgentName,
    request_pipe: PathBuf,
    reply_dir: PathBuf,
    reply_timeout: Duration,
    next_channel: AtomicU64,
}

impl AgentClient {
    /// `reply_dir` is where this agent's reply pipes are created
    pub fn new(
        agent: impl Into<AgentName>,
        request_pipe: impl AsRef<Path>,
        reply_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            agent: agent.into(),
            request_pipe: request_pipe.as_ref().to_path_buf(),
            reply_dir: reply_dir.as_ref().to_path_buf(),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            next_channel: AtomicU64::new(1),
        }
    }

    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Handshake; returns the service's current simulated hour
    pub async fn hello(&self) -> IpcResult<Hour> {
        let channel = self.fresh_channel();
        let message = Message::Hello(Hello {
            agent: self.agent.clone(),
            reply_channel: channel.clone(),
        });

        match self.exchange(&channel, message).await? {
            Reply::Welcome { current_hour } => Ok(current_hour),
            other => Err(IpcError::UnexpectedReply(format!("{:?}", other))),
        }
    }

    /// Ask for a two-hour block starting at `hour` for `party_size` people
    pub async fn reserve(
        &self,
        family: impl Into<FamilyName>,
        hour: Hour,
        party_size: u32,
    ) -> IpcResult<Response> {
        let channel = self.fresh_channel();
        let message = Message::Reservation(ReservationRequest {
            agent: self.agent.clone(),
            family: family.into(),
            reply_channel: channel.clone(),
            requested_hour: hour,
            party_size,
        });

        match self.exchange(&channel, message).await? {
            Reply::Response(response) => Ok(response),
            other => Err(IpcError::UnexpectedReply(format!("{:?}", other))),
        }
    }

    fn fresh_channel(&self) -> ChannelId {
        let n = self.next_channel.fetch_add(1, Ordering::Relaxed);
        let base = reply_pipe_path(&self.reply_dir, self.agent.as_str());
        let path = base.with_extension(format!("{}.pipe", n));
        ChannelId::new(path.to_string_lossy().into_owned())
    }

    async fn exchange(&self, channel: &ChannelId, message: Message) -> IpcResult<Reply> {
        // Encode first so an over-long path fails before touching the filesystem
        encode_message(&message)?;

        create_fifo(channel.as_path())?;
        let result = self.send_and_wait(channel, message).await;
        remove_fifo(channel.as_path());
        result
    }

    async fn send_and_wait(&self, channel: &ChannelId, message: Message) -> IpcResult<Reply> {
        // Our end is open before the request leaves, so the service never
        // finds the reply pipe without a reader
        let reply_rx = pipe::OpenOptions::new()
            .read_write(true)
            .open_receiver(channel.as_path())?;

        let request_tx = pipe::OpenOptions::new().open_sender(&self.request_pipe)?;
        let mut requests = FramedWrite::new(request_tx, MessageCodec::new());
        requests.send(message).await?;
        drop(requests);

        debug!(agent = %self.agent, channel = %channel, "Request sent, waiting for reply");

        let mut replies = FramedRead::new(reply_rx, ReplyCodec::new());
        tokio::time::timeout(self.reply_timeout, next_reply(&mut replies, channel))
            .await
            .map_err(|_| IpcError::ResponseTimeout)?
    }
}

/// First well-formed reply on the pipe; bad frames are skipped
async fn next_reply(
    replies: &mut FramedRead<pipe::Receiver, ReplyCodec>,
    channel: &ChannelId,
) -> IpcResult<Reply> {
    while let Some(next) = replies.next().await {
        match next? {
            Ok(reply) => return Ok(reply),
            Err(e) => warn!(channel = %channel, error = %e, "Discarding bad reply frame"),
        }
    }
    Err(io::Error::from(io::ErrorKind::UnexpectedEof).into())
}
