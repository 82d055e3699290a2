//! Request pipe server

use futures::StreamExt;
use parkgate_api::{FrameError, Message, MessageCodec};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::unix::pipe;
use tokio::sync::{Mutex, mpsc};
use tokio_util::codec::FramedRead;
use tracing::{debug, info, warn};

use crate::{IpcError, IpcResult, create_fifo, remove_fifo};

/// Message from the pipe reader to the service
#[derive(Debug)]
pub enum ServerMessage {
    /// A well-formed message read from the request pipe
    Request(Message),
}

/// IPC Server reading fixed-size frames from a named pipe
pub struct IpcServer {
    pipe_path: PathBuf,
    receiver: Mutex<Option<pipe::Receiver>>,
    message_tx: mpsc::UnboundedSender<ServerMessage>,
    message_rx: Arc<Mutex<Option<mpsc::UnboundedReceiver<ServerMessage>>>>,
}

impl IpcServer {
    /// Create a new IPC server
    pub fn new(pipe_path: impl AsRef<Path>) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();

        Self {
            pipe_path: pipe_path.as_ref().to_path_buf(),
            receiver: Mutex::new(None),
            message_tx,
            message_rx: Arc::new(Mutex::new(Some(message_rx))),
        }
    }

    /// Create the request pipe and open it for reading
    pub async fn start(&mut self) -> IpcResult<()> {
        create_fifo(&self.pipe_path)?;

        // Opening read-write keeps a writer on the pipe, so reads never hit
        // EOF between agents
        let receiver = pipe::OpenOptions::new()
            .read_write(true)
            .open_receiver(&self.pipe_path)?;

        info!(path = %self.pipe_path.display(), "IPC server listening");

        *self.receiver.get_mut() = Some(receiver);

        Ok(())
    }

    /// Get receiver for server messages
    pub async fn take_message_receiver(&self) -> Option<mpsc::UnboundedReceiver<ServerMessage>> {
        self.message_rx.lock().await.take()
    }

    /// Read frames in a loop, forwarding well-formed messages.
    ///
    /// Malformed frames are logged and dropped. Returns when the message
    /// receiver has been dropped, the pipe reaches end of stream, or reading
    /// fails. Can only run once per start.
    pub async fn run(&self) -> IpcResult<()> {
        let receiver = self
            .receiver
            .lock()
            .await
            .take()
            .ok_or_else(|| IpcError::ServerError("Server not started".into()))?;

        let mut frames = FramedRead::new(receiver, MessageCodec::new());

        while let Some(next) = frames.next().await {
            match next? {
                Ok(message) => {
                    if self.message_tx.send(ServerMessage::Request(message)).is_err() {
                        debug!("Message receiver dropped, stopping reader");
                        return Ok(());
                    }
                }
                Err(FrameError::Skipped(bytes)) => {
                    warn!(bytes, "Discarded unframed data on request pipe");
                }
                Err(e) => {
                    warn!(error = %e, "Discarded malformed frame");
                }
            }
        }

        debug!("Request pipe reached end of stream");
        Ok(())
    }

    /// Remove the request pipe
    pub fn shutdown(&self) {
        remove_fifo(&self.pipe_path);
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
