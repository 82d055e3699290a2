//! IPC layer for parkgated
//!
//! Provides:
//! - The request pipe server (a named FIFO read by the service)
//! - Reply delivery over each requester's own FIFO
//! - A minimal agent client for sending one message and reading its reply

mod client;
mod fifo;
mod mock;
mod reply;
mod server;

pub use client::*;
pub use fifo::*;
pub use mock::*;
pub use reply::*;
pub use server::*;

use parkgate_api::{CodecError, FrameError};
use parkgate_util::ChannelId;
use thiserror::Error;

/// IPC errors
#[derive(Debug, Error)]
pub enum IpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Failed to create pipe: {0}")]
    CreatePipe(#[from] nix::Error),

    #[error("Reply channel {0} was not opened in time")]
    ReplyTimeout(ChannelId),

    #[error("Timed out waiting for a reply")]
    ResponseTimeout,

    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),

    #[error("Server error: {0}")]
    ServerError(String),
}

pub type IpcResult<T> = Result<T, IpcError>;

impl From<CodecError> for IpcError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::Io(e) => IpcError::Io(e),
            CodecError::Frame(e) => IpcError::Frame(e),
        }
    }
}
