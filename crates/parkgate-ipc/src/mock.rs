//! In-memory reply sender for testing

use async_trait::async_trait;
use parkgate_api::Reply;
use parkgate_util::ChannelId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::{IpcError, IpcResult, ReplySender};

/// Records every reply instead of writing it anywhere
#[derive(Debug, Clone, Default)]
pub struct MockReplySender {
    sent: Arc<Mutex<Vec<(ChannelId, Reply)>>>,

    /// Channels whose delivery fails, as if the requester went away
    fail_channels: Arc<Mutex<HashSet<ChannelId>>>,
}

impl MockReplySender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make delivery to `channel` fail
    pub fn fail_for(&self, channel: impl Into<ChannelId>) {
        self.fail_channels.lock().unwrap().insert(channel.into());
    }

    /// Replies delivered so far, in order
    pub fn sent(&self) -> Vec<(ChannelId, Reply)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplySender for MockReplySender {
    async fn send_reply(&self, channel: &ChannelId, reply: &Reply) -> IpcResult<()> {
        if self.fail_channels.lock().unwrap().contains(channel) {
            return Err(IpcError::ReplyTimeout(channel.clone()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel.clone(), reply.clone()));
        Ok(())
    }
}
