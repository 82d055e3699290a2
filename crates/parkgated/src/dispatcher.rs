//! Request dispatcher task

use parkgate_api::{Message, Reply};
use parkgate_ipc::{ReplySender, ServerMessage};
use parkgate_util::ChannelId;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::controller::SharedState;

/// Decides inbound messages against the shared state and sends the replies
pub struct Dispatcher<R> {
    state: SharedState,
    replies: R,
}

impl<R: ReplySender> Dispatcher<R> {
    pub fn new(state: SharedState, replies: R) -> Self {
        Self { state, replies }
    }

    /// Handle messages until shutdown is signalled or the transport closes
    pub async fn run(
        self,
        mut messages: mpsc::UnboundedReceiver<ServerMessage>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() {
                        debug!("Shutdown sender dropped");
                        break;
                    }
                }

                next = messages.recv() => match next {
                    Some(ServerMessage::Request(message)) => self.handle(message).await,
                    None => {
                        warn!("Request stream closed");
                        break;
                    }
                },
            }
        }

        info!("Dispatcher stopped");
    }

    /// Decide one message and send its reply
    pub async fn handle(&self, message: Message) {
        match message {
            Message::Hello(hello) => {
                let registered = {
                    let mut state = self.state.lock().await;
                    state.register_agent(&hello.agent, &hello.reply_channel)
                };
                let Some(current_hour) = registered else {
                    debug!(agent = %hello.agent, "Handshake after the day ended, not answered");
                    return;
                };

                self.deliver(&hello.reply_channel, Reply::Welcome { current_hour })
                    .await;
            }
            Message::Reservation(request) => {
                let decided = {
                    let mut state = self.state.lock().await;
                    state.admit(&request)
                };
                let Some(decision) = decided else {
                    debug!(agent = %request.agent, "Reservation after the day ended, not answered");
                    return;
                };

                info!(
                    agent = %request.agent,
                    family = %request.family,
                    requested_hour = request.requested_hour,
                    party_size = request.party_size,
                    classification = %decision.classification(),
                    assigned_hour = ?decision.hour(),
                    "Reservation decided"
                );

                let response = decision.to_response(&request);
                self.deliver(&request.reply_channel, Reply::Response(response))
                    .await;
            }
        }
    }

    async fn deliver(&self, channel: &ChannelId, reply: Reply) {
        if let Err(e) = self.replies.send_reply(channel, &reply).await {
            warn!(channel = %channel, error = %e, "Reply dropped");
        }
    }
}
