//! Message and reply types for the parkgated protocol

use parkgate_util::{AgentName, ChannelId, FamilyName, Hour};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hour sent back when a request is denied
pub const NO_HOUR: Hour = -1;

/// Messages an agent sends to the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Handshake announcing the agent and where to reply
    Hello(Hello),

    /// A reservation for one family
    Reservation(ReservationRequest),
}

impl Message {
    /// Reply channel named inline by the message
    pub fn reply_channel(&self) -> &ChannelId {
        match self {
            Message::Hello(hello) => &hello.reply_channel,
            Message::Reservation(request) => &request.reply_channel,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hello {
    pub agent: AgentName,
    pub reply_channel: ChannelId,
}

/// A group-visit request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub agent: AgentName,
    pub family: FamilyName,
    pub reply_channel: ChannelId,
    pub requested_hour: Hour,
    /// Always positive; frames carrying anything else are rejected
    pub party_size: u32,
}

/// Replies the service sends over a requester's reply channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Answer to a handshake, carrying the simulated hour
    Welcome { current_hour: Hour },

    /// Outcome of a reservation request
    Response(Response),
}

/// Outcome kind of a reservation, with its wire code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Accepted,
    Rescheduled,
    LateRescheduled,
    Denied,
}

impl Classification {
    pub fn code(self) -> i32 {
        match self {
            Classification::Accepted => 0,
            Classification::Rescheduled => 1,
            Classification::LateRescheduled => 2,
            Classification::Denied => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Classification::Accepted),
            1 => Some(Classification::Rescheduled),
            2 => Some(Classification::LateRescheduled),
            3 => Some(Classification::Denied),
            _ => None,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Classification::Accepted => "ACCEPTED",
            Classification::Rescheduled => "RESCHEDULED",
            Classification::LateRescheduled => "LATE_RESCHEDULED",
            Classification::Denied => "DENIED",
        };
        f.write_str(s)
    }
}

/// Reply to a reservation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub classification: Classification,
    /// Assigned hour, or [`NO_HOUR`] when denied
    pub assigned_hour: Hour,
    pub message: String,
}

impl Response {
    pub fn new(classification: Classification, assigned_hour: Hour, message: impl Into<String>) -> Self {
        Self {
            classification,
            assigned_hour,
            message: message.into(),
        }
    }

    pub fn denied(message: impl Into<String>) -> Self {
        Self::new(Classification::Denied, NO_HOUR, message)
    }
}
