//! Fixed-layout binary frames
//!
//! Every frame starts with [`PROTOCOL_MAGIC`] followed by a little-endian
//! `u32` kind tag. Text fields are NUL-padded UTF-8 and must contain at
//! least one NUL.
//!
//! Message frame ([`MESSAGE_FRAME_LEN`] bytes):
//!
//! ```text
//! magic[4] kind[4] agent[50] family[50] hour:i32 party:i32 reply_channel[100]
//! ```
//!
//! Reply frame ([`REPLY_FRAME_LEN`] bytes):
//!
//! ```text
//! magic[4] kind[4] classification:i32 hour:i32 message[100]
//! ```

use parkgate_util::{AgentName, ChannelId, FamilyName};
use thiserror::Error;

use crate::{Classification, Hello, Message, PROTOCOL_MAGIC, Reply, ReservationRequest, Response};

pub const NAME_FIELD_LEN: usize = 50;
pub const CHANNEL_FIELD_LEN: usize = 100;
pub const TEXT_FIELD_LEN: usize = 100;

pub const MESSAGE_FRAME_LEN: usize = 4 + 4 + NAME_FIELD_LEN * 2 + 4 + 4 + CHANNEL_FIELD_LEN;
pub const REPLY_FRAME_LEN: usize = 4 + 4 + 4 + 4 + TEXT_FIELD_LEN;

const KIND_HELLO: u32 = 1;
const KIND_RESERVATION: u32 = 2;
const KIND_WELCOME: u32 = 3;
const KIND_RESPONSE: u32 = 4;

const AGENT_AT: usize = 8;
const FAMILY_AT: usize = AGENT_AT + NAME_FIELD_LEN;
const HOUR_AT: usize = FAMILY_AT + NAME_FIELD_LEN;
const PARTY_AT: usize = HOUR_AT + 4;
const CHANNEL_AT: usize = PARTY_AT + 4;

const CLASS_AT: usize = 8;
const REPLY_HOUR_AT: usize = 12;
const TEXT_AT: usize = 16;

/// Frame decoding and encoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("Frame has {0} bytes, expected {1}")]
    WrongSize(usize, usize),

    #[error("Bad frame magic")]
    BadMagic,

    #[error("Unknown frame kind {0}")]
    UnknownKind(u32),

    #[error("Field '{0}' is not NUL-terminated")]
    Unterminated(&'static str),

    #[error("Field '{0}' is not valid UTF-8")]
    InvalidUtf8(&'static str),

    #[error("Field '{field}' is {len} bytes, limit is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Field '{0}' contains the frame magic")]
    ContainsMagic(&'static str),

    #[error("Reply channel is empty")]
    EmptyChannel,

    #[error("Party size must be positive, got {0}")]
    InvalidPartySize(i32),

    #[error("Unknown classification code {0}")]
    UnknownClassification(i32),

    #[error("Skipped {0} bytes of unframed data")]
    Skipped(usize),
}

pub type FrameResult<T> = Result<T, FrameError>;

/// Encode an inbound message into a message frame
pub fn encode_message(message: &Message) -> FrameResult<[u8; MESSAGE_FRAME_LEN]> {
    let mut frame = [0u8; MESSAGE_FRAME_LEN];
    frame[..4].copy_from_slice(&PROTOCOL_MAGIC);

    let channel = message.reply_channel();
    if channel.as_str().is_empty() {
        return Err(FrameError::EmptyChannel);
    }
    // Truncating a path would send the reply somewhere else
    if channel.as_str().len() >= CHANNEL_FIELD_LEN {
        return Err(FrameError::FieldTooLong {
            field: "reply_channel",
            len: channel.as_str().len(),
            max: CHANNEL_FIELD_LEN - 1,
        });
    }
    reject_magic("reply_channel", channel.as_str())?;
    put_text(&mut frame[CHANNEL_AT..CHANNEL_AT + CHANNEL_FIELD_LEN], channel.as_str());

    match message {
        Message::Hello(hello) => {
            put_u32(&mut frame, 4, KIND_HELLO);
            reject_magic("agent", hello.agent.as_str())?;
            put_text(&mut frame[AGENT_AT..FAMILY_AT], hello.agent.as_str());
        }
        Message::Reservation(request) => {
            put_u32(&mut frame, 4, KIND_RESERVATION);
            reject_magic("agent", request.agent.as_str())?;
            reject_magic("family", request.family.as_str())?;
            put_text(&mut frame[AGENT_AT..FAMILY_AT], request.agent.as_str());
            put_text(&mut frame[FAMILY_AT..HOUR_AT], request.family.as_str());
            put_i32(&mut frame, HOUR_AT, request.requested_hour);
            let party = i32::try_from(request.party_size)
                .map_err(|_| FrameError::InvalidPartySize(i32::MAX))?;
            put_i32(&mut frame, PARTY_AT, party);
        }
    }

    Ok(frame)
}

/// Decode a message frame
pub fn decode_message(frame: &[u8]) -> FrameResult<Message> {
    if frame.len() != MESSAGE_FRAME_LEN {
        return Err(FrameError::WrongSize(frame.len(), MESSAGE_FRAME_LEN));
    }
    if frame[..4] != PROTOCOL_MAGIC {
        return Err(FrameError::BadMagic);
    }

    let kind = get_u32(frame, 4);
    let agent = get_text(&frame[AGENT_AT..FAMILY_AT], "agent")?;
    let channel = get_text(&frame[CHANNEL_AT..CHANNEL_AT + CHANNEL_FIELD_LEN], "reply_channel")?;
    if channel.is_empty() {
        return Err(FrameError::EmptyChannel);
    }

    match kind {
        KIND_HELLO => Ok(Message::Hello(Hello {
            agent: AgentName::new(agent),
            reply_channel: ChannelId::new(channel),
        })),
        KIND_RESERVATION => {
            let family = get_text(&frame[FAMILY_AT..HOUR_AT], "family")?;
            let requested_hour = get_i32(frame, HOUR_AT);
            let party = get_i32(frame, PARTY_AT);
            let party_size = u32::try_from(party)
                .ok()
                .filter(|p| *p > 0)
                .ok_or(FrameError::InvalidPartySize(party))?;

            Ok(Message::Reservation(ReservationRequest {
                agent: AgentName::new(agent),
                family: FamilyName::new(family),
                reply_channel: ChannelId::new(channel),
                requested_hour,
                party_size,
            }))
        }
        other => Err(FrameError::UnknownKind(other)),
    }
}

/// Encode a reply into a reply frame. Over-long messages are truncated.
pub fn encode_reply(reply: &Reply) -> [u8; REPLY_FRAME_LEN] {
    let mut frame = [0u8; REPLY_FRAME_LEN];
    frame[..4].copy_from_slice(&PROTOCOL_MAGIC);

    match reply {
        Reply::Welcome { current_hour } => {
            put_u32(&mut frame, 4, KIND_WELCOME);
            put_i32(&mut frame, REPLY_HOUR_AT, *current_hour);
        }
        Reply::Response(response) => {
            put_u32(&mut frame, 4, KIND_RESPONSE);
            put_i32(&mut frame, CLASS_AT, response.classification.code());
            put_i32(&mut frame, REPLY_HOUR_AT, response.assigned_hour);
            put_text(&mut frame[TEXT_AT..], &response.message);
        }
    }

    frame
}

/// Decode a reply frame
pub fn decode_reply(frame: &[u8]) -> FrameResult<Reply> {
    if frame.len() != REPLY_FRAME_LEN {
        return Err(FrameError::WrongSize(frame.len(), REPLY_FRAME_LEN));
    }
    if frame[..4] != PROTOCOL_MAGIC {
        return Err(FrameError::BadMagic);
    }

    match get_u32(frame, 4) {
        KIND_WELCOME => Ok(Reply::Welcome {
            current_hour: get_i32(frame, REPLY_HOUR_AT),
        }),
        KIND_RESPONSE => {
            let code = get_i32(frame, CLASS_AT);
            let classification =
                Classification::from_code(code).ok_or(FrameError::UnknownClassification(code))?;
            Ok(Reply::Response(Response {
                classification,
                assigned_hour: get_i32(frame, REPLY_HOUR_AT),
                message: get_text(&frame[TEXT_AT..], "message")?,
            }))
        }
        other => Err(FrameError::UnknownKind(other)),
    }
}

pub(crate) fn find_magic(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(PROTOCOL_MAGIC.len())
        .position(|w| w == PROTOCOL_MAGIC)
}

/// Readers treat a magic inside a frame as the start of the next one
fn reject_magic(field: &'static str, text: &str) -> FrameResult<()> {
    match find_magic(text.as_bytes()) {
        Some(_) => Err(FrameError::ContainsMagic(field)),
        None => Ok(()),
    }
}

fn put_u32(frame: &mut [u8], at: usize, value: u32) {
    frame[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_i32(frame: &mut [u8], at: usize, value: i32) {
    frame[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn get_u32(frame: &[u8], at: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&frame[at..at + 4]);
    u32::from_le_bytes(raw)
}

fn get_i32(frame: &[u8], at: usize) -> i32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&frame[at..at + 4]);
    i32::from_le_bytes(raw)
}

/// Write `text` into a zeroed field, truncated at a char boundary so at
/// least one NUL remains.
fn put_text(field: &mut [u8], text: &str) {
    let max = field.len() - 1;
    let mut end = text.len().min(max);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    field[..end].copy_from_slice(&text.as_bytes()[..end]);
}

fn get_text(field: &[u8], name: &'static str) -> FrameResult<String> {
    let end = field
        .iter()
        .position(|b| *b == 0)
        .ok_or(FrameError::Unterminated(name))?;
    std::str::from_utf8(&field[..end])
        .map(str::to_string)
        .map_err(|_| FrameError::InvalidUtf8(name))
}
