//! Protocol types for parkgated
//!
//! This crate defines the wire contract between parkgated and agents:
//! - Inbound messages (handshake and reservation requests)
//! - Replies (welcome and reservation responses)
//! - The fixed-layout binary frames both travel in
//! - Stream codecs that split pipe bytes into frames

mod codec;
mod frame;
mod messages;

pub use codec::*;
pub use frame::*;
pub use messages::*;

/// Magic prefix of every frame, doubling as the protocol version
pub const PROTOCOL_MAGIC: [u8; 4] = *b"PGT1";
