//! Stream codecs for the request and reply pipes
//!
//! Pipes carry frames back to back with no length prefix, so decoders find
//! frame starts by [`PROTOCOL_MAGIC`]. Bytes before a magic are skipped. A
//! frame with another magic inside it was cut short by its writer and is
//! dropped, and decoding resumes at that inner magic.
//!
//! Malformed input comes out of the decoder as an `Err` item, not as a
//! stream error, so one bad writer does not end the stream for the others.

use bytes::{Buf, BufMut, BytesMut};
use std::io;
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

use crate::frame::find_magic;
use crate::{
    FrameError, FrameResult, MESSAGE_FRAME_LEN, Message, PROTOCOL_MAGIC, REPLY_FRAME_LEN, Reply,
    decode_message, decode_reply, encode_message, encode_reply,
};

/// Errors from writing frames to a stream
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),
}

/// Codec for the request pipe: decodes [`Message`] frames, encodes them on
/// the agent side
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageCodec;

impl MessageCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for MessageCodec {
    type Item = FrameResult<Message>;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> io::Result<Option<Self::Item>> {
        Ok(next_frame(src, MESSAGE_FRAME_LEN).map(|frame| frame.and_then(|f| decode_message(&f))))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> io::Result<Option<Self::Item>> {
        match self.decode(src)? {
            Some(item) => Ok(Some(item)),
            None => Ok(discard_rest(src, MESSAGE_FRAME_LEN).map(Err)),
        }
    }
}

impl Encoder<Message> for MessageCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), CodecError> {
        let frame = encode_message(&item)?;
        dst.reserve(frame.len());
        dst.put_slice(&frame);
        Ok(())
    }
}

/// Codec for reply pipes: encodes [`Reply`] frames on the service side,
/// decodes them on the agent side
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplyCodec;

impl ReplyCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for ReplyCodec {
    type Item = FrameResult<Reply>;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> io::Result<Option<Self::Item>> {
        Ok(next_frame(src, REPLY_FRAME_LEN).map(|frame| frame.and_then(|f| decode_reply(&f))))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> io::Result<Option<Self::Item>> {
        match self.decode(src)? {
            Some(item) => Ok(Some(item)),
            None => Ok(discard_rest(src, REPLY_FRAME_LEN).map(Err)),
        }
    }
}

impl Encoder<Reply> for ReplyCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Reply, dst: &mut BytesMut) -> Result<(), CodecError> {
        let frame = encode_reply(&item);
        dst.reserve(frame.len());
        dst.put_slice(&frame);
        Ok(())
    }
}

/// Split the next `len`-byte frame off `src`.
///
/// `None` means more bytes are needed. `Some(Err(_))` reports bytes that
/// were discarded.
fn next_frame(src: &mut BytesMut, len: usize) -> Option<FrameResult<BytesMut>> {
    let magic = PROTOCOL_MAGIC.len();

    let Some(start) = find_magic(src) else {
        // Keep a tail that may be the start of a split magic
        let skip = src.len().saturating_sub(magic - 1);
        if skip == 0 {
            return None;
        }
        src.advance(skip);
        return Some(Err(FrameError::Skipped(skip)));
    };

    if start > 0 {
        src.advance(start);
        return Some(Err(FrameError::Skipped(start)));
    }

    // A magic starting anywhere before `len` ends by `horizon`
    let horizon = len + magic - 1;
    if let Some(pos) = find_magic(&src[magic..src.len().min(horizon)]) {
        let short = magic + pos;
        src.advance(short);
        return Some(Err(FrameError::WrongSize(short, len)));
    }

    if src.len() < len || (src.len() < horizon && partial_magic_before(src, len)) {
        src.reserve(len.saturating_sub(src.len()));
        return None;
    }

    Some(Ok(src.split_to(len)))
}

/// Whether `src` ends in the first bytes of a magic that starts inside the
/// frame, which more input would show to be a cut-short frame
fn partial_magic_before(src: &[u8], len: usize) -> bool {
    let magic = PROTOCOL_MAGIC.len();
    (1..magic).any(|n| {
        n <= src.len() && {
            let at = src.len() - n;
            at >= magic && at < len && src[at..] == PROTOCOL_MAGIC[..n]
        }
    })
}

/// Drop whatever is left at end of stream
fn discard_rest(src: &mut BytesMut, len: usize) -> Option<FrameError> {
    if src.is_empty() {
        return None;
    }
    let rest = src.len();
    src.clear();
    Some(FrameError::WrongSize(rest, len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Hello, ReservationRequest, Response};
    use parkgate_util::Hour;

    fn reservation(hour: Hour, party: u32) -> Message {
        Message::Reservation(ReservationRequest {
            agent: "agent-1".into(),
            family: "Garcia".into(),
            reply_channel: "/tmp/agent-1.pipe".into(),
            requested_hour: hour,
            party_size: party,
        })
    }

    fn hello(agent: &str) -> Message {
        Message::Hello(Hello {
            agent: agent.into(),
            reply_channel: format!("/tmp/{}.pipe", agent).into(),
        })
    }

    fn encoded(message: &Message) -> Vec<u8> {
        encode_message(message).unwrap().to_vec()
    }

    /// Decode everything buffered, then flush at end of stream
    fn drain(codec: &mut MessageCodec, src: &mut BytesMut) -> Vec<FrameResult<Message>> {
        let mut out = Vec::new();
        while let Some(item) = codec.decode(src).unwrap() {
            out.push(item);
        }
        while let Some(item) = codec.decode_eof(src).unwrap() {
            out.push(item);
        }
        out
    }

    #[test]
    fn waits_for_full_frame() {
        let frame = encoded(&reservation(8, 10));
        let mut codec = MessageCodec::new();
        let mut src = BytesMut::from(&frame[..100]);

        assert!(codec.decode(&mut src).unwrap().is_none());
        src.extend_from_slice(&frame[100..]);
        assert_eq!(codec.decode(&mut src).unwrap(), Some(Ok(reservation(8, 10))));
        assert!(codec.decode(&mut src).unwrap().is_none());
        assert!(src.is_empty());
    }

    #[test]
    fn skips_garbage_between_frames() {
        let mut src = BytesMut::new();
        src.extend_from_slice(b"junk");
        src.extend_from_slice(&encoded(&reservation(8, 10)));
        src.extend_from_slice(b"xx");
        src.extend_from_slice(&encoded(&reservation(9, 2)));

        assert_eq!(
            drain(&mut MessageCodec::new(), &mut src),
            vec![
                Err(FrameError::Skipped(4)),
                Ok(reservation(8, 10)),
                Err(FrameError::Skipped(2)),
                Ok(reservation(9, 2)),
            ]
        );
    }

    #[test]
    fn bad_frame_does_not_stop_the_next() {
        let mut bad = encoded(&reservation(8, 10));
        bad[112..116].copy_from_slice(&0i32.to_le_bytes());

        let mut src = BytesMut::from(&bad[..]);
        src.extend_from_slice(&encoded(&reservation(11, 4)));

        assert_eq!(
            drain(&mut MessageCodec::new(), &mut src),
            vec![Err(FrameError::InvalidPartySize(0)), Ok(reservation(11, 4))]
        );
    }

    #[test]
    fn truncated_frame_is_dropped_and_next_frame_survives() {
        let cut = encoded(&hello("crashed"));
        let mut src = BytesMut::from(&cut[..200]);
        src.extend_from_slice(&encoded(&reservation(12, 3)));

        assert_eq!(
            drain(&mut MessageCodec::new(), &mut src),
            vec![
                Err(FrameError::WrongSize(200, MESSAGE_FRAME_LEN)),
                Ok(reservation(12, 3)),
            ]
        );
    }

    #[test]
    fn frame_cut_just_short_is_dropped() {
        // The next magic straddles the end of the would-be frame
        let cut = encoded(&hello("crashed"));
        let next = encoded(&reservation(12, 3));
        let mut codec = MessageCodec::new();

        let mut src = BytesMut::from(&cut[..214]);
        src.extend_from_slice(&next[..2]);
        assert!(codec.decode(&mut src).unwrap().is_none());

        src.extend_from_slice(&next[2..]);
        assert_eq!(
            drain(&mut codec, &mut src),
            vec![
                Err(FrameError::WrongSize(214, MESSAGE_FRAME_LEN)),
                Ok(reservation(12, 3)),
            ]
        );
    }

    #[test]
    fn short_frame_at_end_of_stream_is_reported() {
        let frame = encoded(&reservation(8, 10));
        let mut src = BytesMut::from(&frame[..50]);
        assert_eq!(
            drain(&mut MessageCodec::new(), &mut src),
            vec![Err(FrameError::WrongSize(50, MESSAGE_FRAME_LEN))]
        );
        assert!(src.is_empty());
    }

    #[test]
    fn keeps_split_magic() {
        let frame = encoded(&reservation(8, 10));
        let mut codec = MessageCodec::new();
        let mut src = BytesMut::from(&b"zzPG"[..]);

        assert_eq!(codec.decode(&mut src).unwrap(), Some(Err(FrameError::Skipped(1))));
        src.extend_from_slice(&frame[2..]);
        assert_eq!(codec.decode(&mut src).unwrap(), Some(Err(FrameError::Skipped(1))));
        assert_eq!(codec.decode(&mut src).unwrap(), Some(Ok(reservation(8, 10))));
    }

    #[test]
    fn encoders_write_whole_frames() {
        let mut dst = BytesMut::new();
        MessageCodec::new().encode(hello("agent-2"), &mut dst).unwrap();
        assert_eq!(dst.len(), MESSAGE_FRAME_LEN);

        let reply = Reply::Response(Response::denied("no slot in any window"));
        let mut dst = BytesMut::new();
        ReplyCodec::new().encode(reply.clone(), &mut dst).unwrap();
        assert_eq!(dst.len(), REPLY_FRAME_LEN);
        assert_eq!(ReplyCodec::new().decode(&mut dst).unwrap(), Some(Ok(reply)));
    }

    #[test]
    fn message_encoder_rejects_bad_fields() {
        let msg = Message::Hello(Hello {
            agent: "a".into(),
            reply_channel: "".into(),
        });
        let mut dst = BytesMut::new();
        assert!(matches!(
            MessageCodec::new().encode(msg, &mut dst),
            Err(CodecError::Frame(FrameError::EmptyChannel))
        ));
        assert!(dst.is_empty());
    }
}
