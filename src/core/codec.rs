//! # Frame Codec
//!
//! Encoding and decoding of tagged frames.
//!
//! A frame pairs a routing tag with a text payload. The tag is written as a
//! length-prefixed UTF-8 string; the payload is every remaining byte, with no
//! explicit length of its own.
//!
//! ## Wire Format
//! ```text
//! [TagLen(4, BE)] [Tag(UTF-8)] [Payload(N)]
//! ```
//!
//! The sender id is carried out-of-band by the transport. Diagnostic totals
//! still count its 8 bytes so logged sizes match the true wire cost.
//!
//! Both directions trim surrounding whitespace from the tag and payload,
//! defensive against transport padding.

use bytes::{Buf, BufMut, BytesMut};
use std::borrow::Cow;
use tracing::info;

use crate::core::filter::ChannelFilter;
use crate::error::{Result, SyncError};

/// Maximum bytes a single frame may occupy on the wire.
/// Matches what the transport's fragmented reliable delivery will carry.
pub const MAX_FRAME_BYTES: usize = 64 * 1024;

/// Bytes the transport spends carrying the sender id out-of-band,
/// counted in diagnostic totals.
const SENDER_ID_BYTES: usize = 8;

/// Size of the tag length prefix.
const TAG_LEN_BYTES: usize = 4;

/// Maximum characters of payload text included in receive logging.
const PAYLOAD_PREVIEW_CHARS: usize = 120;

/// Encoder/decoder for tagged frames.
///
/// Informational logging of frame traffic is gated by `verbose` (the owning
/// side's `log_info` setting) and by the shared [`ChannelFilter`]; filtered
/// tags pass through both directions silently.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    filter: ChannelFilter,
    verbose: bool,
}

impl FrameCodec {
    pub fn new(filter: ChannelFilter, verbose: bool) -> Self {
        Self { filter, verbose }
    }

    /// Encode a tag/payload pair into a wire frame.
    ///
    /// # Errors
    /// Returns `SyncError::EmptyTag` for a blank tag and
    /// `SyncError::OversizedFrame` when the result would exceed
    /// [`MAX_FRAME_BYTES`]. On error no partial frame is produced; the caller
    /// must not send.
    pub fn encode(&self, tag: &str, payload: &str) -> Result<Vec<u8>> {
        if tag.trim().is_empty() {
            return Err(SyncError::EmptyTag);
        }

        let frame_len = TAG_LEN_BYTES + tag.len() + payload.len();
        if frame_len > MAX_FRAME_BYTES {
            return Err(SyncError::OversizedFrame(frame_len));
        }

        let mut buf = BytesMut::with_capacity(frame_len);
        buf.put_u32(tag.len() as u32);
        buf.put_slice(tag.as_bytes());
        buf.put_slice(payload.as_bytes());

        if self.should_log(tag) {
            info!(
                tag,
                payload_bytes = payload.len(),
                total_bytes = tag.len() + SENDER_ID_BYTES + payload.len(),
                "encoded frame"
            );
        }

        Ok(buf.to_vec())
    }

    /// Decode a wire frame into its tag and payload text.
    ///
    /// The tag is read first; all remaining bytes are the payload, rendered
    /// as text lossily. Both are trimmed.
    ///
    /// # Errors
    /// Returns `SyncError::TruncatedFrame` when the frame is shorter than the
    /// tag-length prefix or than the declared tag, and `SyncError::InvalidTag`
    /// when the tag bytes are not UTF-8.
    pub fn decode(&self, frame: &[u8]) -> Result<(String, String)> {
        if frame.len() < TAG_LEN_BYTES {
            return Err(SyncError::TruncatedFrame(frame.len()));
        }

        let mut buf = frame;
        let tag_len = buf.get_u32() as usize;
        if buf.remaining() < tag_len {
            return Err(SyncError::TruncatedFrame(frame.len()));
        }

        let tag_bytes = buf.copy_to_bytes(tag_len);
        let tag = std::str::from_utf8(&tag_bytes)
            .map_err(|_| SyncError::InvalidTag)?
            .trim()
            .to_string();

        let payload = String::from_utf8_lossy(buf.chunk()).trim().to_string();

        if self.should_log(&tag) {
            info!(
                tag = %tag,
                payload_bytes = buf.remaining(),
                total_bytes = tag_bytes.len() + SENDER_ID_BYTES + buf.remaining(),
                content = %preview(&payload),
                "decoded frame"
            );
        }

        Ok((tag, payload))
    }

    fn should_log(&self, tag: &str) -> bool {
        self.verbose && !self.filter.is_ignored(tag)
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(ChannelFilter::new(), true)
    }
}

/// Truncated rendering of payload text for receive logging.
fn preview(payload: &str) -> Cow<'_, str> {
    if payload.chars().count() <= PAYLOAD_PREVIEW_CHARS {
        Cow::Borrowed(payload)
    } else {
        let cut: String = payload.chars().take(PAYLOAD_PREVIEW_CHARS).collect();
        Cow::Owned(format!("{cut}…"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> FrameCodec {
        FrameCodec::default()
    }

    #[test]
    fn roundtrip_preserves_tag_and_payload() {
        let frame = codec().encode("config", r#"{"log_info":true}"#).unwrap();
        let (tag, payload) = codec().decode(&frame).unwrap();
        assert_eq!(tag, "config");
        assert_eq!(payload, r#"{"log_info":true}"#);
    }

    #[test]
    fn decode_trims_whitespace() {
        let frame = codec().encode(" kick ", "  1  ").unwrap();
        let (tag, payload) = codec().decode(&frame).unwrap();
        assert_eq!(tag, "kick");
        assert_eq!(payload, "1");
    }

    #[test]
    fn empty_payload_is_valid() {
        let frame = codec().encode("ModVersion", "").unwrap();
        let (tag, payload) = codec().decode(&frame).unwrap();
        assert_eq!(tag, "ModVersion");
        assert_eq!(payload, "");
    }

    #[test]
    fn blank_tag_is_rejected() {
        assert!(matches!(
            codec().encode("   ", "payload"),
            Err(SyncError::EmptyTag)
        ));
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let payload = "x".repeat(MAX_FRAME_BYTES);
        assert!(matches!(
            codec().encode("config", &payload),
            Err(SyncError::OversizedFrame(_))
        ));
    }

    #[test]
    fn frame_shorter_than_prefix_is_rejected() {
        assert!(matches!(
            codec().decode(&[0x00, 0x01]),
            Err(SyncError::TruncatedFrame(2))
        ));
    }

    #[test]
    fn declared_tag_longer_than_frame_is_rejected() {
        // Prefix claims a 16-byte tag but only 3 bytes follow.
        let mut frame = 16u32.to_be_bytes().to_vec();
        frame.extend_from_slice(b"abc");
        assert!(matches!(
            codec().decode(&frame),
            Err(SyncError::TruncatedFrame(7))
        ));
    }

    #[test]
    fn non_utf8_tag_is_rejected() {
        let mut frame = 2u32.to_be_bytes().to_vec();
        frame.extend_from_slice(&[0xFF, 0xFE]);
        frame.extend_from_slice(b"payload");
        assert!(matches!(codec().decode(&frame), Err(SyncError::InvalidTag)));
    }

    #[test]
    fn non_utf8_payload_is_rendered_lossily() {
        let mut frame = 4u32.to_be_bytes().to_vec();
        frame.extend_from_slice(b"kick");
        frame.extend_from_slice(&[0xFF, b'1']);
        let (tag, payload) = codec().decode(&frame).unwrap();
        assert_eq!(tag, "kick");
        assert_eq!(payload, "\u{FFFD}1");
    }

    #[test]
    fn preview_truncates_long_payloads() {
        let long = "a".repeat(500);
        let rendered = preview(&long);
        assert!(rendered.chars().count() <= PAYLOAD_PREVIEW_CHARS + 1);
        assert!(rendered.ends_with('…'));
    }
}
