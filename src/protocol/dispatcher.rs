//! Frame dispatch boundary.
//!
//! The host runtime hands raw frames to [`Dispatcher::on_frame`] from its
//! receive callback. The dispatcher decodes the frame, maps it onto the
//! closed [`Message`] vocabulary and routes it to the owned handler.
//!
//! This is the single place where errors turn into logged, swallowed
//! outcomes: a malformed or unexpected frame must never crash the host's
//! dispatch loop, so nothing raised below this boundary propagates out of
//! `on_frame`.

use tracing::{debug, error, warn};

use crate::core::codec::FrameCodec;
use crate::error::Result;
use crate::protocol::message::Message;
use crate::transport::PeerId;

/// A session-side consumer of decoded messages.
pub trait MessageHandler {
    /// Handle one decoded message from `sender`.
    ///
    /// Errors returned here are logged at the dispatch boundary and dropped;
    /// implementations should return them rather than logging locally.
    fn handle(&mut self, sender: PeerId, message: Message) -> Result<()>;
}

impl<H: MessageHandler> MessageHandler for &mut H {
    fn handle(&mut self, sender: PeerId, message: Message) -> Result<()> {
        (**self).handle(sender, message)
    }
}

/// Decodes inbound frames and routes them to a typed handler.
pub struct Dispatcher<H: MessageHandler> {
    codec: FrameCodec,
    handler: H,
}

impl<H: MessageHandler> Dispatcher<H> {
    pub fn new(codec: FrameCodec, handler: H) -> Self {
        Self { codec, handler }
    }

    /// Entry point for the host's per-frame receive callback.
    ///
    /// Never panics and never returns an error: decode failures, unknown
    /// tags and handler errors are all absorbed here.
    pub fn on_frame(&mut self, sender: PeerId, frame: &[u8]) {
        let (tag, payload) = match self.codec.decode(frame) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(sender, frame_bytes = frame.len(), error = %e, "dropping undecodable frame");
                return;
            }
        };

        // Empty tag after trimming is the no-op sentinel.
        if tag.is_empty() {
            warn!(sender, "dropping frame with empty tag");
            return;
        }

        match Message::from_wire(&tag, payload) {
            Message::Unknown { tag } => {
                // Not an error: newer peers may speak tags this build predates.
                debug!(sender, tag = %tag, "ignoring unknown tag");
            }
            message => {
                if let Err(e) = self.handler.handle(sender, message) {
                    error!(sender, tag = %tag, error = %e, "message handler failed");
                }
            }
        }
    }

    /// The wrapped handler, for host-side queries.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }
}
