//! # Transport Boundary
//!
//! The synchronization layer does not move bytes itself; the host runtime
//! supplies a message transport and invokes the dispatcher synchronously for
//! every received frame. This module pins down that boundary: the [`Transport`]
//! trait consumed by the sessions, the two named channels, and the in-memory
//! implementation used by the test suites.
//!
//! ## Delivery Contract
//! Implementations must deliver reliably, fragment frames when needed, and
//! preserve send order per sender/receiver pair and per named channel. The
//! handshake depends on this: the version frame must reach a client strictly
//! before its config frame. No ordering is assumed across different peers.

pub mod memory;

pub use memory::MemoryTransport;

use crate::error::Result;

/// Identifier the transport assigns to a connected peer.
pub type PeerId = u64;

/// Sender id reserved for the server when observed from a client.
pub const SERVER_PEER_ID: PeerId = 0;

/// Named channel carrying server → client traffic.
pub const SERVER_TO_CLIENT_CHANNEL: &str = "rink_sync_server";

/// Named channel carrying client → server traffic.
pub const CLIENT_TO_SERVER_CHANNEL: &str = "rink_sync_client";

/// Host-supplied reliable-ordered message transport.
pub trait Transport {
    /// Send a frame to one peer on a named channel.
    ///
    /// # Errors
    /// Returns `SyncError::Transport` when the host transport rejects the
    /// send. Callers treat that as a dropped frame; the reliable channel
    /// already retries delivery, so no application-level retry is attempted.
    fn send(&mut self, channel: &str, dest: PeerId, frame: &[u8]) -> Result<()>;

    /// Send a frame to every connected peer on a named channel.
    ///
    /// # Errors
    /// Same contract as [`send`](Transport::send).
    fn send_to_all(&mut self, channel: &str, frame: &[u8]) -> Result<()>;

    /// Disconnect a peer, showing it a human-readable reason.
    ///
    /// # Errors
    /// Returns `SyncError::Transport` when the host refuses the disconnect.
    fn disconnect(&mut self, peer: PeerId, reason: &str) -> Result<()>;
}
