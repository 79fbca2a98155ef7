//! # Error Types
//!
//! Error handling for the synchronization protocol.
//!
//! This module defines all error variants that can occur during protocol
//! operations, from frame encoding failures to transport-level faults.
//!
//! ## Error Categories
//! - **Codec Errors**: truncated frames, oversized frames, malformed tags
//! - **Config Errors**: config file and config payload (de)serialization
//! - **Transport Errors**: send/disconnect failures surfaced by the host transport
//!
//! A protocol version mismatch is deliberately *not* an error: it is a routed
//! outcome that triggers the kick path in the handshake.
//!
//! All errors implement `std::error::Error` for interoperability. Every error
//! crossing into the dispatcher is caught there, logged, and swallowed; none
//! propagate to the host runtime.

use std::io;
use thiserror::Error;

/// Primary error type for all protocol operations.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("frame tag must not be empty")]
    EmptyTag,

    #[error("frame too large: {0} bytes")]
    OversizedFrame(usize),

    #[error("frame too short: {0} bytes")]
    TruncatedFrame(usize),

    #[error("frame tag is not valid UTF-8")]
    InvalidTag,

    #[error("config error: {0}")]
    Config(String),

    #[error("config payload error: {0}")]
    ConfigPayload(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Type alias for Results using SyncError.
pub type Result<T> = std::result::Result<T, SyncError>;
