//! # Protocol Layer
//!
//! Message vocabulary, dispatch boundary, and the version/config handshake.
//!
//! ## Components
//! - **Message**: closed tagged-variant vocabulary, decoded once per frame
//! - **Dispatcher**: decodes, routes, and absorbs errors at the host boundary
//! - **Handshake**: server push of version + config, client verification and
//!   the kick path for out-of-date peers

pub mod dispatcher;
pub mod handshake;
pub mod message;

pub use dispatcher::{Dispatcher, MessageHandler};
pub use handshake::{
    ClientHandshake, ClientSession, ServerHandshake, ServerSession, OUT_OF_DATE_REASON,
    PROTOCOL_VERSION,
};
pub use message::Message;
