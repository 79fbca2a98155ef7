//! # rink-protocol
//!
//! Session synchronization and roster authorization core for multiplayer
//! rink games.
//!
//! The server owns the authoritative configuration and pushes it to every
//! joining client over a reliable-ordered channel, preceded by a protocol
//! version check; out-of-date clients ask to be kicked and the server issues
//! the disconnect. Once synced, the client evaluates team-assignment requests
//! against the replicated config and a live roster snapshot.
//!
//! ## Layers
//! - [`core`]: tagged frame codec and the frame-log filter
//! - [`protocol`]: message vocabulary, dispatch boundary, handshake sessions
//! - [`policy`]: pure team-balancing authorization engine
//! - [`config`]: server/client configuration and the synced replica store
//! - [`transport`]: host transport boundary and the in-memory test transport
//!
//! ## Example
//! ```
//! use rink_protocol::config::{ClientConfig, ServerConfig};
//! use rink_protocol::core::ChannelFilter;
//! use rink_protocol::policy::{Role, RosterSnapshot, Team, TeamState};
//! use rink_protocol::protocol::{ClientSession, Dispatcher, ServerSession};
//! use rink_protocol::transport::{MemoryTransport, SERVER_PEER_ID};
//!
//! // Server side: push version + config to a joining player.
//! let mut server = ServerSession::new(
//!     ServerConfig::default(),
//!     ChannelFilter::new(),
//!     MemoryTransport::new(),
//! );
//! server.on_player_joined(42);
//!
//! // Client side: feed the pushed frames through the dispatch boundary.
//! let client = ClientSession::new(
//!     ClientConfig::default(),
//!     ChannelFilter::new(),
//!     MemoryTransport::new(),
//! );
//! let mut dispatcher = Dispatcher::new(Default::default(), client);
//! for delivery in server.transport_mut().drain() {
//!     dispatcher.on_frame(SERVER_PEER_ID, &delivery.frame);
//! }
//!
//! // Synced: the policy now gates position claims.
//! let roster = RosterSnapshot::new(TeamState::new(3, false), TeamState::new(2, true));
//! let claim = dispatcher.handler().claim(Team::Blue, Role::Attacker);
//! let decision = dispatcher.handler().authorize(&roster, &claim);
//! assert!(decision.allowed);
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod policy;
pub mod protocol;
pub mod transport;
pub mod utils;

pub use config::{ClientConfig, ConfigStore, ServerConfig};
pub use core::{ChannelFilter, FrameCodec};
pub use error::{Result, SyncError};
pub use policy::{Decision, DenyReason, PositionClaim, Role, RosterSnapshot, Team, TeamState};
pub use protocol::{
    ClientHandshake, ClientSession, Dispatcher, Message, MessageHandler, ServerHandshake,
    ServerSession, OUT_OF_DATE_REASON, PROTOCOL_VERSION,
};
pub use transport::{MemoryTransport, PeerId, Transport, SERVER_PEER_ID};
