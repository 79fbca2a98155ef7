//! Version-check and config-sync handshake.
//!
//! The server pushes two frames to every joining client over the
//! reliable-ordered channel: its protocol version, then its serialized
//! config. The client verifies the version against its own compiled-in
//! string; on mismatch it asks the server to kick it and waits, since the
//! server stays the single point of truth for session termination. On match it
//! passively awaits the config frame and installs the replica.
//!
//! State is per session pair, never global: each connecting client gets its
//! own [`ServerHandshake`] entry on the server, and each [`ClientSession`]
//! owns its [`ClientHandshake`] and config replica.
//!
//! There is no timeout or retry at this layer. A client that never receives
//! the version frame simply keeps its defaults and the policy fails open;
//! the reliable channel already guarantees delivery, so an application-level
//! retry would duplicate work.

use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use crate::config::{ClientConfig, ConfigStore, ServerConfig};
use crate::core::codec::FrameCodec;
use crate::core::filter::ChannelFilter;
use crate::error::Result;
use crate::policy::{self, Decision, PositionClaim, Role, RosterSnapshot, Team};
use crate::protocol::dispatcher::MessageHandler;
use crate::protocol::message::Message;
use crate::transport::{
    PeerId, Transport, CLIENT_TO_SERVER_CHANNEL, SERVER_PEER_ID, SERVER_TO_CLIENT_CHANNEL,
};

/// Protocol version compiled into this build. Exact string equality on both
/// ends decides compatibility.
pub const PROTOCOL_VERSION: &str = "0.1.0DEV";

/// Reason shown to a client disconnected after a version mismatch.
pub const OUT_OF_DATE_REASON: &str = "protocol out of date, resync required";

/// Server-side handshake progress for one connecting client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerHandshake {
    /// Join observed, nothing pushed yet.
    Connected,
    /// Version frame sent.
    VersionSent,
    /// Config frame sent. Terminal success state.
    ConfigSent,
    /// Client reported a version mismatch and asked to be kicked.
    KickRequested,
    /// Disconnect issued. Terminal failure state.
    Disconnected,
}

/// Client-side handshake progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientHandshake {
    /// Waiting for the server's version frame.
    AwaitingVersion,
    /// Version differed; the kick request has not been delivered yet.
    VersionMismatch,
    /// Kick request sent; waiting for the server to disconnect us.
    KickSent,
    /// Version verified; waiting for the config frame.
    AwaitingConfig,
    /// Config replica installed. Terminal success state.
    Synced,
}

/// Server end of the synchronization protocol.
///
/// Owns the authoritative [`ServerConfig`] (immutable after startup) and the
/// per-client handshake table. Drive it from the host's player-join event and
/// wrap it in a [`Dispatcher`](crate::protocol::dispatcher::Dispatcher) for
/// the receive path.
pub struct ServerSession<T: Transport> {
    config: ServerConfig,
    codec: FrameCodec,
    transport: T,
    clients: HashMap<PeerId, ServerHandshake>,
    version: String,
}

impl<T: Transport> ServerSession<T> {
    pub fn new(config: ServerConfig, filter: ChannelFilter, transport: T) -> Self {
        Self::with_version(config, filter, transport, PROTOCOL_VERSION)
    }

    /// Build a session advertising a specific version string. The default
    /// constructor uses [`PROTOCOL_VERSION`].
    pub fn with_version(
        config: ServerConfig,
        filter: ChannelFilter,
        transport: T,
        version: impl Into<String>,
    ) -> Self {
        let codec = FrameCodec::new(filter, config.log_info);
        Self {
            config,
            codec,
            transport,
            clients: HashMap::new(),
            version: version.into(),
        }
    }

    /// Host event: a player joined the session.
    ///
    /// Pushes the version frame then the config frame to that client, in
    /// order, on the reliable server → client channel. Failures are logged
    /// and the frame dropped; the state stops advancing at the last
    /// successful step.
    pub fn on_player_joined(&mut self, client: PeerId) {
        self.clients.insert(client, ServerHandshake::Connected);
        info!(client, "player joined, pushing version and config");

        if self.push(client, &Message::ModVersion(self.version.clone())) {
            self.clients.insert(client, ServerHandshake::VersionSent);
        } else {
            return;
        }

        let payload = match self.config.to_json() {
            Ok(payload) => payload,
            Err(e) => {
                error!(client, error = %e, "cannot serialize config, push aborted");
                return;
            }
        };

        if self.push(client, &Message::Config(payload)) {
            self.clients.insert(client, ServerHandshake::ConfigSent);
        }
    }

    /// Encode and send one frame to `client`. Returns whether the transport
    /// accepted it; an encode failure never reaches the transport.
    fn push(&mut self, client: PeerId, message: &Message) -> bool {
        let frame = match self.codec.encode(&message.tag(), &message.wire_payload()) {
            Ok(frame) => frame,
            Err(e) => {
                error!(client, tag = %message.tag(), error = %e, "cannot encode frame, send aborted");
                return false;
            }
        };

        match self
            .transport
            .send(SERVER_TO_CLIENT_CHANNEL, client, &frame)
        {
            Ok(()) => true,
            Err(e) => {
                warn!(client, tag = %message.tag(), error = %e, "send failed, frame dropped");
                false
            }
        }
    }

    fn kick_requested(&mut self, client: PeerId) -> Result<()> {
        self.clients.insert(client, ServerHandshake::KickRequested);
        info!(client, reason = OUT_OF_DATE_REASON, "kick requested, disconnecting client");

        self.transport.disconnect(client, OUT_OF_DATE_REASON)?;
        self.clients.insert(client, ServerHandshake::Disconnected);
        Ok(())
    }

    /// Handshake progress for one client, if it ever joined.
    pub fn handshake_state(&self, client: PeerId) -> Option<ServerHandshake> {
        self.clients.get(&client).copied()
    }

    /// The authoritative configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

impl<T: Transport> MessageHandler for ServerSession<T> {
    fn handle(&mut self, sender: PeerId, message: Message) -> Result<()> {
        match message {
            Message::Kick(true) => self.kick_requested(sender),
            Message::Kick(false) => {
                // Only the literal request payload acts; anything else is a no-op.
                debug!(sender, "ignoring kick frame without request payload");
                Ok(())
            }
            Message::ModVersion(_) | Message::Config(_) => {
                debug!(sender, tag = %message.tag(), "ignoring client-bound tag on server");
                Ok(())
            }
            Message::Unknown { tag } => {
                debug!(sender, tag = %tag, "ignoring unknown tag");
                Ok(())
            }
        }
    }
}

/// Client end of the synchronization protocol.
///
/// Owns the config replica and the local client settings. Drive it from the
/// host's session lifecycle events and wrap it in a
/// [`Dispatcher`](crate::protocol::dispatcher::Dispatcher) for the receive
/// path.
pub struct ClientSession<T: Transport> {
    client_config: ClientConfig,
    store: ConfigStore,
    codec: FrameCodec,
    transport: T,
    handshake: ClientHandshake,
    version: String,
}

impl<T: Transport> ClientSession<T> {
    pub fn new(client_config: ClientConfig, filter: ChannelFilter, transport: T) -> Self {
        Self::with_version(client_config, filter, transport, PROTOCOL_VERSION)
    }

    /// Build a session compiled against a specific version string. The
    /// default constructor uses [`PROTOCOL_VERSION`].
    pub fn with_version(
        client_config: ClientConfig,
        filter: ChannelFilter,
        transport: T,
        version: impl Into<String>,
    ) -> Self {
        let codec = FrameCodec::new(filter, client_config.log_info);
        Self {
            client_config,
            store: ConfigStore::new(),
            codec,
            transport,
            handshake: ClientHandshake::AwaitingVersion,
            version: version.into(),
        }
    }

    /// Host event: the client connected to a session. The host registers the
    /// dispatcher's frame callback around this point; the session itself just
    /// starts from a clean slate.
    pub fn on_session_started(&mut self) {
        info!("client session started");
        self.handshake = ClientHandshake::AwaitingVersion;
        self.store.reset();
    }

    /// Host event: the client left the session. Resets the replica so a
    /// previous server's limits never apply to the next one.
    pub fn on_session_stopped(&mut self) {
        info!("client session stopped, resetting synced config");
        self.handshake = ClientHandshake::AwaitingVersion;
        self.store.reset();
    }

    fn check_version(&mut self, server_version: &str) -> Result<()> {
        if server_version == self.version {
            info!(version = server_version, "protocol version verified");
            if self.handshake == ClientHandshake::AwaitingVersion {
                self.handshake = ClientHandshake::AwaitingConfig;
            }
            return Ok(());
        }

        warn!(
            ours = %self.version,
            theirs = %server_version,
            "protocol version mismatch, requesting kick"
        );
        self.handshake = ClientHandshake::VersionMismatch;

        let kick = Message::Kick(true);
        let frame = self.codec.encode(&kick.tag(), &kick.wire_payload())?;
        self.transport
            .send(CLIENT_TO_SERVER_CHANNEL, SERVER_PEER_ID, &frame)?;

        // The server owns the disconnect; we just wait for it now.
        self.handshake = ClientHandshake::KickSent;
        Ok(())
    }

    fn install_config(&mut self, json: &str) -> Result<()> {
        // Wholesale replacement regardless of handshake progress: a re-sent
        // config is a full replacement, not a delta.
        self.store.install(json)?;
        info!(
            max_skaters = self.store.config().max_skaters,
            team_balancing = self.store.config().team_balancing,
            "server config installed"
        );

        if !matches!(
            self.handshake,
            ClientHandshake::VersionMismatch | ClientHandshake::KickSent
        ) {
            self.handshake = ClientHandshake::Synced;
        }
        Ok(())
    }

    /// Decide a position claim against the synced config and live roster.
    ///
    /// While no server push has arrived (the mod is absent or the handshake
    /// never completed), every claim is allowed: fail open.
    pub fn authorize(&self, roster: &RosterSnapshot, claim: &PositionClaim) -> Decision {
        if !self.store.is_synced() {
            return Decision::allowed();
        }
        policy::evaluate(self.store.config(), roster, claim)
    }

    /// Build a claim for the local player, resolving admin status from the
    /// synced admin list.
    pub fn claim(&self, team: Team, role: Role) -> PositionClaim {
        PositionClaim {
            team,
            role,
            requester_is_admin: self.is_admin(),
        }
    }

    /// True when the local player's id appears in the synced admin list.
    pub fn is_admin(&self) -> bool {
        !self.client_config.player_id.is_empty()
            && self
                .store
                .config()
                .admin_ids
                .iter()
                .any(|id| id == &self.client_config.player_id)
    }

    pub fn handshake_state(&self) -> ClientHandshake {
        self.handshake
    }

    /// The currently active server-originated configuration.
    pub fn synced_config(&self) -> &ServerConfig {
        self.store.config()
    }

    pub fn client_config(&self) -> &ClientConfig {
        &self.client_config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

impl<T: Transport> MessageHandler for ClientSession<T> {
    fn handle(&mut self, sender: PeerId, message: Message) -> Result<()> {
        if sender != SERVER_PEER_ID {
            // Config and version pushes only ever originate from the server.
            debug!(sender, tag = %message.tag(), "ignoring frame from non-server peer");
            return Ok(());
        }

        match message {
            Message::ModVersion(server_version) => self.check_version(&server_version),
            Message::Config(json) => self.install_config(&json),
            Message::Kick(_) => {
                debug!(sender, "ignoring server-bound tag on client");
                Ok(())
            }
            Message::Unknown { tag } => {
                debug!(sender, tag = %tag, "ignoring unknown tag");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::message::{CONFIG_TAG, KICK_TAG, MOD_VERSION_TAG};
    use crate::transport::MemoryTransport;

    fn server() -> ServerSession<MemoryTransport> {
        ServerSession::new(
            ServerConfig::default(),
            ChannelFilter::new(),
            MemoryTransport::new(),
        )
    }

    fn client() -> ClientSession<MemoryTransport> {
        ClientSession::new(
            ClientConfig::default(),
            ChannelFilter::new(),
            MemoryTransport::new(),
        )
    }

    fn decode_tags(transport: &mut MemoryTransport) -> Vec<(String, String)> {
        let codec = FrameCodec::default();
        transport
            .drain()
            .into_iter()
            .map(|d| codec.decode(&d.frame).unwrap())
            .collect()
    }

    #[test]
    fn join_pushes_version_then_config() {
        let mut server = server();
        server.on_player_joined(42);

        assert_eq!(
            server.handshake_state(42),
            Some(ServerHandshake::ConfigSent)
        );

        let frames = decode_tags(server.transport_mut());
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].0, MOD_VERSION_TAG);
        assert_eq!(frames[0].1, PROTOCOL_VERSION);
        assert_eq!(frames[1].0, CONFIG_TAG);
        assert!(ServerConfig::from_json(&frames[1].1).is_ok());
    }

    #[test]
    fn kick_request_disconnects_with_fixed_reason() {
        let mut server = server();
        server.on_player_joined(7);
        server.transport_mut().drain();

        server.handle(7, Message::Kick(true)).unwrap();

        assert_eq!(
            server.handshake_state(7),
            Some(ServerHandshake::Disconnected)
        );
        let disconnects = server.transport().disconnects();
        assert_eq!(disconnects.len(), 1);
        assert_eq!(disconnects[0].peer, 7);
        assert_eq!(disconnects[0].reason, OUT_OF_DATE_REASON);
    }

    #[test]
    fn kick_without_request_payload_is_a_noop() {
        let mut server = server();
        server.on_player_joined(7);

        server.handle(7, Message::Kick(false)).unwrap();

        assert_eq!(server.handshake_state(7), Some(ServerHandshake::ConfigSent));
        assert!(server.transport().disconnects().is_empty());
    }

    #[test]
    fn matching_version_advances_to_awaiting_config() {
        let mut client = client();
        client
            .handle(SERVER_PEER_ID, Message::ModVersion(PROTOCOL_VERSION.into()))
            .unwrap();

        assert_eq!(client.handshake_state(), ClientHandshake::AwaitingConfig);
        assert_eq!(client.transport().pending_count(), 0);
    }

    #[test]
    fn version_mismatch_sends_exactly_one_kick() {
        let mut client = client();
        client
            .handle(SERVER_PEER_ID, Message::ModVersion("9.9.9".into()))
            .unwrap();

        assert_eq!(client.handshake_state(), ClientHandshake::KickSent);

        let frames = decode_tags(client.transport_mut());
        assert_eq!(frames, vec![(KICK_TAG.to_string(), "1".to_string())]);
        // No other state change: the replica stays untouched.
        assert!(!client.synced_config().sent_by_server);
    }

    #[test]
    fn config_install_reaches_synced() {
        let payload = ServerConfig {
            max_skaters: 4,
            ..ServerConfig::default()
        }
        .to_json()
        .unwrap();

        let mut client = client();
        client
            .handle(SERVER_PEER_ID, Message::ModVersion(PROTOCOL_VERSION.into()))
            .unwrap();
        client
            .handle(SERVER_PEER_ID, Message::Config(payload))
            .unwrap();

        assert_eq!(client.handshake_state(), ClientHandshake::Synced);
        assert_eq!(client.synced_config().max_skaters, 4);
        assert!(client.synced_config().sent_by_server);
    }

    #[test]
    fn config_after_mismatch_still_installs_replica() {
        let mut client = client();
        client
            .handle(SERVER_PEER_ID, Message::ModVersion("9.9.9".into()))
            .unwrap();
        client
            .handle(
                SERVER_PEER_ID,
                Message::Config(ServerConfig::default().to_json().unwrap()),
            )
            .unwrap();

        assert_eq!(client.handshake_state(), ClientHandshake::KickSent);
        assert!(client.synced_config().sent_by_server);
    }

    #[test]
    fn session_stop_resets_the_replica() {
        let mut client = client();
        client
            .handle(
                SERVER_PEER_ID,
                Message::Config(
                    ServerConfig {
                        max_skaters: 2,
                        ..ServerConfig::default()
                    }
                    .to_json()
                    .unwrap(),
                ),
            )
            .unwrap();
        assert_eq!(client.synced_config().max_skaters, 2);

        client.on_session_stopped();

        assert_eq!(client.handshake_state(), ClientHandshake::AwaitingVersion);
        assert_eq!(client.synced_config().max_skaters, 5);
        assert!(!client.synced_config().sent_by_server);
    }

    #[test]
    fn frames_from_non_server_peers_are_ignored() {
        let mut client = client();
        client
            .handle(3, Message::ModVersion("9.9.9".into()))
            .unwrap();

        assert_eq!(client.handshake_state(), ClientHandshake::AwaitingVersion);
        assert_eq!(client.transport().pending_count(), 0);
    }

    #[test]
    fn admin_resolution_uses_synced_list() {
        let mut client = ClientSession::new(
            ClientConfig {
                player_id: "admin-1".into(),
                ..ClientConfig::default()
            },
            ChannelFilter::new(),
            MemoryTransport::new(),
        );
        assert!(!client.is_admin());

        let payload = ServerConfig {
            admin_ids: vec!["admin-1".into()],
            ..ServerConfig::default()
        }
        .to_json()
        .unwrap();
        client
            .handle(SERVER_PEER_ID, Message::Config(payload))
            .unwrap();

        assert!(client.is_admin());
        assert!(client.claim(Team::Blue, Role::Attacker).requester_is_admin);
    }
}
