//! # Configuration Management
//!
//! Server- and client-side configuration for the synchronization layer.
//!
//! The server owns the single authoritative [`ServerConfig`], read from its
//! JSON config file once at startup and immutable afterwards. Each client
//! holds a *replica* inside a [`ConfigStore`], installed wholesale whenever a
//! config frame arrives and reset to defaults when the session ends so one
//! server's limits never leak into the next.
//!
//! ## Configuration Sources
//! - JSON files via `from_file()` / `load_or_create()`
//! - The config frame payload via `from_json()` (same serialized form)
//! - Direct instantiation with defaults

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info, warn};

use crate::error::{Result, SyncError};

/// Authoritative server settings, pushed to every client as it joins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Whether informational logs are emitted.
    pub log_info: bool,

    /// Skaters allowed on the ice at the same time, per team.
    pub max_skaters: i32,

    /// Whether team balancing is always enforced.
    pub team_balancing: bool,

    /// Allowed skater-count gap between the teams while balancing is active.
    pub team_balance_offset: i32,

    /// Enforce balancing only while exactly one team fields a goalie.
    pub team_balancing_goalie: bool,

    /// Whether admins may bypass the skater limit.
    pub admin_bypass: bool,

    /// Platform ids of the server's admins.
    pub admin_ids: Vec<String>,

    /// Set on the client when the replica was installed from a server push.
    /// Gates the authorization policy: without a synced config the client
    /// behaves as if the mod were absent on the server.
    #[serde(skip)]
    pub sent_by_server: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_info: true,
            max_skaters: 5,
            team_balancing: false,
            team_balance_offset: 0,
            team_balancing_goalie: false,
            admin_bypass: true,
            admin_ids: Vec::new(),
            sent_by_server: false,
        }
    }
}

impl ServerConfig {
    /// Serialize for the config frame payload and the config file.
    ///
    /// # Errors
    /// Returns `SyncError::ConfigPayload` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a config frame payload or config file body.
    ///
    /// # Errors
    /// Returns `SyncError::ConfigPayload` on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file.
    ///
    /// # Errors
    /// Returns `SyncError::Io` if the file cannot be read and
    /// `SyncError::ConfigPayload` if it does not parse.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Save configuration to a JSON file.
    ///
    /// # Errors
    /// Returns `SyncError::Io` if the file cannot be written.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read the server config file, falling back to defaults when the file is
    /// missing or unreadable, then overlay the host-supplied admin ids and
    /// write the effective values back (creating the file on first run).
    pub fn load_or_create<P: AsRef<Path>>(path: P, admin_ids: Vec<String>) -> Self {
        let path = path.as_ref();

        let mut config = if path.exists() {
            match Self::from_file(path) {
                Ok(config) => {
                    info!(path = %path.display(), "server config read");
                    config
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "cannot read server config, using defaults");
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.admin_ids = admin_ids;

        if let Err(e) = config.save_to_file(path) {
            warn!(path = %path.display(), error = %e, "cannot write server config file");
        }

        config
    }

    /// Validate the configuration for common misconfigurations.
    ///
    /// Returns a list of findings; an empty list means the config is sane.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_skaters < 1 {
            errors.push(format!(
                "max_skaters must be at least 1 (got {})",
                self.max_skaters
            ));
        }

        if self.team_balance_offset.abs() > self.max_skaters {
            errors.push(format!(
                "team_balance_offset {} exceeds max_skaters {}",
                self.team_balance_offset, self.max_skaters
            ));
        }

        if self.admin_ids.iter().any(|id| id.trim().is_empty()) {
            errors.push("admin_ids contains a blank id".to_string());
        }

        errors
    }

    /// Validate and return a Result, for hosts that refuse to start on a bad
    /// config.
    ///
    /// # Errors
    /// Returns `SyncError::Config` listing every finding.
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SyncError::Config(format!(
                "configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Local client settings. Never transmitted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Whether informational logs are emitted.
    pub log_info: bool,

    /// The local player's platform id, matched against the synced admin list.
    pub player_id: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_info: true,
            player_id: String::new(),
        }
    }
}

impl ClientConfig {
    /// Deserialize a client config file body.
    ///
    /// # Errors
    /// Returns `SyncError::ConfigPayload` on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read the client config file, falling back to defaults when missing or
    /// unreadable, and write the effective values back.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        let config = if path.exists() {
            match std::fs::read_to_string(path)
                .map_err(SyncError::from)
                .and_then(|contents| Self::from_json(&contents))
            {
                Ok(config) => config,
                Err(e) => {
                    error!(path = %path.display(), error = %e, "cannot read client config, using defaults");
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        match serde_json::to_string_pretty(&config) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    warn!(path = %path.display(), error = %e, "cannot write client config file");
                }
            }
            Err(e) => warn!(error = %e, "cannot serialize client config"),
        }

        config
    }
}

/// Session-scoped holder of the server-originated configuration.
///
/// On the client this is the replica side of the sync: [`install`] replaces
/// the whole config from a server push and [`reset`] restores defaults when
/// the session ends.
///
/// [`install`]: ConfigStore::install
/// [`reset`]: ConfigStore::reset
#[derive(Debug, Default)]
pub struct ConfigStore {
    replica: ServerConfig,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the replica wholesale from a config frame payload.
    ///
    /// Repeated installs of the same payload are idempotent: the config may
    /// legitimately be re-sent and each delivery is a full replacement, not a
    /// delta.
    ///
    /// # Errors
    /// Returns `SyncError::ConfigPayload` on malformed JSON; the previous
    /// replica is left untouched in that case.
    pub fn install(&mut self, json: &str) -> Result<()> {
        let mut replica = ServerConfig::from_json(json)?;
        replica.sent_by_server = true;
        self.replica = replica;
        Ok(())
    }

    /// Restore defaults. Called when the client leaves a session so a
    /// previous server's limits never apply to the next one.
    pub fn reset(&mut self) {
        self.replica = ServerConfig::default();
    }

    /// The currently active configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.replica
    }

    /// True once a server push has installed the replica.
    pub fn is_synced(&self) -> bool {
        self.replica.sent_by_server
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_values() {
        let config = ServerConfig::default();
        assert!(config.log_info);
        assert_eq!(config.max_skaters, 5);
        assert!(!config.team_balancing);
        assert_eq!(config.team_balance_offset, 0);
        assert!(!config.team_balancing_goalie);
        assert!(config.admin_bypass);
        assert!(config.admin_ids.is_empty());
        assert!(!config.sent_by_server);
    }

    #[test]
    fn json_roundtrip() {
        let mut config = ServerConfig::default();
        config.max_skaters = 4;
        config.team_balancing = true;
        config.admin_ids = vec!["76561198000000001".to_string()];

        let json = config.to_json().unwrap();
        let parsed = ServerConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn sent_by_server_is_never_serialized() {
        let mut config = ServerConfig::default();
        config.sent_by_server = true;
        let json = config.to_json().unwrap();
        assert!(!json.contains("sent_by_server"));

        let parsed = ServerConfig::from_json(&json).unwrap();
        assert!(!parsed.sent_by_server);
    }

    #[test]
    fn install_sets_sync_flag_and_is_idempotent() {
        let payload = ServerConfig {
            max_skaters: 3,
            ..ServerConfig::default()
        }
        .to_json()
        .unwrap();

        let mut store = ConfigStore::new();
        assert!(!store.is_synced());

        store.install(&payload).unwrap();
        assert!(store.is_synced());
        assert_eq!(store.config().max_skaters, 3);
        let first = store.config().clone();

        store.install(&payload).unwrap();
        assert_eq!(*store.config(), first);
    }

    #[test]
    fn install_failure_keeps_previous_replica() {
        let mut store = ConfigStore::new();
        store
            .install(&ServerConfig::default().to_json().unwrap())
            .unwrap();

        assert!(store.install("not json").is_err());
        assert!(store.is_synced());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut store = ConfigStore::new();
        let payload = ServerConfig {
            max_skaters: 2,
            ..ServerConfig::default()
        }
        .to_json()
        .unwrap();
        store.install(&payload).unwrap();

        store.reset();
        assert!(!store.is_synced());
        assert_eq!(store.config().max_skaters, 5);
    }

    #[test]
    fn unknown_fields_in_payload_are_tolerated() {
        let mut store = ConfigStore::new();
        store
            .install(r#"{"max_skaters": 6, "future_setting": "ignored"}"#)
            .unwrap();
        assert_eq!(store.config().max_skaters, 6);
        // Missing fields fall back to defaults.
        assert!(store.config().admin_bypass);
    }

    #[test]
    fn load_or_create_writes_defaults_and_overlays_admins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rink_serverconfig.json");

        let admins = vec!["admin-1".to_string()];
        let config = ServerConfig::load_or_create(&path, admins.clone());
        assert_eq!(config.admin_ids, admins);
        assert!(path.exists());

        // Second load picks the file back up.
        let reloaded = ServerConfig::load_or_create(&path, Vec::new());
        assert_eq!(reloaded.max_skaters, 5);
    }

    #[test]
    fn validate_flags_bad_values() {
        let mut config = ServerConfig::default();
        config.max_skaters = 0;
        config.admin_ids = vec![" ".to_string()];
        let errors = config.validate();
        assert_eq!(errors.len(), 2);
        assert!(config.validate_strict().is_err());

        assert!(ServerConfig::default().validate_strict().is_ok());
    }
}
