//! Closed message vocabulary for the synchronization protocol.
//!
//! Frames are decoded once at the dispatch boundary into this enum, so every
//! consumer matches exhaustively instead of switching on bare tag strings.
//! Unknown tags survive as [`Message::Unknown`] and are ignored downstream,
//! preserving forward compatibility with newer peers.

use std::borrow::Cow;

/// Tag of the version-check frame pushed by the server.
pub const MOD_VERSION_TAG: &str = "ModVersion";

/// Tag of the config sync frame pushed by the server.
pub const CONFIG_TAG: &str = "config";

/// Tag of the client-initiated kick request.
pub const KICK_TAG: &str = "kick";

/// Payload a client sends to request its own kick.
pub const KICK_REQUEST_PAYLOAD: &str = "1";

/// A decoded protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Server → client: the server's protocol version string.
    ModVersion(String),

    /// Server → client: JSON-serialized server configuration.
    Config(String),

    /// Client → server: `true` when the payload is the literal `"1"`.
    /// Any other payload decodes to `false` and is treated as a no-op.
    Kick(bool),

    /// A tag this build does not recognize. Ignored, not an error.
    Unknown { tag: String },
}

impl Message {
    /// Map a decoded tag/payload pair onto the vocabulary.
    pub fn from_wire(tag: &str, payload: String) -> Self {
        match tag {
            MOD_VERSION_TAG => Message::ModVersion(payload),
            CONFIG_TAG => Message::Config(payload),
            KICK_TAG => Message::Kick(payload == KICK_REQUEST_PAYLOAD),
            _ => Message::Unknown { tag: tag.to_string() },
        }
    }

    /// Routing tag for this message (zero-copy for the known vocabulary).
    pub fn tag(&self) -> Cow<'static, str> {
        match self {
            Message::ModVersion(_) => Cow::Borrowed(MOD_VERSION_TAG),
            Message::Config(_) => Cow::Borrowed(CONFIG_TAG),
            Message::Kick(_) => Cow::Borrowed(KICK_TAG),
            Message::Unknown { tag } => Cow::Owned(tag.clone()),
        }
    }

    /// Outbound payload text for this message.
    pub fn wire_payload(&self) -> Cow<'_, str> {
        match self {
            Message::ModVersion(version) => Cow::Borrowed(version.as_str()),
            Message::Config(json) => Cow::Borrowed(json.as_str()),
            Message::Kick(true) => Cow::Borrowed(KICK_REQUEST_PAYLOAD),
            Message::Kick(false) => Cow::Borrowed("0"),
            Message::Unknown { .. } => Cow::Borrowed(""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_decode_to_variants() {
        assert_eq!(
            Message::from_wire("ModVersion", "0.1.0DEV".into()),
            Message::ModVersion("0.1.0DEV".into())
        );
        assert_eq!(
            Message::from_wire("config", "{}".into()),
            Message::Config("{}".into())
        );
        assert_eq!(Message::from_wire("kick", "1".into()), Message::Kick(true));
    }

    #[test]
    fn kick_with_other_payload_decodes_false() {
        assert_eq!(Message::from_wire("kick", "2".into()), Message::Kick(false));
        assert_eq!(Message::from_wire("kick", "".into()), Message::Kick(false));
    }

    #[test]
    fn unknown_tag_is_preserved() {
        let msg = Message::from_wire("FutureFeature", "data".into());
        assert_eq!(
            msg,
            Message::Unknown {
                tag: "FutureFeature".into()
            }
        );
        assert_eq!(msg.tag(), "FutureFeature");
    }

    #[test]
    fn wire_payload_matches_decode() {
        let msg = Message::Kick(true);
        assert_eq!(
            Message::from_wire(&msg.tag(), msg.wire_payload().into_owned()),
            msg
        );
    }
}
