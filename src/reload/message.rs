//! Hot Reload Message Protocol
//!
//! Defines the JSON message format for WebSocket communication between
//! the dev channel and the renderer's reload client.
//!
//! # Message Types
//!
//! - `update`: Hot-module update (re-execute the rebuilt bundle in place)
//! - `reload`: Trigger full page reload
//! - `builderror`: Display build error overlay, no reload
//! - `clearerror`: Clear the overlay after a successful rebuild
//! - `ping`/`pong`: Keep connection alive
//! - `connected`: Greeting with server version

use serde::{Deserialize, Serialize};

/// Hot reload message sent over the dev channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },

    /// Hot-module update (live-patch without a full reload)
    Update {
        /// Bundle that was rebuilt
        bundle: String,
        /// Output artifact path relative to the output directory
        path: String,
    },

    /// Full page reload (fallback when an update cannot be applied)
    Reload {
        /// Optional reason for reload
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Build error (display overlay, no reload)
    #[serde(rename = "builderror")]
    BuildError {
        /// Bundle that failed
        bundle: String,
        /// Error message
        error: String,
    },

    /// Clear error overlay (build succeeded after an error)
    #[serde(rename = "clearerror")]
    ClearError,

    /// Keep-alive ping (server → client)
    Ping {
        /// Timestamp for latency measurement
        ts: u64,
    },

    /// Keep-alive pong (client → server)
    Pong {
        /// Echo back the timestamp
        ts: u64,
    },
}

impl ReloadMessage {
    /// Create a connected message
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Create an update message
    pub fn update(bundle: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Update {
            bundle: bundle.into(),
            path: path.into(),
        }
    }

    /// Create a reload message
    pub fn reload() -> Self {
        Self::Reload { reason: None }
    }

    /// Create a reload message with reason
    pub fn reload_with_reason(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    /// Create a build error message
    pub fn build_error(bundle: impl Into<String>, error: impl Into<String>) -> Self {
        Self::BuildError {
            bundle: bundle.into(),
            error: error.into(),
        }
    }

    /// Create a clear error message
    pub fn clear_error() -> Self {
        Self::ClearError
    }

    /// Create a ping message
    pub fn ping() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self::Ping { ts }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    /// Parse from JSON string
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_serialization() {
        let msg = ReloadMessage::update("renderer", "renderer.js");
        let json = msg.to_json();
        assert!(json.contains(r#""type":"update""#));
        assert!(json.contains(r#""bundle":"renderer""#));

        let parsed = ReloadMessage::from_json(&json).unwrap();
        match parsed {
            ReloadMessage::Update { bundle, path } => {
                assert_eq!(bundle, "renderer");
                assert_eq!(path, "renderer.js");
            }
            _ => panic!("Expected Update message"),
        }
    }

    #[test]
    fn test_reload_message() {
        let msg = ReloadMessage::reload_with_reason("shell changed");
        let json = msg.to_json();
        assert!(json.contains(r#""type":"reload""#));
        assert!(json.contains(r#""reason":"shell changed""#));

        // reason is omitted entirely when absent
        let bare = ReloadMessage::reload().to_json();
        assert!(!bare.contains("reason"));
    }

    #[test]
    fn test_build_error_tag() {
        let msg = ReloadMessage::build_error("main", "unexpected token");
        let json = msg.to_json();
        assert!(json.contains(r#""type":"builderror""#));

        let cleared = ReloadMessage::clear_error().to_json();
        assert!(cleared.contains(r#""type":"clearerror""#));
    }

    #[test]
    fn test_ping_pong_roundtrip() {
        let json = r#"{"type":"pong","ts":42}"#;
        match ReloadMessage::from_json(json).unwrap() {
            ReloadMessage::Pong { ts } => assert_eq!(ts, 42),
            _ => panic!("Expected Pong message"),
        }
    }

    #[test]
    fn test_connected_carries_version() {
        let json = ReloadMessage::connected().to_json();
        assert!(json.contains(env!("CARGO_PKG_VERSION")));
    }
}
