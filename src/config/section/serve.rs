//! `[serve]` section configuration.
//!
//! Settings for the development-time reload channel.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! port = 4445    # Reload channel port
//! watch = true   # Auto-rebuild on file changes
//! ```
//!
//! The port is a contract with the reload client injected into the HTML
//! shell: there is no fallback port, a bound port is a startup failure.

use serde::{Deserialize, Serialize};

/// Reload channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeSection {
    /// TCP port for the reload channel.
    pub port: u16,

    /// Enable file watcher for rebuild and hot reload.
    pub watch: bool,
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            port: 4445,
            watch: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_serve_section() {
        let config = test_parse_config("[serve]\nport = 8080\nwatch = false");

        assert_eq!(config.serve.port, 8080);
        assert!(!config.serve.watch);
    }

    #[test]
    fn test_serve_section_defaults() {
        let config = test_parse_config("");

        assert_eq!(config.serve.port, 4445);
        assert!(config.serve.watch);
    }

    #[test]
    fn test_serve_section_partial_override() {
        let config = test_parse_config("[serve]\nport = 3000");

        assert_eq!(config.serve.port, 3000);
        assert!(config.serve.watch);
    }
}
