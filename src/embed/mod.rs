//! Embedded development-time assets.
//!
//! The reload client script ships inside the binary and is written into
//! the output directory during staging, with the channel port substituted
//! into its template variable.

use std::fs;
use std::io;
use std::path::Path;

/// Browser-side reload client, with `{{WS_PORT}}` template variable.
pub const RELOAD_JS: &str = include_str!("reload.js");

/// File name the reload client is written under.
pub const RELOAD_JS_NAME: &str = "reload.js";

/// Render the reload client for a concrete channel port.
pub fn reload_js(port: u16) -> String {
    RELOAD_JS.replace("{{WS_PORT}}", &port.to_string())
}

/// Write the reload client into the output directory.
pub fn write_reload_client(output_dir: &Path, port: u16) -> io::Result<()> {
    fs::write(output_dir.join(RELOAD_JS_NAME), reload_js(port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_port_substitution() {
        let rendered = reload_js(4445);
        assert!(rendered.contains("ws://127.0.0.1:4445"));
        assert!(!rendered.contains("{{WS_PORT}}"));
    }

    #[test]
    fn test_write_reload_client() {
        let dir = TempDir::new().unwrap();
        write_reload_client(dir.path(), 5000).unwrap();

        let written = std::fs::read_to_string(dir.path().join(RELOAD_JS_NAME)).unwrap();
        assert!(written.contains(":5000"));
    }
}
