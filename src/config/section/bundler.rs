//! `[bundler]` section configuration.
//!
//! The bundler is an external collaborator: stagehand invokes it once per
//! bundle and derives its flags from the build configuration. The command
//! is an argv prefix, so wrappers work too:
//!
//! ```toml
//! [bundler]
//! command = ["npx", "esbuild"]
//! ```

use serde::{Deserialize, Serialize};

/// External bundler invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BundlerSection {
    /// Bundler executable and leading arguments.
    pub command: Vec<String>,
}

impl Default for BundlerSection {
    fn default() -> Self {
        Self {
            command: vec!["esbuild".to_string()],
        }
    }
}

impl BundlerSection {
    /// The bundler program name (first argv element).
    pub fn program(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or("esbuild")
    }
}
