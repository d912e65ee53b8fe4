//! `[shell]` section configuration.
//!
//! How the desktop shell runtime is launched once the initial build is
//! ready.
//!
//! # Example
//!
//! ```toml
//! [shell]
//! interpreter = "node"
//! launcher = "node_modules/electron/cli.js"
//! launch_gate = "watch-started"   # or "clean-build"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Condition gating the launch phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LaunchGate {
    /// Launch once the initial build run has finished, even with compile
    /// errors; the reload overlay surfaces them.
    WatchStarted,
    /// Launch only when both initial bundle builds succeed.
    CleanBuild,
}

/// Shell runtime launch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSection {
    /// Interpreter command used to start the launcher script.
    pub interpreter: String,

    /// CLI launcher script, relative to the project root.
    pub launcher: PathBuf,

    /// Condition that must hold before the shell runtime is spawned.
    pub launch_gate: LaunchGate,
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            interpreter: "node".to_string(),
            launcher: PathBuf::from("node_modules/electron/cli.js"),
            launch_gate: LaunchGate::WatchStarted,
        }
    }
}
