//! `[bundle.*]` section configuration.
//!
//! Entry instructions for the two bundles. Entries are relative to
//! `build.home`.
//!
//! # Example
//!
//! ```toml
//! [bundle.main]
//! entry = "app/main.ts"
//!
//! [bundle.renderer]
//! entry = "app/index.tsx"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Entry instructions for both bundles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleSection {
    /// Main-process bundle (server-like target).
    pub main: BundleEntry,

    /// Renderer-process bundle (browser-like target).
    pub renderer: BundleEntry,
}

/// Single bundle entry instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleEntry {
    /// Entry point, relative to `build.home`.
    pub entry: PathBuf,
}

impl Default for BundleEntry {
    fn default() -> Self {
        Self {
            entry: PathBuf::new(),
        }
    }
}

impl BundleSection {
    /// Apply the per-bundle defaults that `Default` cannot express
    /// (main and renderer default to different entries).
    pub fn fill_defaults(&mut self) {
        if self.main.entry.as_os_str().is_empty() {
            self.main.entry = PathBuf::from("app/main.ts");
        }
        if self.renderer.entry.as_os_str().is_empty() {
            self.renderer.entry = PathBuf::from("app/index.tsx");
        }
    }
}
