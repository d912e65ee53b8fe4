//! `[build]` section configuration.
//!
//! Paths and flags for the bundling step. Defaults reproduce the fixed
//! values a zero-config project expects, so `stagehand dev` works without
//! a config file.
//!
//! # Example
//!
//! ```toml
//! [build]
//! home = "src"                  # Source tree root
//! output = "out"                # Output directory
//! target = "electron"           # Target platform identifier
//! cache = true                  # Skip rebuilds when sources are unchanged
//! source_maps = true            # Emit source maps
//! type_config = "tsconfig.json" # Type-config file passed to the bundler
//! shell_entry = "app/index.html" # HTML shell, relative to `home`
//! assets = ["jpg", "jpeg", "png", "gif", "svg"]
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Asset extensions copied by the renderer's asset-copy transform.
pub const DEFAULT_ASSET_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "svg"];

/// Build settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Source tree root, relative to the project root.
    pub home: PathBuf,

    /// Output directory, relative to the project root.
    pub output: PathBuf,

    /// Target platform identifier.
    pub target: String,

    /// Skip rebuilding a bundle when its sources are unchanged.
    pub cache: bool,

    /// Emit source maps next to bundle output.
    pub source_maps: bool,

    /// Type-config file passed through to the bundler.
    pub type_config: PathBuf,

    /// HTML shell entry, relative to `home`.
    pub shell_entry: PathBuf,

    /// Asset file extensions for the asset-copy transform.
    pub assets: Vec<String>,

    /// Clean output directory completely before building (CLI only).
    #[serde(skip)]
    pub clean: bool,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            home: PathBuf::from("src"),
            output: PathBuf::from("out"),
            target: "electron".to_string(),
            cache: true,
            source_maps: true,
            type_config: PathBuf::from("tsconfig.json"),
            shell_entry: PathBuf::from("app/index.html"),
            assets: DEFAULT_ASSET_EXTENSIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            clean: false,
        }
    }
}

impl BuildSection {
    /// Absolute path to the HTML shell source.
    pub fn shell_entry_path(&self) -> PathBuf {
        self.home.join(&self.shell_entry)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_build_section_defaults() {
        let config = test_parse_config("");

        assert_eq!(config.build.home, std::path::Path::new("src"));
        assert_eq!(config.build.output, std::path::Path::new("out"));
        assert_eq!(config.build.target, "electron");
        assert!(config.build.cache);
        assert!(config.build.source_maps);
        assert_eq!(
            config.build.type_config,
            std::path::Path::new("tsconfig.json")
        );
        assert_eq!(
            config.build.shell_entry,
            std::path::Path::new("app/index.html")
        );
        assert_eq!(
            config.build.assets,
            vec!["jpg", "jpeg", "png", "gif", "svg"]
        );
    }

    #[test]
    fn test_build_section_overrides() {
        let config = test_parse_config(
            "[build]\nhome = \"web\"\ncache = false\nassets = [\"png\"]",
        );

        assert_eq!(config.build.home, std::path::Path::new("web"));
        assert!(!config.build.cache);
        assert_eq!(config.build.assets, vec!["png"]);
        // untouched fields keep defaults
        assert!(config.build.source_maps);
    }
}
