//! Project configuration management for `stagehand.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build] paths and flags
//! │   ├── bundle     # [bundle.main] / [bundle.renderer] entries
//! │   ├── bundler    # [bundler] external command
//! │   ├── serve      # [serve] reload channel
//! │   └── shell      # [shell] launch settings
//! ├── error          # ConfigError
//! └── mod.rs         # AppConfig (this file)
//! ```
//!
//! The config file is optional: every field has a default equal to the
//! fixed value a zero-config project expects, so `stagehand dev` works in
//! a bare project directory. Once loaded, the configuration is read-only
//! for the process lifetime.

pub mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{
    BuildSection, BundleSection, BundlerSection, DEFAULT_ASSET_EXTENSIONS, LaunchGate,
    ServeSection, ShellSection,
};

use crate::{
    cli::{Cli, Commands},
    log,
    utils::path::normalize_path,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing stagehand.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// CLI arguments reference (internal use only)
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Build paths and flags
    pub build: BuildSection,

    /// Bundle entry instructions
    pub bundle: BundleSection,

    /// External bundler invocation
    pub bundler: BundlerSection,

    /// Reload channel settings
    pub serve: ServeSection,

    /// Shell runtime launch settings
    pub shell: ShellSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cli: None,
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            build: BuildSection::default(),
            bundle: BundleSection::default(),
            bundler: BundlerSection::default(),
            serve: ServeSection::default(),
            shell: ShellSection::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file; a missing file
    /// means all defaults. The project root is the config file's parent
    /// directory, or cwd when no file exists.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let (config_path, exists) = Self::resolve_config_path(cli)?;

        let mut config = if exists {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };

        config.config_path = config_path;
        config.cli = Some(cli);
        config.finalize(cli);

        Ok(config)
    }

    /// Resolve config file path by searching upward from cwd.
    fn resolve_config_path(cli: &Cli) -> Result<(PathBuf, bool)> {
        let cwd = std::env::current_dir()
            .map_err(|e| ConfigError::Io(PathBuf::from("."), e))?;

        // Absolute --config is used as-is
        if cli.config.is_absolute() {
            let exists = cli.config.exists();
            return Ok((cli.config.clone(), exists));
        }

        for dir in cwd.ancestors() {
            let candidate = dir.join(&cli.config);
            if candidate.is_file() {
                return Ok((candidate, true));
            }
        }

        Ok((cwd.join(&cli.config), false))
    }

    /// Finalize configuration after loading.
    fn finalize(&mut self, cli: &Cli) {
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.root = normalize_path(&root);
        self.config_path = normalize_path(&self.config_path);

        // Per-bundle entry defaults (main and renderer differ)
        self.bundle.fill_defaults();

        // Normalize build directories to absolute paths under root
        self.build.home = normalize_path(&self.root.join(&self.build.home));
        self.build.output = normalize_path(&self.root.join(&self.build.output));

        self.apply_command_options(cli);
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Get path relative to the project root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Absolute path to the HTML shell source.
    pub fn shell_entry_source(&self) -> PathBuf {
        self.build.home.join(&self.build.shell_entry)
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { build_args } => {
                crate::logger::set_verbose(build_args.verbose);
                self.build.clean = build_args.clean;
            }
            Commands::Dev {
                build_args,
                port,
                watch,
            } => {
                crate::logger::set_verbose(build_args.verbose);
                self.build.clean = build_args.clean;
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.watch, watch.as_ref());
            }
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }
}

// ============================================================================
// Global config handle
// ============================================================================

/// Global configuration, set once at process start.
static CONFIG: OnceLock<Arc<AppConfig>> = OnceLock::new();

/// Install the loaded configuration and return a shared handle.
pub fn init_config(config: AppConfig) -> Arc<AppConfig> {
    let arc = Arc::new(config);
    let _ = CONFIG.set(Arc::clone(&arc));
    arc
}

/// Get the global configuration handle.
///
/// Panics if called before `init_config` (programmer error).
pub fn cfg() -> Arc<AppConfig> {
    Arc::clone(CONFIG.get().expect("config not initialized"))
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from a TOML snippet and apply per-bundle defaults.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> AppConfig {
    let (mut parsed, ignored) = AppConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed.bundle.fill_defaults();
    parsed
}

// ============================================================================
// tests
// ============================================================================
