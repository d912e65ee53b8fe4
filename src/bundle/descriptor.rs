//! Bundle descriptors.
//!
//! A descriptor names one compilation target: its entry instruction, the
//! execution environment it targets, its watch/hmr flags, and the ordered
//! transform plugins applied to its output. Built fluent-style:
//!
//! ```ignore
//! let main = BundleDescriptor::new("main")
//!     .entry("app/main.ts")
//!     .target(TargetEnv::Server)
//!     .watch(true);
//! ```

use std::path::{Path, PathBuf};

use crate::config::AppConfig;

use super::plugin::{AssetCopy, TransformPlugin};

/// Execution environment a bundle targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEnv {
    /// Server-like environment (main process).
    Server,
    /// Browser-like environment (renderer process).
    Browser,
}

impl TargetEnv {
    /// Platform flag passed to the external bundler.
    pub fn platform_flag(self) -> &'static str {
        match self {
            Self::Server => "--platform=node",
            Self::Browser => "--platform=browser",
        }
    }
}

/// One compilation target registered with the sequencer.
#[derive(Debug, Clone)]
pub struct BundleDescriptor {
    name: String,
    /// Entry point, relative to the build home directory.
    entry: PathBuf,
    target: TargetEnv,
    watch: bool,
    hmr: bool,
    plugins: Vec<TransformPlugin>,
}

impl BundleDescriptor {
    /// Create a descriptor with browser target and no flags set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry: PathBuf::new(),
            target: TargetEnv::Browser,
            watch: false,
            hmr: false,
            plugins: Vec::new(),
        }
    }

    /// Set the entry instruction.
    pub fn entry(mut self, entry: impl Into<PathBuf>) -> Self {
        self.entry = entry.into();
        self
    }

    /// Set the target environment.
    pub fn target(mut self, target: TargetEnv) -> Self {
        self.target = target;
        self
    }

    /// Enable file watching (re-triggers rebuild on source change).
    pub fn watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    /// Enable hot-module-reload delivery on rebuild.
    pub fn hmr(mut self, hmr: bool) -> Self {
        self.hmr = hmr;
        self
    }

    /// Append a transform plugin.
    pub fn plugin(mut self, plugin: TransformPlugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry_path(&self) -> &Path {
        &self.entry
    }

    pub fn target_env(&self) -> TargetEnv {
        self.target
    }

    pub fn is_watched(&self) -> bool {
        self.watch
    }

    pub fn is_hmr(&self) -> bool {
        self.hmr
    }

    pub fn plugins(&self) -> &[TransformPlugin] {
        &self.plugins
    }
}

/// The standard main/renderer pair.
///
/// - *main*: server-like target, watch on, no hmr, no plugins
/// - *renderer*: browser-like target, watch on, hmr on, one stylesheet
///   transform and one asset-copy transform
pub fn standard_pair(config: &AppConfig) -> (BundleDescriptor, BundleDescriptor) {
    let watch = config.serve.watch;

    let main = BundleDescriptor::new("main")
        .entry(&config.bundle.main.entry)
        .target(TargetEnv::Server)
        .watch(watch);

    let renderer = BundleDescriptor::new("renderer")
        .entry(&config.bundle.renderer.entry)
        .target(TargetEnv::Browser)
        .plugin(TransformPlugin::css())
        .plugin(TransformPlugin::CopyAssets(AssetCopy::from_extensions(
            &config.build.assets,
        )))
        .watch(watch)
        .hmr(watch);

    (main, renderer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_builder() {
        let bundle = BundleDescriptor::new("main")
            .entry("app/main.ts")
            .target(TargetEnv::Server)
            .watch(true);

        assert_eq!(bundle.name(), "main");
        assert_eq!(bundle.entry_path(), Path::new("app/main.ts"));
        assert_eq!(bundle.target_env(), TargetEnv::Server);
        assert!(bundle.is_watched());
        assert!(!bundle.is_hmr());
        assert!(bundle.plugins().is_empty());
    }

    #[test]
    fn test_standard_pair_targets() {
        let config = test_parse_config("");
        let (main, renderer) = standard_pair(&config);

        assert_eq!(main.target_env(), TargetEnv::Server);
        assert_eq!(renderer.target_env(), TargetEnv::Browser);
    }

    #[test]
    fn test_standard_pair_renderer_plugins() {
        let config = test_parse_config("");
        let (_, renderer) = standard_pair(&config);

        // exactly one stylesheet transform and one asset-copy transform
        let css = renderer
            .plugins()
            .iter()
            .filter(|p| matches!(p, TransformPlugin::Css(_)))
            .count();
        let copy = renderer
            .plugins()
            .iter()
            .filter(|p| matches!(p, TransformPlugin::CopyAssets(_)))
            .count();
        assert_eq!(css, 1);
        assert_eq!(copy, 1);
    }

    #[test]
    fn test_standard_pair_hmr_flags() {
        let config = test_parse_config("");
        let (main, renderer) = standard_pair(&config);

        assert!(main.is_watched());
        assert!(!main.is_hmr());
        assert!(renderer.is_watched());
        assert!(renderer.is_hmr());
    }

    #[test]
    fn test_standard_pair_watch_disabled() {
        let config = test_parse_config("[serve]\nwatch = false");
        let (main, renderer) = standard_pair(&config);

        assert!(!main.is_watched());
        assert!(!renderer.is_hmr());
    }

    #[test]
    fn test_platform_flags() {
        assert_eq!(TargetEnv::Server.platform_flag(), "--platform=node");
        assert_eq!(TargetEnv::Browser.platform_flag(), "--platform=browser");
    }
}
