//! Bundle build driver.
//!
//! Invokes the external bundler executable once per bundle, deriving its
//! flags from the build configuration and the descriptor, then applies the
//! descriptor's transform plugins to the emitted output. When caching is
//! enabled, a content hash over the bundle's source tree lets unchanged
//! bundles skip the bundler entirely.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use crate::config::AppConfig;
use crate::utils::exec::{Cmd, FilterRule};
use crate::{debug, log};

use super::config::BuildConfig;
use super::descriptor::BundleDescriptor;
use super::plugin::{TransformContext, collect_files};

/// Cache file holding per-bundle source fingerprints.
const CACHE_FILE: &str = ".stagehand-cache.json";

/// Source extensions that feed a bundle.
const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "css", "html", "json"];

/// Known-noise bundler output lines to skip when logging.
static BUNDLER_FILTER: FilterRule = FilterRule::new(&["Done in", "⚡"]);

/// Result of one bundle build.
#[derive(Debug)]
pub struct BuildOutcome {
    pub bundle: String,
    pub output: PathBuf,
    /// True when the cached fingerprint matched and the bundler was skipped.
    pub skipped: bool,
}

/// Drives the external bundler for one or more bundles.
pub struct BundleDriver<'a> {
    config: &'a AppConfig,
    build: &'a BuildConfig,
}

impl<'a> BundleDriver<'a> {
    pub fn new(config: &'a AppConfig, build: &'a BuildConfig) -> Self {
        Self { config, build }
    }

    /// Build one bundle: bundler invocation, then plugins in order.
    pub fn build(&self, bundle: &BundleDescriptor) -> Result<BuildOutcome> {
        let name = bundle.name();
        let output = self.build.output_file(name);

        fs::create_dir_all(&self.build.output)
            .with_context(|| format!("Failed to create `{}`", self.build.output.display()))?;

        // Content-hash freshness: skip the whole build when nothing changed
        let fingerprint = self.build.cache.then(|| self.source_fingerprint());
        if let Some(ref fp) = fingerprint
            && !self.config.build.clean
            && output.exists()
            && self.cached_fingerprint(name).as_deref() == Some(fp.as_str())
        {
            debug!("bundle"; "{} unchanged, skipping", name);
            return Ok(BuildOutcome {
                bundle: name.to_string(),
                output,
                skipped: true,
            });
        }

        self.run_bundler(bundle, &output)?;
        self.apply_plugins(bundle, &output)?;

        if let Some(fp) = fingerprint {
            self.store_fingerprint(name, &fp);
        }

        Ok(BuildOutcome {
            bundle: name.to_string(),
            output,
            skipped: false,
        })
    }

    /// Invoke the external bundler for one bundle.
    fn run_bundler(&self, bundle: &BundleDescriptor, output: &PathBuf) -> Result<()> {
        let program = self.config.bundler.program();
        which::which(program)
            .map_err(|_| anyhow!("bundler `{program}` not found in PATH"))?;

        log!("bundle"; "{} <- {}", bundle.name(), bundle.entry_path().display());

        Cmd::from_slice(&self.config.bundler.command)
            .args(self.bundler_args(bundle, output))
            .cwd(self.config.get_root())
            .pty(true)
            .filter(&BUNDLER_FILTER)
            .run()
            .with_context(|| format!("bundle `{}` failed", bundle.name()))?;

        Ok(())
    }

    /// Derive bundler flags from the build config and descriptor.
    fn bundler_args(&self, bundle: &BundleDescriptor, output: &PathBuf) -> Vec<String> {
        let entry = self.build.home.join(bundle.entry_path());
        let mut args = vec![
            self.config.root_relative(&entry).display().to_string(),
            "--bundle".to_string(),
            format!("--outfile={}", self.config.root_relative(output).display()),
            bundle.target_env().platform_flag().to_string(),
        ];

        if self.build.source_maps {
            args.push("--sourcemap".to_string());
        }

        if self.build.type_config.is_file() {
            args.push(format!(
                "--tsconfig={}",
                self.config.root_relative(&self.build.type_config).display()
            ));
        } else {
            debug!("bundle"; "type config {} not found, omitting", self.build.type_config.display());
        }

        args
    }

    /// Apply the descriptor's plugins in order.
    fn apply_plugins(&self, bundle: &BundleDescriptor, output: &PathBuf) -> Result<()> {
        let ctx = TransformContext {
            home: &self.build.home,
            output_dir: &self.build.output,
            bundle_output: output,
            clean: self.config.build.clean,
        };
        for plugin in bundle.plugins() {
            plugin.apply(&ctx)?;
        }
        Ok(())
    }

    // ========================================================================
    // freshness cache
    // ========================================================================

    /// Hash every source file that can feed a bundle.
    ///
    /// Both bundles share the home tree, so the fingerprint covers all
    /// source extensions plus the configured asset extensions; a change to
    /// any of them invalidates both bundles.
    fn source_fingerprint(&self) -> String {
        let mut exts: Vec<&str> = SOURCE_EXTENSIONS.to_vec();
        exts.extend(self.config.build.assets.iter().map(String::as_str));

        let mut hasher = blake3::Hasher::new();
        for path in collect_files(&self.build.home, &exts) {
            hasher.update(path.to_string_lossy().as_bytes());
            if let Ok(bytes) = fs::read(&path) {
                hasher.update(&bytes);
            }
        }
        hasher.finalize().to_hex().to_string()
    }

    fn cache_path(&self) -> PathBuf {
        self.build.output.join(CACHE_FILE)
    }

    fn load_cache(&self) -> BTreeMap<String, String> {
        fs::read_to_string(self.cache_path())
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    fn cached_fingerprint(&self, name: &str) -> Option<String> {
        self.load_cache().get(name).cloned()
    }

    fn store_fingerprint(&self, name: &str, fingerprint: &str) {
        let mut cache = self.load_cache();
        cache.insert(name.to_string(), fingerprint.to_string());
        if let Ok(json) = serde_json::to_string_pretty(&cache) {
            let _ = fs::write(self.cache_path(), json);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::descriptor::{BundleDescriptor, TargetEnv};
    use crate::config::test_parse_config;
    use tempfile::TempDir;

    fn test_setup(dir: &TempDir) -> (AppConfig, BuildConfig) {
        let mut config = test_parse_config("");
        config.root = dir.path().to_path_buf();
        config.build.home = dir.path().join("src");
        config.build.output = dir.path().join("out");
        fs::create_dir_all(&config.build.home).unwrap();
        let build = BuildConfig::from_app(&config).unwrap();
        (config, build)
    }

    #[test]
    fn test_bundler_args_main() {
        let dir = TempDir::new().unwrap();
        let (config, build) = test_setup(&dir);
        let driver = BundleDriver::new(&config, &build);

        let main = BundleDescriptor::new("main")
            .entry("app/main.ts")
            .target(TargetEnv::Server);
        let output = build.output_file("main");
        let args = driver.bundler_args(&main, &output);

        assert!(args.contains(&"src/app/main.ts".to_string()));
        assert!(args.contains(&"--bundle".to_string()));
        assert!(args.contains(&"--outfile=out/main.js".to_string()));
        assert!(args.contains(&"--platform=node".to_string()));
        assert!(args.contains(&"--sourcemap".to_string()));
        // missing tsconfig is omitted
        assert!(!args.iter().any(|a| a.starts_with("--tsconfig")));
    }

    #[test]
    fn test_bundler_args_tsconfig_when_present() {
        let dir = TempDir::new().unwrap();
        let (config, build) = test_setup(&dir);
        fs::write(dir.path().join("tsconfig.json"), "{}").unwrap();
        let driver = BundleDriver::new(&config, &build);

        let renderer = BundleDescriptor::new("renderer")
            .entry("app/index.tsx")
            .target(TargetEnv::Browser);
        let output = build.output_file("renderer");
        let args = driver.bundler_args(&renderer, &output);

        assert!(args.contains(&"--platform=browser".to_string()));
        assert!(args.contains(&"--tsconfig=tsconfig.json".to_string()));
    }

    #[test]
    fn test_bundler_args_no_sourcemap() {
        let dir = TempDir::new().unwrap();
        let (mut config, _) = test_setup(&dir);
        config.build.source_maps = false;
        let build = BuildConfig::from_app(&config).unwrap();
        let driver = BundleDriver::new(&config, &build);

        let main = BundleDescriptor::new("main").entry("app/main.ts");
        let output = build.output_file("main");
        let args = driver.bundler_args(&main, &output);

        assert!(!args.contains(&"--sourcemap".to_string()));
    }

    #[test]
    fn test_fingerprint_changes_with_sources() {
        let dir = TempDir::new().unwrap();
        let (config, build) = test_setup(&dir);
        fs::write(config.build.home.join("main.ts"), "let a = 1;").unwrap();

        let driver = BundleDriver::new(&config, &build);
        let first = driver.source_fingerprint();

        fs::write(config.build.home.join("main.ts"), "let a = 2;").unwrap();
        let second = driver.source_fingerprint();

        assert_ne!(first, second);
    }

    #[test]
    fn test_fingerprint_ignores_unrelated_files() {
        let dir = TempDir::new().unwrap();
        let (config, build) = test_setup(&dir);
        fs::write(config.build.home.join("main.ts"), "let a = 1;").unwrap();

        let driver = BundleDriver::new(&config, &build);
        let first = driver.source_fingerprint();

        fs::write(config.build.home.join("notes.txt"), "unrelated").unwrap();
        let second = driver.source_fingerprint();

        assert_eq!(first, second);
    }

    #[test]
    fn test_fingerprint_cache_roundtrip() {
        let dir = TempDir::new().unwrap();
        let (config, build) = test_setup(&dir);
        fs::create_dir_all(&build.output).unwrap();
        let driver = BundleDriver::new(&config, &build);

        assert!(driver.cached_fingerprint("main").is_none());

        driver.store_fingerprint("main", "abc123");
        assert_eq!(driver.cached_fingerprint("main").as_deref(), Some("abc123"));

        driver.store_fingerprint("renderer", "def456");
        assert_eq!(driver.cached_fingerprint("main").as_deref(), Some("abc123"));
        assert_eq!(
            driver.cached_fingerprint("renderer").as_deref(),
            Some("def456")
        );
    }
}
