//! The build-and-launch sequencer.
//!
//! An explicit object constructed once at process start, holding the
//! configuration, the two bundle descriptors, and the reload client
//! registry, with a `run()` entry point that drives the linear phase
//! sequence and returns the exit code to propagate:
//!
//! 1. **Staging** - copy the HTML shell into the output directory
//! 2. **Configuring** - construct the build configuration
//! 3. **Building** - bind the reload channel, run both initial bundle
//!    builds, start the watch loop
//! 4. **Launched** - spawn the shell runtime and mirror its exit code
//!
//! Every precondition is explicit: staging failure prevents building, a
//! bound dev port prevents launching, and the launch gate decides whether
//! initial build errors do.

mod error;
mod phase;

pub use error::SequencerError;
pub use phase::Phase;

use std::sync::Arc;

use crate::bundle::{BuildConfig, BundleDescriptor, BundleDriver, standard_pair};
use crate::config::{AppConfig, LaunchGate};
use crate::reload::{ClientRegistry, ReloadServer};
use crate::watch::{FsWatcher, WatchContext};
use crate::{debug, log, shell, stage, watch};

/// Build-and-launch sequencer.
pub struct Sequencer {
    config: Arc<AppConfig>,
    bundles: Vec<BundleDescriptor>,
    registry: ClientRegistry,
    phase: Phase,
}

impl Sequencer {
    /// Construct the sequencer with the standard main/renderer pair.
    pub fn new(config: Arc<AppConfig>) -> Self {
        let (main, renderer) = standard_pair(&config);
        Self {
            config,
            bundles: vec![main, renderer],
            registry: ClientRegistry::new(),
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn bundles(&self) -> &[BundleDescriptor] {
        &self.bundles
    }

    /// Drive all four phases and return the exit code to propagate.
    ///
    /// `Ok(code)` is the shell runtime's exit code (or the signal
    /// sentinel); with the `clean-build` launch gate it can also be a
    /// plain failure code when the initial build fails. `Err` is a fatal
    /// pre-launch failure.
    pub fn run(mut self) -> Result<i32, SequencerError> {
        let watch_enabled = self.config.serve.watch;

        // Phase 1: the shell copy must complete before bundling begins
        self.advance(Phase::Staging);
        stage::stage_shell(&self.config, watch_enabled)?;

        // Phase 2: in-memory only, no I/O
        self.advance(Phase::Configuring);
        let build = BuildConfig::from_app(&self.config)?;

        // Phase 3: reload channel first, then both initial builds
        self.advance(Phase::Building);
        let healthy = self.build_phase(&build)?;

        if !healthy && self.config.shell.launch_gate == LaunchGate::CleanBuild {
            log!("error"; "initial build failed and launch gate is clean-build, not launching");
            return Ok(1);
        }

        // Phase 4: launch and supervise
        self.advance(Phase::Launched);
        let handle = shell::spawn(&self.config)?;
        log!("shell"; "launched {} (pid {})", self.config.shell.interpreter, handle.pid());

        let code = handle.wait()?;
        log!("shell"; "shell process exited with code {}", code);

        self.advance(Phase::Terminated);
        Ok(code)
    }

    /// Phase 3 body. Returns whether every initial build succeeded.
    ///
    /// The reload channel binds before anything else so a bound port is
    /// reported before any work is done, and the watcher starts buffering
    /// before the initial build so no change is lost.
    fn build_phase(&mut self, build: &BuildConfig) -> Result<bool, SequencerError> {
        let watch_enabled = self.config.serve.watch;

        if watch_enabled {
            let server = ReloadServer::bind(self.config.serve.port)?;
            server.start(self.registry.clone());
        }

        // Watcher-first: buffer events during the initial build
        let watcher = if watch_enabled {
            match FsWatcher::new(&[build.home.clone()]) {
                Ok(w) => Some(w),
                Err(e) => {
                    log!("watch"; "file watching unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let healthy = self.initial_build(build);
        crate::core::set_healthy(healthy);

        if let Some(watcher) = watcher {
            let (shutdown_tx, shutdown_rx) = crossbeam::channel::unbounded::<()>();
            crate::core::register_shutdown_tx(shutdown_tx);
            watch::spawn(
                watcher,
                WatchContext {
                    config: Arc::clone(&self.config),
                    build: build.clone(),
                    bundles: self.bundles.clone(),
                    registry: self.registry.clone(),
                },
                shutdown_rx,
            );
        }

        Ok(healthy)
    }

    /// Run both initial bundle builds concurrently.
    fn initial_build(&self, build: &BuildConfig) -> bool {
        let driver = BundleDriver::new(&self.config, build);
        let (main, renderer) = (&self.bundles[0], &self.bundles[1]);

        let (main_result, renderer_result) =
            rayon::join(|| driver.build(main), || driver.build(renderer));

        let mut healthy = true;
        for (bundle, result) in [(main, main_result), (renderer, renderer_result)] {
            match result {
                Ok(outcome) if outcome.skipped => {
                    log!("bundle"; "{} unchanged, using cached build", outcome.bundle);
                }
                Ok(outcome) => {
                    log!("bundle"; "{} -> {}", outcome.bundle, self.config.root_relative(&outcome.output).display());
                }
                Err(e) => {
                    healthy = false;
                    log!("error"; "initial build of `{}` failed: {:#}", bundle.name(), e);
                    self.registry.set_error(bundle.name(), &format!("{e:#}"));
                }
            }
        }
        healthy
    }

    /// Advance to the next phase, asserting the linear order.
    fn advance(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal phase transition {:?} -> {:?}",
            self.phase,
            next
        );
        debug!("dev"; "phase: {}", next.label());
        self.phase = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::TargetEnv;
    use crate::config::test_parse_config;
    use std::net::TcpListener;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir, extra: &str) -> Arc<AppConfig> {
        let mut config = test_parse_config(extra);
        config.root = dir.path().to_path_buf();
        config.build.home = dir.path().join("src");
        config.build.output = dir.path().join("out");
        Arc::new(config)
    }

    #[test]
    fn test_new_registers_standard_pair() {
        let dir = TempDir::new().unwrap();
        let sequencer = Sequencer::new(test_config(&dir, ""));

        assert_eq!(sequencer.phase(), Phase::Idle);
        let bundles = sequencer.bundles();
        assert_eq!(bundles.len(), 2);
        assert_eq!(bundles[0].name(), "main");
        assert_eq!(bundles[0].target_env(), TargetEnv::Server);
        assert_eq!(bundles[1].name(), "renderer");
        assert_eq!(bundles[1].target_env(), TargetEnv::Browser);
    }

    #[test]
    fn test_missing_shell_never_launches() {
        let dir = TempDir::new().unwrap();
        // no src/app/index.html exists
        let sequencer = Sequencer::new(test_config(&dir, "[serve]\nwatch = false"));

        let err = sequencer.run().unwrap_err();
        assert!(matches!(err, SequencerError::Staging(..)));
        // output dir may exist, but no bundle output was ever written
        assert!(!dir.path().join("out/main.js").exists());
    }

    #[test]
    fn test_occupied_port_fails_before_launch() {
        let dir = TempDir::new().unwrap();
        let holder = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = holder.local_addr().unwrap().port();

        let config = test_config(&dir, &format!("[serve]\nport = {port}"));
        std::fs::create_dir_all(config.build.home.join("app")).unwrap();
        std::fs::write(config.shell_entry_source(), "<body></body>").unwrap();

        let err = Sequencer::new(config).run().unwrap_err();
        assert!(matches!(err, SequencerError::PortInUse(p, _) if p == port));
    }

    #[test]
    fn test_staging_precedes_bundling() {
        let dir = TempDir::new().unwrap();
        // clean-build gate + a bundler that always fails: the sequencer
        // must still have staged the shell before giving up
        let config = test_config(
            &dir,
            "[serve]\nwatch = false\n[shell]\nlaunch_gate = \"clean-build\"\n[bundler]\ncommand = [\"false\"]",
        );
        std::fs::create_dir_all(config.build.home.join("app")).unwrap();
        std::fs::write(config.shell_entry_source(), "<body></body>").unwrap();
        std::fs::write(config.build.home.join("app/main.ts"), "export {};").unwrap();

        let code = Sequencer::new(config.clone()).run().unwrap();
        assert_eq!(code, 1);
        assert!(config.build.output.join("index.html").exists());
    }
}
