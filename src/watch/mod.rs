//! File watching and rebuild routing.
//!
//! Implements the "Watcher-First" pattern for zero event loss: the notify
//! watcher is created before the initial build and buffers events until
//! the watch loop starts draining them.
//!
//! Architecture:
//! ```text
//! Watcher → Debouncer (pure timing) → classify → rebuild → ReloadMessage
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashMap;

use crate::bundle::{BuildConfig, BundleDescriptor, BundleDriver};
use crate::config::AppConfig;
use crate::reload::{ClientRegistry, ReloadMessage};
use crate::{debug, log, logger, stage};

mod debouncer;

pub use debouncer::ChangeKind;
use debouncer::Debouncer;

/// Script extensions that feed both bundles.
const SCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs"];

/// Cap on the select-loop sleep so shutdown is noticed while idle.
const IDLE_TICK_MS: u64 = 500;

/// File watcher handle with buffered event channel.
///
/// Create this BEFORE the initial build: events buffer in the channel
/// while the build runs, eliminating the vacuum period.
pub struct FsWatcher {
    /// Channel to receive notify events (sync → async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
}

impl FsWatcher {
    /// Create a watcher over the given roots, buffering immediately.
    pub fn new(roots: &[PathBuf]) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        for root in roots {
            if root.exists() {
                watcher.watch(root, RecursiveMode::Recursive)?;
            } else {
                debug!("watch"; "root {} missing, not watched", root.display());
            }
        }

        Ok(Self {
            notify_rx,
            watcher,
        })
    }
}

/// Everything the watch loop needs to rebuild and notify.
pub struct WatchContext {
    pub config: Arc<AppConfig>,
    pub build: BuildConfig,
    pub bundles: Vec<BundleDescriptor>,
    pub registry: ClientRegistry,
}

/// Spawn the watch loop on its own thread hosting a small tokio runtime.
pub fn spawn(
    watcher: FsWatcher,
    ctx: WatchContext,
    shutdown_rx: crossbeam::channel::Receiver<()>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("Failed to create tokio runtime");

        rt.block_on(run_loop(watcher, ctx, shutdown_rx));
    })
}

/// The watch event loop: drain notify events, debounce, rebuild.
async fn run_loop(
    watcher: FsWatcher,
    ctx: WatchContext,
    shutdown_rx: crossbeam::channel::Receiver<()>,
) {
    let notify_rx = watcher.notify_rx;
    let _watcher = watcher.watcher;
    let mut debouncer = Debouncer::new();

    let (async_tx, mut async_rx) = tokio::sync::mpsc::channel::<notify::Event>(64);

    // Spawn a thread to poll notify events and send to async channel
    std::thread::spawn(move || {
        while let Ok(result) = notify_rx.recv() {
            match result {
                Ok(event) => {
                    if async_tx.blocking_send(event).is_err() {
                        break; // Receiver dropped
                    }
                }
                Err(e) => log!("watch"; "notify error: {}", e),
            }
        }
    });

    log!("watch"; "watching {}", ctx.config.root_relative(&ctx.build.home).display());

    loop {
        let tick = debouncer
            .sleep_duration()
            .min(Duration::from_millis(IDLE_TICK_MS));

        tokio::select! {
            biased;
            Some(event) = async_rx.recv() => debouncer.add_event(&event),
            _ = tokio::time::sleep(tick) => {
                if shutdown_rx.try_recv().is_ok() || crate::core::is_shutdown() {
                    break;
                }
                if let Some(changes) = debouncer.take_if_ready() {
                    process_changes(changes, &ctx);
                }
            }
        }
    }
}

/// What a batch of file changes requires.
#[derive(Debug, Default, PartialEq)]
pub struct RebuildPlan {
    /// Re-run staging and force a full reload.
    pub restage: bool,
    /// Bundle names to rebuild, in registration order.
    pub bundles: Vec<String>,
}

impl RebuildPlan {
    pub fn is_empty(&self) -> bool {
        !self.restage && self.bundles.is_empty()
    }
}

/// Map changed paths to the bundles that must rebuild.
///
/// - shell entry → restage + full reload
/// - script sources → every watched bundle
/// - stylesheets and assets → watched bundles carrying transform plugins
pub fn classify(
    changes: &FxHashMap<PathBuf, ChangeKind>,
    config: &AppConfig,
    bundles: &[BundleDescriptor],
) -> RebuildPlan {
    let mut plan = RebuildPlan::default();
    let asset_exts: Vec<&str> = config.build.assets.iter().map(String::as_str).collect();

    let mut scripts = false;
    let mut transforms = false;

    for path in changes.keys() {
        if stage::is_shell_entry(config, path) {
            plan.restage = true;
        } else if has_ext(path, SCRIPT_EXTENSIONS) {
            scripts = true;
        } else if has_ext(path, &["css"]) || has_ext(path, &asset_exts) {
            transforms = true;
        }
    }

    for bundle in bundles.iter().filter(|b| b.is_watched()) {
        let wanted = scripts || (transforms && !bundle.plugins().is_empty());
        if wanted {
            plan.bundles.push(bundle.name().to_string());
        }
    }

    plan
}

fn has_ext(path: &Path, exts: &[&str]) -> bool {
    crate::utils::path::has_extension(path, exts)
}

/// Execute a rebuild plan: restage, rebuild, notify reload clients.
fn process_changes(changes: FxHashMap<PathBuf, ChangeKind>, ctx: &WatchContext) {
    let plan = classify(&changes, &ctx.config, &ctx.bundles);
    if plan.is_empty() {
        return;
    }

    if plan.restage {
        match stage::stage_shell(&ctx.config, true) {
            Ok(_) => {
                logger::status_success("restaged shell");
                ctx.registry
                    .broadcast(&ReloadMessage::reload_with_reason("shell changed"));
            }
            Err(e) => logger::status_error("restage failed", &e.to_string()),
        }
    }

    let driver = BundleDriver::new(&ctx.config, &ctx.build);
    let mut failed = false;

    for name in &plan.bundles {
        let Some(bundle) = ctx.bundles.iter().find(|b| b.name() == name.as_str()) else {
            continue;
        };

        match driver.build(bundle) {
            Ok(outcome) => {
                logger::status_success(&format!("rebuilt {}", outcome.bundle));
                if bundle.is_hmr() {
                    let artifact = outcome
                        .output
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    ctx.registry
                        .broadcast(&ReloadMessage::update(bundle.name(), artifact));
                }
            }
            Err(e) => {
                failed = true;
                logger::status_error(&format!("rebuild failed: {}", bundle.name()), &e.to_string());
                ctx.registry.set_error(bundle.name(), &e.to_string());
            }
        }
    }

    // A clean round clears any standing error overlay
    if !failed {
        ctx.registry.clear_error();
    }
    crate::core::set_healthy(!failed);
}
