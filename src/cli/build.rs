//! One-shot build command.
//!
//! Runs staging and both bundle builds once: no reload channel, no file
//! watching, no shell launch. Exit is non-zero when either bundle fails.

use anyhow::{Result, bail};

use crate::bundle::{BuildConfig, BundleDriver, standard_pair};
use crate::config::AppConfig;
use crate::{log, stage};

/// Build both bundles once.
pub fn build_all(config: &AppConfig) -> Result<()> {
    if config.build.clean && config.build.output.exists() {
        std::fs::remove_dir_all(&config.build.output)?;
    }

    stage::stage_shell(config, false)?;

    let build = BuildConfig::from_app(config)?;
    let (main, renderer) = standard_pair(config);
    let driver = BundleDriver::new(config, &build);

    let (main_result, renderer_result) =
        rayon::join(|| driver.build(&main), || driver.build(&renderer));

    let mut failed = 0usize;
    for result in [main_result, renderer_result] {
        match result {
            Ok(outcome) if outcome.skipped => {
                log!("bundle"; "{} unchanged", outcome.bundle);
            }
            Ok(outcome) => {
                log!("bundle"; "{} -> {}", outcome.bundle, config.root_relative(&outcome.output).display());
            }
            Err(e) => {
                failed += 1;
                log!("error"; "{:#}", e);
            }
        }
    }

    if failed > 0 {
        bail!("{failed} bundle(s) failed");
    }

    log!("build"; "done");
    Ok(())
}
