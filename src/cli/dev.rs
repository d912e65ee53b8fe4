//! Dev command: the full build-and-launch sequence.
//!
//! Constructs the sequencer and terminates this process with the exit
//! code it resolves - the shell runtime's own code, or the signal
//! sentinel. A fatal pre-launch failure propagates as an error and the
//! process exits non-zero without a child ever having been spawned.

use std::sync::Arc;

use anyhow::Result;

use crate::config::AppConfig;
use crate::sequencer::Sequencer;

/// Run the sequencer; on success this never returns.
pub fn run_dev(config: &Arc<AppConfig>) -> Result<()> {
    let sequencer = Sequencer::new(Arc::clone(config));
    let code = sequencer.run()?;
    std::process::exit(code);
}
