//! Build state tracking for dev mode.
//!
//! Three orthogonal states:
//! - `HEALTHY`: Did the last build round succeed? (overlay vs clear)
//! - `LAUNCHED`: Has the shell runtime been spawned? (signal routing)
//! - `SHUTDOWN`: Has shutdown been requested? (Ctrl+C received)

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Last build round succeeded
/// - `false`: Error overlay is active on reload clients
/// - `true`: Next successful rebuild needs no ClearError
static HEALTHY: AtomicBool = AtomicBool::new(true);

/// Shell runtime has been spawned (its exit is mirrored as ours)
static LAUNCHED: AtomicBool = AtomicBool::new(false);

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Shutdown signal sender for the watch subsystem
static SHUTDOWN_TX: OnceLock<crossbeam::channel::Sender<()>> = OnceLock::new();

/// Exit code used when interrupted before the shell runtime exists.
const INTERRUPT_EXIT_CODE: i32 = 130;

// =============================================================================
// HEALTHY state
// =============================================================================

/// Check if the last build round succeeded
pub fn is_healthy() -> bool {
    HEALTHY.load(Ordering::SeqCst)
}

/// Set the health state
pub fn set_healthy(healthy: bool) {
    HEALTHY.store(healthy, Ordering::SeqCst);
}

// =============================================================================
// LAUNCHED state
// =============================================================================

/// Check if the shell runtime has been spawned
pub fn is_launched() -> bool {
    LAUNCHED.load(Ordering::SeqCst)
}

/// Mark the shell runtime as spawned
pub fn set_launched() {
    LAUNCHED.store(true, Ordering::SeqCst);
}

// =============================================================================
// SHUTDOWN state
// =============================================================================

/// Setup the global Ctrl+C handler. Call once at program start
///
/// The handler behavior depends on whether the shell runtime is live:
/// - Before launch: sets SHUTDOWN, notifies the watch subsystem, exits
/// - After launch: the signal reaches the whole process group; the child
///   terminates on its own and the sequencer mirrors its exit code
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        // Notify watch subsystem
        if let Some(tx) = SHUTDOWN_TX.get() {
            let _ = tx.send(());
        }

        if !is_launched() {
            std::process::exit(INTERRUPT_EXIT_CODE);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the shutdown signal sender for the watch subsystem
pub fn register_shutdown_tx(tx: crossbeam::channel::Sender<()>) {
    let _ = SHUTDOWN_TX.set(tx);
}

/// Check if shutdown has been requested
///
/// Uses Relaxed ordering for performance - worst case is processing
/// a few more events before stopping, which is acceptable
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy() {
        set_healthy(false);
        assert!(!is_healthy());

        set_healthy(true);
        assert!(is_healthy());
    }

    #[test]
    fn test_launched() {
        assert!(!is_launched() || LAUNCHED.load(Ordering::SeqCst));
        set_launched();
        assert!(is_launched());
    }
}
