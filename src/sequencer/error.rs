//! Sequencer error taxonomy.
//!
//! Every variant is fatal at process level: nothing is retried, nothing is
//! recovered locally. A failure before the launch phase means the shell
//! runtime is never spawned and the process exits non-zero.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Fatal sequencer failures.
#[derive(Debug, Error)]
pub enum SequencerError {
    /// Asset staging failed (missing shell source, unwritable output).
    #[error("asset staging failed for `{0}`")]
    Staging(PathBuf, #[source] std::io::Error),

    /// Build configuration is malformed.
    #[error("build configuration error")]
    Config(#[from] ConfigError),

    /// The dev port is already bound by another process.
    #[error("dev port {0} is already in use")]
    PortInUse(u16, #[source] std::io::Error),

    /// Shell runtime could not be spawned or supervised.
    #[error("shell process error: {0}")]
    ChildProcess(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_error_display() {
        let err = SequencerError::Staging(
            PathBuf::from("src/app/index.html"),
            Error::new(ErrorKind::NotFound, "missing"),
        );
        assert!(format!("{err}").contains("index.html"));

        let err = SequencerError::PortInUse(
            4445,
            Error::new(ErrorKind::AddrInUse, "in use"),
        );
        assert!(format!("{err}").contains("4445"));
    }
}
