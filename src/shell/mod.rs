//! Desktop shell runtime launch and supervision.
//!
//! Spawns the shell runtime (interpreter + CLI launcher script + project
//! directory argument) with all three standard streams inherited, and
//! resolves its termination to a concrete exit code. A child killed by a
//! signal never yields an absent code: the fixed [`SIGNAL_EXIT_CODE`]
//! sentinel is used instead.

use std::process::Child;

use crate::config::AppConfig;
use crate::sequencer::SequencerError;
use crate::utils::exec::Cmd;

/// Fixed non-zero exit code used when the child was killed by a signal.
pub const SIGNAL_EXIT_CODE: i32 = 1;

/// Handle to the spawned shell runtime.
///
/// Exactly one of these is live at a time; it holds nothing beyond what
/// is needed to observe the exit code.
#[derive(Debug)]
pub struct ShellHandle {
    child: Child,
}

/// Spawn the shell runtime with inherited standard streams.
pub fn spawn(config: &AppConfig) -> Result<ShellHandle, SequencerError> {
    let interpreter = &config.shell.interpreter;
    which::which(interpreter).map_err(|_| {
        SequencerError::ChildProcess(format!("interpreter `{interpreter}` not found in PATH"))
    })?;

    let launcher = config.root_join(&config.shell.launcher);
    if !launcher.is_file() {
        return Err(SequencerError::ChildProcess(format!(
            "launcher script `{}` not found",
            launcher.display()
        )));
    }

    let child = Cmd::new(interpreter)
        .arg(&launcher)
        .arg(config.get_root())
        .cwd(config.get_root())
        .spawn_inherited()
        .map_err(|e| SequencerError::ChildProcess(e.to_string()))?;

    crate::core::set_launched();
    Ok(ShellHandle { child })
}

impl ShellHandle {
    /// Wrap an already-spawned child.
    pub(crate) fn from_child(child: Child) -> Self {
        Self { child }
    }

    /// Process id of the shell runtime.
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Block until the shell runtime terminates and resolve its exit code.
    ///
    /// Exit code `E` is returned as-is; signal death maps to the fixed
    /// sentinel, never to an absent value.
    pub fn wait(mut self) -> Result<i32, SequencerError> {
        let status = self
            .child
            .wait()
            .map_err(|e| SequencerError::ChildProcess(e.to_string()))?;

        match status.code() {
            Some(code) => Ok(code),
            None => {
                #[cfg(unix)]
                {
                    use std::os::unix::process::ExitStatusExt;
                    crate::debug!("shell"; "terminated by signal {:?}", status.signal());
                }
                Ok(SIGNAL_EXIT_CODE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> ShellHandle {
        let child = Cmd::new("sh")
            .args(["-c", script])
            .spawn_inherited()
            .unwrap();
        ShellHandle::from_child(child)
    }

    #[test]
    fn test_exit_code_zero() {
        assert_eq!(sh("exit 0").wait().unwrap(), 0);
    }

    #[test]
    fn test_exit_code_propagated() {
        assert_eq!(sh("exit 7").wait().unwrap(), 7);
        assert_eq!(sh("exit 255").wait().unwrap(), 255);
    }

    #[test]
    #[cfg(unix)]
    fn test_signal_death_maps_to_sentinel() {
        let code = sh("kill -9 $$").wait().unwrap();
        assert_eq!(code, SIGNAL_EXIT_CODE);
    }

    #[test]
    fn test_spawn_missing_interpreter() {
        use crate::config::test_parse_config;

        let mut config = test_parse_config("");
        config.shell.interpreter = "definitely-not-a-real-interpreter".to_string();

        let err = spawn(&config).unwrap_err();
        assert!(matches!(err, SequencerError::ChildProcess(_)));
    }

    #[test]
    fn test_spawn_missing_launcher() {
        use crate::config::test_parse_config;
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        let mut config = test_parse_config("");
        config.root = dir.path().to_path_buf();
        // `sh` resolves, but the launcher script does not exist
        config.shell.interpreter = "sh".to_string();

        let err = spawn(&config).unwrap_err();
        assert!(matches!(err, SequencerError::ChildProcess(_)));
    }
}
