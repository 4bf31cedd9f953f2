//! ProcessRunner trait: the seam through which every subprocess is spawned.
//!
//! Stages describe what to run with a [`CommandSpec`]; the runner spawns it in
//! the foreground with inherited stdio and blocks until it terminates. Tests
//! swap in a recording runner instead of touching a real toolchain.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::sync::Once;

/// A subprocess invocation: program, arguments, working dir and env changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    pub envs: Vec<(OsString, OsString)>,
    pub env_remove: Vec<OsString>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
            env_remove: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn envs<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        self.envs.extend(vars);
        self
    }

    pub fn env_remove(mut self, key: impl AsRef<OsStr>) -> Self {
        self.env_remove.push(key.as_ref().to_os_string());
        self
    }

    /// Value this spec sets for `key`, if any.
    pub fn env_value(&self, key: &str) -> Option<&OsStr> {
        self.envs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }
        for key in &self.env_remove {
            cmd.env_remove(key);
        }
        cmd.envs(self.envs.iter().map(|(k, v)| (k, v)));
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// How a subprocess terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Terminating signal (Unix only).
    pub signal: Option<i32>,
}

impl ProcessOutcome {
    pub fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn signaled(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ProcessOutcome {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;
        Self {
            code: status.code(),
            signal,
        }
    }
}

impl fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {}", code),
            (None, Some(sig)) => write!(f, "signal {}", sig),
            (None, None) => f.write_str("unknown termination"),
        }
    }
}

/// Extension point for spawning subprocesses.
///
/// `run` is synchronous: it returns once the child has terminated. An `Err`
/// means the child could not be started at all (e.g. program not found).
pub trait ProcessRunner: Send + Sync {
    fn run(&self, spec: &CommandSpec) -> io::Result<ProcessOutcome>;
}

/// Spawns real processes with `std::process::Command`, inheriting stdio.
///
/// Like `system()`, the waiting parent does not die on Ctrl+C: the child gets
/// the interrupt through the terminal's process group and decides how to end,
/// and the run carries on with its exit status.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeProcessRunner;

/// Installs the process-wide Ctrl+C handler once. Later calls are no-ops.
fn ignore_interrupts() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        if let Err(e) = ctrlc::set_handler(|| {
            tracing::debug!("Received Ctrl+C, waiting for child to exit");
        }) {
            tracing::warn!("Failed to set Ctrl+C handler: {}", e);
        }
    });
}

impl ProcessRunner for NativeProcessRunner {
    fn run(&self, spec: &CommandSpec) -> io::Result<ProcessOutcome> {
        ignore_interrupts();
        tracing::debug!(command = %spec, "spawning");
        let status = spec.to_command().status()?;
        Ok(ProcessOutcome::from(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_display_and_env_lookup() {
        let spec = CommandSpec::new("venv/bin/pip")
            .arg("install")
            .args(["-r", "requirements.txt"])
            .envs([
                (OsString::from("VIRTUAL_ENV"), OsString::from("/old")),
                (OsString::from("VIRTUAL_ENV"), OsString::from("/srv/app/venv")),
            ]);
        assert_eq!(spec.to_string(), "venv/bin/pip install -r requirements.txt");
        assert_eq!(spec.env_value("VIRTUAL_ENV"), Some(OsStr::new("/srv/app/venv")));
        assert_eq!(spec.env_value("PATH"), None);
    }

    #[test]
    fn test_process_outcome_success() {
        assert!(ProcessOutcome::exited(0).success());
        assert!(!ProcessOutcome::exited(3).success());
        assert!(!ProcessOutcome::signaled(2).success());
        assert_eq!(ProcessOutcome::signaled(9).to_string(), "signal 9");
    }

    #[cfg(unix)]
    #[test]
    fn test_native_runner_reports_exit_code() {
        let outcome = NativeProcessRunner
            .run(&CommandSpec::new("sh").args(["-c", "exit 3"]))
            .unwrap();
        assert_eq!(outcome, ProcessOutcome::exited(3));
    }

    // Signals only the parent: `kill -INT 0` would also reach the test harness.
    #[cfg(unix)]
    #[test]
    fn test_native_runner_survives_interrupt_while_waiting() {
        let outcome = NativeProcessRunner
            .run(&CommandSpec::new("sh").args(["-c", "kill -INT $PPID; sleep 0.2; exit 0"]))
            .unwrap();
        assert_eq!(outcome, ProcessOutcome::exited(0));
    }

    #[test]
    fn test_native_runner_spawn_failure_is_err() {
        let result = NativeProcessRunner.run(&CommandSpec::new("launchpad-no-such-program-xyz"));
        assert!(result.is_err());
    }
}
