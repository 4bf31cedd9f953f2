//! Start the application entry point inside the environment and wait for it.

use std::path::Path;

use crate::error::{LaunchError, LaunchpadError};
use crate::info_log;
use crate::runner::{CommandSpec, ProcessOutcome, ProcessRunner};
use crate::runtime::EnvironmentHandle;

/// Exit code reported when a stage fails or the application dies without one.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// How the launched application terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitSignal {
    pub outcome: ProcessOutcome,
}

impl ExitSignal {
    /// Exit code this run should terminate with.
    pub fn exit_code(&self) -> i32 {
        self.outcome.code.unwrap_or(FAILURE_EXIT_CODE)
    }

    pub fn success(&self) -> bool {
        self.outcome.success()
    }

    /// `ChildProcessFailure` for anything but a clean exit.
    pub fn into_result(self) -> Result<Self, LaunchpadError> {
        if self.success() {
            Ok(self)
        } else {
            Err(LaunchpadError::ChildProcessFailure {
                outcome: self.outcome,
            })
        }
    }
}

/// Run `entry_point` with the environment's interpreter in the foreground.
///
/// stdio is inherited so the application's console output reaches the
/// operator. Blocks until the application terminates; Ctrl-C reaches it
/// through the terminal's process group.
pub fn launch<R: ProcessRunner + ?Sized>(
    runner: &R,
    env: &EnvironmentHandle,
    entry_point: &Path,
    work_dir: &Path,
) -> Result<ExitSignal, LaunchError> {
    if !entry_point.is_file() {
        return Err(LaunchError::EntryPointMissing {
            path: entry_point.to_path_buf(),
        });
    }
    if !env.runtime.python.is_file() {
        return Err(LaunchError::BrokenEnvironment {
            root: env.root.clone(),
            python: env.runtime.python.clone(),
        });
    }

    info_log!("Starting {}", entry_point.display());
    let spec = env.activate(
        CommandSpec::new(&env.runtime.python)
            .arg(entry_point)
            .current_dir(work_dir),
    );
    let outcome = runner.run(&spec).map_err(|source| LaunchError::Spawn {
        program: spec.program.clone(),
        source,
    })?;
    Ok(ExitSignal { outcome })
}
