//! Post-run acknowledgment: keep the terminal open until the operator presses Enter.
//!
//! Only meaningful for interactive runs (e.g. a double-clicked launcher whose
//! window would otherwise close and take the app's output with it).

use std::io::{self, BufRead, IsTerminal, Write};

use launchpad_core::config::PauseMode;
use launchpad_env::launch::FAILURE_EXIT_CODE;

use crate::pipeline::RunReport;

/// Runs once after the pipeline, on success and on failure.
pub trait PostRunHook {
    /// Inactive hooks are skipped and leave no `AwaitingAcknowledgment` state.
    fn is_active(&self) -> bool {
        true
    }

    fn after_run(&self, report: &RunReport) {
        self.acknowledge_exit(report.exit_code());
    }

    /// Called directly when the run failed before any stage started.
    fn acknowledge_exit(&self, exit_code: i32);
}

/// Stdin and stderr are both terminals.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stderr().is_terminal()
}

pub fn select_hook(mode: PauseMode, interactive: bool) -> Box<dyn PostRunHook> {
    if mode.should_pause(interactive) {
        Box::new(KeypressPrompt)
    } else {
        Box::new(NoPause)
    }
}

/// Failures before the pipeline starts, such as invalid configuration, get the
/// same acknowledgment as a failed run. Returns the exit code to use.
pub fn acknowledge_setup_failure(hook: &dyn PostRunHook) -> i32 {
    if hook.is_active() {
        hook.acknowledge_exit(FAILURE_EXIT_CODE);
    }
    FAILURE_EXIT_CODE
}

/// Headless runs: exit immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPause;

impl PostRunHook for NoPause {
    fn is_active(&self) -> bool {
        false
    }

    fn acknowledge_exit(&self, _exit_code: i32) {}
}

/// Prompt on stderr and block on one line of stdin.
///
/// Waits for Enter rather than any key: a line-buffered read works the same
/// on every console without switching the terminal to raw mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeypressPrompt;

impl PostRunHook for KeypressPrompt {
    fn acknowledge_exit(&self, exit_code: i32) {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stderr();
        if let Err(e) = wait_for_acknowledgment(&mut input, &mut output, &prompt_for(exit_code)) {
            tracing::debug!("acknowledgment prompt aborted: {}", e);
        }
    }
}

fn prompt_for(exit_code: i32) -> String {
    match exit_code {
        0 => "Press Enter to exit...".to_string(),
        code => format!("Exited with code {}. Press Enter to exit...", code),
    }
}

/// Write `message` and wait for a line (or EOF) on `input`.
pub fn wait_for_acknowledgment<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> io::Result<()> {
    write!(output, "\n{} ", message)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}
