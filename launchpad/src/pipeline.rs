//! The bootstrap run: provision → install → launch → acknowledge.
//!
//! Stages run strictly in order and each one blocks until done. The first
//! failing stage ends the run; later stages are never invoked and nothing is
//! retried.

use std::path::{Path, PathBuf};
use std::time::Instant;

use launchpad_core::config::LaunchConfig;
use launchpad_core::observability::{audit_stage_completed, audit_stage_started};
use launchpad_env::env::builder::ensure_environment;
use launchpad_env::env::install::{install_dependencies, InstallReport};
use launchpad_env::error::LaunchpadError;
use launchpad_env::launch::{launch, ExitSignal, FAILURE_EXIT_CODE};
use launchpad_env::runner::ProcessRunner;
use launchpad_env::runtime::EnvironmentHandle;
use serde_json::{json, Value};

use crate::pause::PostRunHook;

/// Where a run is (or stopped).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Provisioning,
    Installing,
    Launching,
    Running,
    Terminated,
    AwaitingAcknowledgment,
    Exited,
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunReport {
    /// States visited, in order.
    pub states: Vec<RunState>,
    pub env: Option<EnvironmentHandle>,
    pub install: Option<InstallReport>,
    /// The application's termination, or the stage error that ended the run.
    pub outcome: Result<ExitSignal, LaunchpadError>,
}

impl RunReport {
    /// Process exit code: the application's own code, or the failure
    /// sentinel when a stage failed or the application had none.
    pub fn exit_code(&self) -> i32 {
        match self.outcome {
            Ok(ref signal) => signal.exit_code(),
            Err(_) => FAILURE_EXIT_CODE,
        }
    }
}

pub struct Pipeline<'a, R: ProcessRunner + ?Sized> {
    runner: &'a R,
    config: LaunchConfig,
    work_dir: PathBuf,
}

impl<'a, R: ProcessRunner + ?Sized> Pipeline<'a, R> {
    /// Relative paths in `config` are resolved against `work_dir`, which is
    /// also the working directory of every spawned process.
    pub fn new(runner: &'a R, config: LaunchConfig, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            config,
            work_dir: work_dir.into(),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.work_dir.join(path)
    }

    /// Run every stage, then the post-run hook.
    pub fn execute(&self, hook: &dyn PostRunHook) -> RunReport {
        let mut report = self.run();
        if hook.is_active() {
            report.states.push(RunState::AwaitingAcknowledgment);
            hook.after_run(&report);
        }
        report.states.push(RunState::Exited);
        report
    }

    /// Run the stages without the post-run hook. The returned report stops
    /// at `Terminated` or at the stage that failed.
    pub fn run(&self) -> RunReport {
        let mut progress = Progress {
            states: vec![RunState::NotStarted],
            env: None,
            install: None,
        };
        let outcome = self.run_stages(&mut progress);

        match &outcome {
            Ok(signal) if signal.success() => {
                tracing::info!("Application exited cleanly");
            }
            Ok(signal) => {
                if let Err(e) = (*signal).into_result() {
                    tracing::warn!("{}", e);
                }
            }
            Err(e) => {
                tracing::error!(stage = e.stage(), "{}", e);
            }
        }

        RunReport {
            states: progress.states,
            env: progress.env,
            install: progress.install,
            outcome,
        }
    }

    fn run_stages(&self, progress: &mut Progress) -> Result<ExitSignal, LaunchpadError> {
        let root = self.resolve(&self.config.env_dir);
        let manifest = self.resolve(&self.config.manifest);
        let entry_point = self.resolve(&self.config.entry_point);

        progress.states.push(RunState::Provisioning);
        let started = stage_started("provision", json!({ "root": root.display().to_string() }));
        let env = ensure_environment(self.runner, &root, self.config.python.as_deref());
        stage_completed("provision", started, &env, |env| json!({ "created": env.created }));
        let env = env?;
        progress.env = Some(env.clone());

        progress.states.push(RunState::Installing);
        let started = stage_started(
            "install",
            json!({ "manifest": manifest.display().to_string() }),
        );
        let install = install_dependencies(self.runner, &env, &manifest, &self.work_dir);
        stage_completed("install", started, &install, |r| {
            json!({ "manifest_changed": r.manifest_changed, "sha256": r.manifest_sha256 })
        });
        progress.install = Some(install?);

        progress.states.push(RunState::Launching);
        let started = stage_started(
            "launch",
            json!({ "entry_point": entry_point.display().to_string() }),
        );
        let signal = launch(self.runner, &env, &entry_point, &self.work_dir);
        stage_completed("launch", started, &signal, |s| {
            json!({ "exit_code": s.outcome.code, "signal": s.outcome.signal })
        });
        let signal = signal?;
        progress.states.push(RunState::Running);
        progress.states.push(RunState::Terminated);
        Ok(signal)
    }
}

/// What the stages have produced so far.
struct Progress {
    states: Vec<RunState>,
    env: Option<EnvironmentHandle>,
    install: Option<InstallReport>,
}

fn stage_started(stage: &str, details: Value) -> Instant {
    tracing::debug!(stage, "stage started");
    audit_stage_started(stage, details);
    Instant::now()
}

fn stage_completed<T, E, F>(stage: &str, started: Instant, result: &Result<T, E>, details: F)
where
    E: std::fmt::Display,
    F: FnOnce(&T) -> Value,
{
    let duration_ms = started.elapsed().as_millis() as u64;
    let (success, details) = match result {
        Ok(value) => (true, details(value)),
        Err(e) => (false, json!({ "error": e.to_string() })),
    };
    tracing::debug!(stage, success, duration_ms, "stage completed");
    audit_stage_completed(stage, success, duration_ms, details);
}
