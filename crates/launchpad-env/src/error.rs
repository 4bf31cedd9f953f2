//! Error taxonomy for the bootstrap stages.
//!
//! Every variant is fatal for the run: stages never retry or fall back.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::runner::ProcessOutcome;

/// The isolated environment could not be created.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("no Python interpreter found on PATH (tried {tried})")]
    InterpreterNotFound { tried: String },

    #[error("cannot create environment directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("creating environment at {root} failed ({outcome})")]
    VenvFailed { root: PathBuf, outcome: ProcessOutcome },

    #[error("environment at {root} has no Python interpreter after creation")]
    MissingInterpreter { root: PathBuf },
}

/// The dependency manifest could not be installed into the environment.
#[derive(Debug, Error)]
pub enum InstallationError {
    #[error("dependency manifest not found: {path}")]
    ManifestMissing { path: PathBuf },

    #[error("cannot read dependency manifest {path}: {source}")]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("installing {manifest} failed ({outcome})")]
    Failed { manifest: PathBuf, outcome: ProcessOutcome },
}

/// The application could not be started.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("entry point not found: {path}")]
    EntryPointMissing { path: PathBuf },

    #[error("environment at {root} is broken: interpreter {python} is missing")]
    BrokenEnvironment { root: PathBuf, python: PathBuf },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Any failure that ends a run.
#[derive(Debug, Error)]
pub enum LaunchpadError {
    #[error("provisioning failed: {0}")]
    Provisioning(#[from] ProvisioningError),

    #[error("installation failed: {0}")]
    Installation(#[from] InstallationError),

    #[error("launch failed: {0}")]
    Launch(#[from] LaunchError),

    /// The application ran but did not exit cleanly.
    #[error("application exited with {outcome}")]
    ChildProcessFailure { outcome: ProcessOutcome },
}

impl LaunchpadError {
    /// Stage name used in logs and the audit record.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Provisioning(_) => "provision",
            Self::Installation(_) => "install",
            Self::Launch(_) => "launch",
            Self::ChildProcessFailure { .. } => "run",
        }
    }
}
