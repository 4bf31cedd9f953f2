//! Install the dependency manifest into a provisioned environment.
//!
//! `pip install -r <manifest>` always runs; pip itself decides what is already
//! satisfied. After a successful install a stamp with the manifest's SHA-256
//! is written into the environment so the next run can report whether the
//! manifest changed.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::InstallationError;
use crate::info_log;
use crate::runner::{CommandSpec, ProcessRunner};
use crate::runtime::EnvironmentHandle;

/// Stamp file written inside the environment root.
pub const INSTALL_STAMP_FILE: &str = ".launchpad-install.json";

/// Record of the last successful install.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallStamp {
    pub manifest: String,
    pub sha256: String,
    pub installed_at: String,
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub manifest_sha256: String,
    /// False when the previous install used a byte-identical manifest.
    pub manifest_changed: bool,
}

/// Install every package declared in `manifest` into `env`.
///
/// The command runs with `work_dir` as its working directory and the
/// environment's activation variables. A missing manifest fails fast; pip's
/// own output is the diagnostic for everything else.
pub fn install_dependencies<R: ProcessRunner + ?Sized>(
    runner: &R,
    env: &EnvironmentHandle,
    manifest: &Path,
    work_dir: &Path,
) -> Result<InstallReport, InstallationError> {
    if !manifest.is_file() {
        return Err(InstallationError::ManifestMissing {
            path: manifest.to_path_buf(),
        });
    }
    let content = std::fs::read(manifest).map_err(|source| InstallationError::ManifestUnreadable {
        path: manifest.to_path_buf(),
        source,
    })?;
    let manifest_sha256 = hex::encode(Sha256::digest(&content));

    let manifest_changed = read_stamp(&env.root)
        .map_or(true, |stamp| stamp.sha256 != manifest_sha256);
    if manifest_changed {
        info_log!("Installing dependencies from {}", manifest.display());
    } else {
        info_log!(
            "Dependencies from {} unchanged since last install, verifying",
            manifest.display()
        );
    }

    let spec = pip_install_command(env).arg("-r").arg(manifest).current_dir(work_dir);
    let spec = env.activate(spec);
    let outcome = runner
        .run(&spec)
        .map_err(|source| InstallationError::Spawn {
            program: spec.program.clone(),
            source,
        })?;
    if !outcome.success() {
        return Err(InstallationError::Failed {
            manifest: manifest.to_path_buf(),
            outcome,
        });
    }

    let stamp = InstallStamp {
        manifest: manifest.to_string_lossy().to_string(),
        sha256: manifest_sha256.clone(),
        installed_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    };
    if let Err(e) = write_stamp(&env.root, &stamp) {
        tracing::warn!("could not write install stamp in {}: {}", env.root.display(), e);
    }

    Ok(InstallReport {
        manifest_sha256,
        manifest_changed,
    })
}

/// `pip install`, or `python -m pip install` when the venv has no pip script.
fn pip_install_command(env: &EnvironmentHandle) -> CommandSpec {
    match env.runtime.pip {
        Some(ref pip) => CommandSpec::new(pip).arg("install"),
        None => CommandSpec::new(&env.runtime.python).args(["-m", "pip", "install"]),
    }
}

fn stamp_path(root: &Path) -> PathBuf {
    root.join(INSTALL_STAMP_FILE)
}

/// Last install stamp, if present and readable.
pub fn read_stamp(root: &Path) -> Option<InstallStamp> {
    let content = std::fs::read_to_string(stamp_path(root)).ok()?;
    serde_json::from_str(&content).ok()
}

fn write_stamp(root: &Path, stamp: &InstallStamp) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(stamp)?;
    std::fs::write(stamp_path(root), json)
}
