//! Environment handle and the interpreter paths resolved inside it.
//!
//! Activation is explicit: instead of mutating this process's environment the
//! handle produces the variables a child needs ([`EnvironmentHandle::activation_env`]),
//! and each stage passes them to the command it spawns.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use launchpad_core::config::env_keys::activation;

use crate::runner::CommandSpec;

#[cfg(windows)]
const BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
const BIN_DIR: &str = "bin";

/// Executables directory of a venv: `bin/` (Unix) or `Scripts/` (Windows).
pub fn venv_bin_dir(root: &Path) -> PathBuf {
    root.join(BIN_DIR)
}

/// Path of `name` inside the venv's executables directory (`.exe` on Windows).
pub fn venv_executable(root: &Path, name: &str) -> PathBuf {
    let bin = venv_bin_dir(root);
    if cfg!(windows) {
        bin.join(format!("{}.exe", name))
    } else {
        bin.join(name)
    }
}

/// Resolved interpreter and installer inside an environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    pub python: PathBuf,
    /// `None` when the venv has no pip script; install falls back to `python -m pip`.
    pub pip: Option<PathBuf>,
    pub bin_dir: PathBuf,
}

impl RuntimePaths {
    /// Locate the venv interpreter under `root`. `None` means there is no usable environment.
    pub fn locate(root: &Path) -> Option<Self> {
        let bin_dir = venv_bin_dir(root);
        let python = ["python", "python3"]
            .iter()
            .map(|name| venv_executable(root, name))
            .find(|p| p.is_file())?;
        let pip = ["pip", "pip3"]
            .iter()
            .map(|name| venv_executable(root, name))
            .find(|p| p.is_file());
        Some(Self {
            python,
            pip,
            bin_dir,
        })
    }
}

/// An isolated runtime environment that exists on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentHandle {
    pub root: PathBuf,
    /// True when this run created the environment.
    pub created: bool,
    pub runtime: RuntimePaths,
}

impl EnvironmentHandle {
    /// Variables that bind a child process to this environment:
    /// `VIRTUAL_ENV` and `PATH` with the env's bin dir first.
    pub fn activation_env(&self) -> Vec<(OsString, OsString)> {
        let mut vars = vec![(
            OsString::from(activation::VIRTUAL_ENV),
            self.root.clone().into_os_string(),
        )];
        let existing = std::env::var_os(activation::PATH).unwrap_or_default();
        let paths = std::iter::once(self.runtime.bin_dir.clone())
            .chain(std::env::split_paths(&existing));
        match std::env::join_paths(paths) {
            Ok(joined) => vars.push((OsString::from(activation::PATH), joined)),
            Err(e) => tracing::warn!("could not prepend {} to PATH: {}", self.runtime.bin_dir.display(), e),
        }
        vars
    }

    /// Bind `spec` to this environment. Like a sourced activate script,
    /// `PYTHONHOME` is unset.
    pub fn activate(&self, spec: CommandSpec) -> CommandSpec {
        spec.envs(self.activation_env()).env_remove("PYTHONHOME")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fake_venv(root: &Path, with_pip: bool) {
        fs::create_dir_all(venv_bin_dir(root)).unwrap();
        fs::write(venv_executable(root, "python"), "").unwrap();
        if with_pip {
            fs::write(venv_executable(root, "pip"), "").unwrap();
        }
    }

    #[test]
    fn test_locate_missing_env() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(RuntimePaths::locate(&tmp.path().join("venv")).is_none());
        // Directory without an interpreter is not an environment
        fs::create_dir_all(tmp.path().join("venv")).unwrap();
        assert!(RuntimePaths::locate(&tmp.path().join("venv")).is_none());
    }

    #[test]
    fn test_locate_with_and_without_pip() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("venv");
        fake_venv(&root, false);
        let paths = RuntimePaths::locate(&root).unwrap();
        assert_eq!(paths.python, venv_executable(&root, "python"));
        assert_eq!(paths.pip, None);

        fs::write(venv_executable(&root, "pip"), "").unwrap();
        let paths = RuntimePaths::locate(&root).unwrap();
        assert_eq!(paths.pip, Some(venv_executable(&root, "pip")));
    }

    #[test]
    fn test_activation_env_prepends_bin_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("venv");
        fake_venv(&root, true);
        let handle = EnvironmentHandle {
            root: root.clone(),
            created: false,
            runtime: RuntimePaths::locate(&root).unwrap(),
        };
        let vars = handle.activation_env();
        assert_eq!(vars[0], (OsString::from("VIRTUAL_ENV"), root.clone().into_os_string()));
        let (key, path) = &vars[1];
        assert_eq!(key, "PATH");
        let first = std::env::split_paths(path).next().unwrap();
        assert_eq!(first, venv_bin_dir(&root));
    }
}
