//! Provision the isolated Python environment (venv) and resolve its RuntimePaths.

use std::path::{Path, PathBuf};

use crate::error::ProvisioningError;
use crate::info_log;
use crate::runner::{CommandSpec, ProcessRunner};
use crate::runtime::{EnvironmentHandle, RuntimePaths};

/// Interpreter names tried on PATH, in order.
const PYTHON_CANDIDATES: &[&str] = &["python3", "python"];

/// Ensure an isolated environment exists at `root`.
///
/// An existing environment (one with an interpreter) is reused untouched. A
/// missing one, or a directory left without an interpreter by an interrupted
/// creation, is created with `<python> -m venv <root>`. `python` overrides
/// interpreter discovery.
pub fn ensure_environment<R: ProcessRunner + ?Sized>(
    runner: &R,
    root: &Path,
    python: Option<&Path>,
) -> Result<EnvironmentHandle, ProvisioningError> {
    if let Some(runtime) = RuntimePaths::locate(root) {
        info_log!("Using existing environment at {}", root.display());
        return Ok(EnvironmentHandle {
            root: root.to_path_buf(),
            created: false,
            runtime,
        });
    }

    let python = match python {
        Some(p) => p.to_path_buf(),
        None => which_python()?,
    };

    std::fs::create_dir_all(root).map_err(|source| ProvisioningError::CreateDir {
        path: root.to_path_buf(),
        source,
    })?;

    info_log!(
        "Creating environment at {} with {}",
        root.display(),
        python.display()
    );
    let spec = CommandSpec::new(&python).arg("-m").arg("venv").arg(root);
    let outcome = runner
        .run(&spec)
        .map_err(|source| ProvisioningError::Spawn {
            program: python.clone(),
            source,
        })?;
    if !outcome.success() {
        return Err(ProvisioningError::VenvFailed {
            root: root.to_path_buf(),
            outcome,
        });
    }

    let runtime = RuntimePaths::locate(root).ok_or_else(|| ProvisioningError::MissingInterpreter {
        root: root.to_path_buf(),
    })?;

    Ok(EnvironmentHandle {
        root: root.to_path_buf(),
        created: true,
        runtime,
    })
}

/// First of `python3` / `python` found on PATH.
pub fn which_python() -> Result<PathBuf, ProvisioningError> {
    PYTHON_CANDIDATES
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or_else(|| ProvisioningError::InterpreterNotFound {
            tried: PYTHON_CANDIDATES.join(", "),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Behavior, CallKind, RecordingRunner};

    #[test]
    fn test_creates_missing_environment() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("venv");
        let runner = RecordingRunner::default();

        let handle = ensure_environment(&runner, &root, Some(Path::new("python3"))).unwrap();

        assert!(handle.created);
        assert_eq!(handle.root, root);
        assert!(handle.runtime.python.is_file());
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, PathBuf::from("python3"));
        assert_eq!(calls[0].args, vec!["-m", "venv", root.to_str().unwrap()]);
    }

    #[test]
    fn test_second_call_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("venv");
        let runner = RecordingRunner::default();

        let first = ensure_environment(&runner, &root, Some(Path::new("python3"))).unwrap();
        let mtime_before = std::fs::metadata(&root).unwrap().modified().unwrap();
        let second = ensure_environment(&runner, &root, Some(Path::new("python3"))).unwrap();
        let mtime_after = std::fs::metadata(&root).unwrap().modified().unwrap();

        assert_eq!(runner.kinds(), vec![CallKind::CreateEnv]);
        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.runtime, second.runtime);
        assert_eq!(mtime_before, mtime_after);
    }

    #[test]
    fn test_existing_env_needs_no_interpreter() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("venv");
        ensure_environment(&RecordingRunner::default(), &root, Some(Path::new("python3")))
            .unwrap();

        // Reuse must not consult the base interpreter at all.
        let runner = RecordingRunner::default().with_venv(Behavior::SpawnError);
        let handle = ensure_environment(&runner, &root, None).unwrap();
        assert!(!handle.created);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_empty_directory_is_recreated() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("venv");
        std::fs::create_dir_all(&root).unwrap();
        let runner = RecordingRunner::default();

        let handle = ensure_environment(&runner, &root, Some(Path::new("python3"))).unwrap();

        assert!(handle.created);
        assert_eq!(runner.kinds(), vec![CallKind::CreateEnv]);
    }

    #[test]
    fn test_unavailable_interpreter_is_provisioning_error() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::default().with_venv(Behavior::SpawnError);
        let err = ensure_environment(&runner, &tmp.path().join("venv"), Some(Path::new("python3")))
            .unwrap_err();
        assert!(matches!(err, ProvisioningError::Spawn { .. }));
    }

    #[test]
    fn test_venv_failure_is_provisioning_error() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::default().with_venv(Behavior::Exit(1));
        let err = ensure_environment(&runner, &tmp.path().join("venv"), Some(Path::new("python3")))
            .unwrap_err();
        assert!(matches!(err, ProvisioningError::VenvFailed { .. }));
    }

    #[test]
    fn test_venv_without_interpreter_is_provisioning_error() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::default().with_venv(Behavior::NoEffect);
        let err = ensure_environment(&runner, &tmp.path().join("venv"), Some(Path::new("python3")))
            .unwrap_err();
        assert!(matches!(err, ProvisioningError::MissingInterpreter { .. }));
    }

    #[test]
    fn test_unwritable_location_is_provisioning_error() {
        let tmp = tempfile::tempdir().unwrap();
        // A regular file where a parent directory is needed.
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let runner = RecordingRunner::default();

        let err = ensure_environment(&runner, &blocker.join("venv"), Some(Path::new("python3")))
            .unwrap_err();

        assert!(matches!(err, ProvisioningError::CreateDir { .. }));
        assert!(runner.calls().is_empty());
    }
}
