//! Environment variable keys.
//!
//! Primary keys use the `LAUNCHPAD_*` prefix. `VIRTUAL_ENV` / `PATH` are the
//! keys written into child processes on activation.

/// Layout of the bootstrap: env dir, manifest, entry point, base interpreter.
pub mod launch {
    pub const LAUNCHPAD_ENV_DIR: &str = "LAUNCHPAD_ENV_DIR";
    pub const LAUNCHPAD_MANIFEST: &str = "LAUNCHPAD_MANIFEST";
    pub const LAUNCHPAD_ENTRY_POINT: &str = "LAUNCHPAD_ENTRY_POINT";

    /// Base interpreter used to create the venv. Falls back to `PYTHON`.
    pub const LAUNCHPAD_PYTHON: &str = "LAUNCHPAD_PYTHON";
    pub const PYTHON_ALIASES: &[&str] = &["PYTHON"];

    /// Acknowledgment prompt: "auto" (default), "always", "never".
    pub const LAUNCHPAD_PAUSE: &str = "LAUNCHPAD_PAUSE";
}

/// Logging and audit.
pub mod observability {
    pub const LAUNCHPAD_QUIET: &str = "LAUNCHPAD_QUIET";
    pub const LAUNCHPAD_LOG_LEVEL: &str = "LAUNCHPAD_LOG_LEVEL";
    pub const LAUNCHPAD_LOG_JSON: &str = "LAUNCHPAD_LOG_JSON";
    pub const LAUNCHPAD_AUDIT_LOG: &str = "LAUNCHPAD_AUDIT_LOG";
}

/// Keys set on child processes when an environment is activated.
pub mod activation {
    pub const VIRTUAL_ENV: &str = "VIRTUAL_ENV";
    pub const PATH: &str = "PATH";
}
