//! Config structs grouped by concern, loaded from environment variables.

use super::env_keys::{launch as launch_keys, observability as obv_keys};
use super::loader::{env_bool, env_optional, env_or};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Default isolated environment directory, relative to the invocation dir.
pub const DEFAULT_ENV_DIR: &str = "venv";
/// Default dependency manifest.
pub const DEFAULT_MANIFEST: &str = "requirements.txt";
/// Default application entry point.
pub const DEFAULT_ENTRY_POINT: &str = "app.py";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid pause mode '{0}' (expected auto, always or never)")]
    InvalidPauseMode(String),
}

/// When to hold the terminal open after the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PauseMode {
    /// Prompt only when attached to an interactive terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl PauseMode {
    /// Whether the acknowledgment prompt should run.
    pub fn should_pause(self, interactive: bool) -> bool {
        match self {
            Self::Auto => interactive,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

impl FromStr for PauseMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" | "1" | "true" | "yes" => Ok(Self::Always),
            "never" | "0" | "false" | "no" => Ok(Self::Never),
            other => Err(ConfigError::InvalidPauseMode(other.to_string())),
        }
    }
}

impl fmt::Display for PauseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Auto => "auto",
            Self::Always => "always",
            Self::Never => "never",
        };
        f.write_str(s)
    }
}

/// What to provision, install and launch.
///
/// Relative paths are resolved against the invocation directory by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub env_dir: PathBuf,
    pub manifest: PathBuf,
    pub entry_point: PathBuf,
    /// Base interpreter used to create the environment; discovered on PATH when `None`.
    pub python: Option<PathBuf>,
    pub pause: PauseMode,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            env_dir: PathBuf::from(DEFAULT_ENV_DIR),
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            entry_point: PathBuf::from(DEFAULT_ENTRY_POINT),
            python: None,
            pause: PauseMode::Auto,
        }
    }
}

impl LaunchConfig {
    /// Load from environment variables (and `.env`), falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        super::loader::load_dotenv();
        let pause = match env_optional(launch_keys::LAUNCHPAD_PAUSE, &[]) {
            Some(s) => s.parse()?,
            None => PauseMode::default(),
        };
        Ok(Self {
            env_dir: PathBuf::from(env_or(launch_keys::LAUNCHPAD_ENV_DIR, &[], || {
                DEFAULT_ENV_DIR.to_string()
            })),
            manifest: PathBuf::from(env_or(launch_keys::LAUNCHPAD_MANIFEST, &[], || {
                DEFAULT_MANIFEST.to_string()
            })),
            entry_point: PathBuf::from(env_or(launch_keys::LAUNCHPAD_ENTRY_POINT, &[], || {
                DEFAULT_ENTRY_POINT.to_string()
            })),
            python: env_optional(launch_keys::LAUNCHPAD_PYTHON, launch_keys::PYTHON_ALIASES)
                .map(PathBuf::from),
            pause,
        })
    }

    /// CLI values take priority over env / defaults.
    pub fn with_cli_overrides(
        mut self,
        env_dir: Option<PathBuf>,
        manifest: Option<PathBuf>,
        entry_point: Option<PathBuf>,
        python: Option<PathBuf>,
        pause: Option<PauseMode>,
    ) -> Self {
        if let Some(dir) = env_dir {
            self.env_dir = dir;
        }
        if let Some(m) = manifest {
            self.manifest = m;
        }
        if let Some(e) = entry_point {
            self.entry_point = e;
        }
        if python.is_some() {
            self.python = python;
        }
        if let Some(p) = pause {
            self.pause = p;
        }
        self
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self {
                quiet: env_bool(obv_keys::LAUNCHPAD_QUIET, &[], false),
                log_level: env_or(obv_keys::LAUNCHPAD_LOG_LEVEL, &[], || {
                    "launchpad=info".to_string()
                }),
                log_json: env_bool(obv_keys::LAUNCHPAD_LOG_JSON, &[], false),
                audit_log: env_optional(obv_keys::LAUNCHPAD_AUDIT_LOG, &[]),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_mode_parse() {
        assert_eq!("auto".parse::<PauseMode>(), Ok(PauseMode::Auto));
        assert_eq!(" Always ".parse::<PauseMode>(), Ok(PauseMode::Always));
        assert_eq!("0".parse::<PauseMode>(), Ok(PauseMode::Never));
        assert_eq!(
            "sometimes".parse::<PauseMode>(),
            Err(ConfigError::InvalidPauseMode("sometimes".to_string()))
        );
    }

    #[test]
    fn test_pause_mode_should_pause() {
        assert!(PauseMode::Auto.should_pause(true));
        assert!(!PauseMode::Auto.should_pause(false));
        assert!(PauseMode::Always.should_pause(false));
        assert!(!PauseMode::Never.should_pause(true));
    }

    #[test]
    fn test_cli_overrides_take_priority() {
        let cfg = LaunchConfig::default().with_cli_overrides(
            Some(PathBuf::from(".venv")),
            None,
            Some(PathBuf::from("server.py")),
            Some(PathBuf::from("/usr/bin/python3.12")),
            Some(PauseMode::Never),
        );
        assert_eq!(cfg.env_dir, PathBuf::from(".venv"));
        assert_eq!(cfg.manifest, PathBuf::from(DEFAULT_MANIFEST));
        assert_eq!(cfg.entry_point, PathBuf::from("server.py"));
        assert_eq!(cfg.python, Some(PathBuf::from("/usr/bin/python3.12")));
        assert_eq!(cfg.pause, PauseMode::Never);
    }
}
