use std::path::PathBuf;

use clap::Parser;
use launchpad_core::config::PauseMode;

/// Launchpad - provision a Python venv, install requirements, start the app
///
/// With no arguments: ensure ./venv exists, install ./requirements.txt into
/// it, run ./app.py, then wait for Enter when attached to a terminal.
#[derive(Parser, Debug)]
#[command(name = "launchpad")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Isolated environment directory (default: from env or "venv")
    #[arg(long, value_name = "DIR")]
    pub env_dir: Option<PathBuf>,

    /// Dependency manifest (default: from env or "requirements.txt")
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Application entry point (default: from env or "app.py")
    #[arg(long, value_name = "FILE")]
    pub entry_point: Option<PathBuf>,

    /// Base interpreter used to create the environment (default: python3, then python)
    #[arg(long, value_name = "PYTHON")]
    pub python: Option<PathBuf>,

    /// Wait for Enter before exiting: auto, always, never (default: from env or auto)
    #[arg(long, value_name = "MODE")]
    pub pause: Option<PauseMode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let cli = Cli::try_parse_from(["launchpad"]).unwrap();
        assert!(cli.env_dir.is_none());
        assert!(cli.manifest.is_none());
        assert!(cli.entry_point.is_none());
        assert!(cli.python.is_none());
        assert!(cli.pause.is_none());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "launchpad",
            "--env-dir",
            ".venv",
            "--entry-point",
            "server.py",
            "--pause",
            "never",
        ])
        .unwrap();
        assert_eq!(cli.env_dir, Some(PathBuf::from(".venv")));
        assert_eq!(cli.entry_point, Some(PathBuf::from("server.py")));
        assert_eq!(cli.pause, Some(PauseMode::Never));
    }

    #[test]
    fn test_invalid_pause_mode_rejected() {
        assert!(Cli::try_parse_from(["launchpad", "--pause", "sometimes"]).is_err());
    }
}
