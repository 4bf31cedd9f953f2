use anyhow::{Context, Result};
use clap::Parser;
use launchpad::cli::Cli;
use launchpad::pause::{acknowledge_setup_failure, is_interactive, select_hook};
use launchpad::pipeline::Pipeline;
use launchpad_core::config::{LaunchConfig, PauseMode};
use launchpad_core::observability;
use launchpad_env::runner::NativeProcessRunner;

fn main() {
    observability::init_tracing();
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            // Configuration is unusable here, so pause the way the default does.
            acknowledge_setup_failure(select_hook(PauseMode::default(), is_interactive()).as_ref())
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = LaunchConfig::from_env()
        .context("Invalid launcher configuration")?
        .with_cli_overrides(cli.env_dir, cli.manifest, cli.entry_point, cli.python, cli.pause);
    let work_dir = std::env::current_dir().context("Cannot determine working directory")?;

    // No prompt when piped or run by a service manager.
    let interactive = is_interactive();
    let hook = select_hook(config.pause, interactive);
    tracing::debug!(?config, interactive, "launch configuration");

    let report = Pipeline::new(&NativeProcessRunner, config, work_dir).execute(hook.as_ref());
    Ok(report.exit_code())
}
