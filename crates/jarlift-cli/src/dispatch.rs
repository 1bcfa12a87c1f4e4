use std::io;
use std::time::Instant;

use anyhow::{Context, Result};
use jarlift_core::DeployConfig;
use tracing::info;

use crate::completion::write_completions_script;
use crate::flows::{check_phase, report_phase, timed, update_phase, with_session};
use crate::notify::notify_failure_best_effort;
use crate::render::{format_elapsed, TerminalRenderer};
use crate::settings::{load_config, require_password, ConfigOverrides, PASSWORD_ENV};
use crate::{Cli, Commands};

pub(crate) fn run_cli(cli: Cli, renderer: TerminalRenderer) -> Result<()> {
    let command = cli.command.unwrap_or(Commands::Run);
    if let Commands::Completions { shell } = command {
        return write_completions_script(shell, &mut io::stdout());
    }

    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let overrides = ConfigOverrides {
        host: cli.host,
        port: cli.port,
        user: cli.user,
    };
    let config = load_config(
        cli.config.as_deref(),
        &cwd,
        &overrides,
        std::env::var(PASSWORD_ENV).ok(),
    )?;

    match command {
        Commands::Config => {
            print!("{}", config.redacted().to_toml_string()?);
            Ok(())
        }
        Commands::Check => {
            require_password(&config)?;
            with_session(&config, renderer, |executor| {
                check_phase(&config, executor, renderer)
            })
        }
        Commands::Update | Commands::Report | Commands::Run => {
            let operation = command.operation_name();
            let result = run_remote_operation(&config, command, renderer);
            if let Err(err) = &result {
                notify_failure_best_effort(&config.notify, operation, err, renderer);
            }
            result
        }
        Commands::Completions { .. } => Ok(()),
    }
}

fn run_remote_operation(
    config: &DeployConfig,
    command: Commands,
    renderer: TerminalRenderer,
) -> Result<()> {
    require_password(config)?;
    let started_at = Instant::now();
    info!(operation = command.operation_name(), host = %config.remote.host, "starting");

    with_session(config, renderer, |executor| {
        if matches!(command, Commands::Update | Commands::Run) {
            timed(renderer, "update", || update_phase(config, executor, renderer))?;
        }
        if matches!(command, Commands::Report | Commands::Run) {
            timed(renderer, "report", || report_phase(config, executor, renderer))?;
        }
        Ok(())
    })?;

    renderer.print_status(
        "ok",
        &format!("finished in {}", format_elapsed(started_at.elapsed())),
    );
    Ok(())
}
