use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod completion;
mod dispatch;
mod flows;
mod notify;
mod render;
mod settings;

use completion::CliCompletionShell;
use dispatch::run_cli;
use render::{current_output_style, TerminalRenderer};

#[derive(Parser, Debug)]
#[command(name = "jarlift")]
#[command(
    about = "Update a remote Java application over SSH and print its report card",
    long_about = None
)]
struct Cli {
    /// Config file; defaults to ./jarlift.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    host: Option<String>,
    #[arg(long, global = true)]
    port: Option<u16>,
    #[arg(long, global = true)]
    user: Option<String>,
    /// Disable badges, sections and spinners.
    #[arg(long, global = true)]
    plain: bool,
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Update the application if needed, then print the report (default).
    Run,
    Update,
    Report,
    /// Compare the installed version with the expected one without changing anything.
    Check,
    /// Print the effective configuration with the password masked.
    Config,
    Completions {
        #[arg(value_enum)]
        shell: CliCompletionShell,
    },
}

impl Commands {
    fn operation_name(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Update => "update",
            Self::Report => "report",
            Self::Check => "check",
            Self::Config => "config",
            Self::Completions { .. } => "completions",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let renderer = TerminalRenderer::from_style(current_output_style(cli.plain));

    match run_cli(cli, renderer) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            renderer.print_error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
