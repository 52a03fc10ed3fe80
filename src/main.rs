use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

mod app;
mod error;
mod model;
mod picker;
mod ssm;
mod storage;
mod ui;

use app::App;
use app::constants::{HISTORY_DISABLED_ENV, NO_INSTANCES_MESSAGE, SELECTION_CANCELLED_MESSAGE};
use app::helpers::normalize_args;
use app::logging::Output;
use error::PickError;
use storage::{config_path, load_settings_file, log_path, resolve_settings};

/// Connect to EC2 instances through AWS Systems Manager.
#[derive(Debug, Parser)]
#[command(name = "aws-ssm-connect", disable_version_flag = true)]
struct Cli {
    /// List running instances matching all given words and exit
    #[arg(short = 'l', long, conflicts_with_all = ["copy", "run"])]
    list: bool,

    /// Copy a file: <src> <dst>, one side as instance:/path (max 100KB upload)
    #[arg(long, conflicts_with = "run")]
    copy: bool,

    /// Run a command: <instance> <command...>; put hyphenated words after `--`
    #[arg(long)]
    run: bool,

    /// AWS profile to use
    #[arg(long)]
    profile: Option<String>,

    /// AWS region to use
    #[arg(long)]
    region: Option<String>,

    /// Enable debug output
    #[arg(short = 'd', long)]
    debug: bool,

    /// Show version information
    #[arg(short = 'v', long)]
    version: bool,

    /// Instance name filter, or the arguments of --list/--copy/--run
    args: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_args(std::env::args()));
    if cli.version {
        println!("aws-ssm-connect {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }
    let out = Output::new(cli.debug, log_path().ok());
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<PickError>() {
                Some(PickError::Cancelled) => out.warning(SELECTION_CANCELLED_MESSAGE),
                Some(PickError::EmptyInput) => out.warning(NO_INSTANCES_MESSAGE),
                _ => out.error(&format!("{err:#}")),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let file = load_settings_file(&config_path()?)?;
    let settings = resolve_settings(
        file,
        cli.profile,
        cli.region,
        cli.debug,
        std::env::var(HISTORY_DISABLED_ENV).ok(),
    );
    let app = App::load(settings)?;

    if cli.copy {
        return app.copy(&cli.args);
    }
    if cli.list {
        for line in app.listing(&cli.args)? {
            println!("{line}");
        }
        return Ok(());
    }
    if cli.run {
        return app.run_command(&cli.args);
    }

    let candidate = match cli.args.as_slice() {
        [] => app.select_instance()?,
        [name] => app.select_by_name(name)?,
        _ => anyhow::bail!("too many arguments; use -l for listing with filters"),
    };
    app.connect(&candidate)
}
