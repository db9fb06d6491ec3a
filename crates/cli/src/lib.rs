pub mod commands;

use clap::{Parser, Subcommand};
use pressquote_core::config::{AppConfig, LoadOptions, LogFormat};
use pressquote_core::PricingPipeline;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "pressquote",
    about = "Printing-press quotation calculator",
    long_about = "Price board, process and tax lines of a carton quotation from a snapshot file.",
    after_help = "Examples:\n  pressquote price --input quote.toml\n  pressquote price --input quote.json --pipeline simple --json\n  pressquote check --input quote.toml\n  pressquote config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Compute board cost, process costs and grand total for a snapshot")]
    Price {
        #[arg(long, help = "Quotation snapshot file (.toml or .json)")]
        input: PathBuf,
        #[arg(long, help = "Grand-total pipeline: simple or builder (defaults to config)")]
        pipeline: Option<PricingPipeline>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Validate a snapshot strictly and list every input violation")]
    Check {
        #[arg(long, help = "Quotation snapshot file (.toml or .json)")]
        input: PathBuf,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Price { input, pipeline, json } => commands::price::run(&input, pipeline, json),
        Command::Check { input } => commands::check::run(&input),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so stdout stays parseable. A config that fails to load
/// still gets default logging; the command itself reports the failure.
fn init_logging() {
    use tracing::Level;

    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(log_level);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}
