pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use vitrine_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};
use vitrine_core::ImportPolicy;

#[derive(Debug, Parser)]
#[command(
    name = "vitrine",
    about = "Vitrine catalog console",
    long_about = "Browse an in-memory product catalog, adjust prices, and place orders.",
    after_help = "Examples:\n  vitrine shop\n  vitrine stats --json\n  vitrine check --data data/products.json --strict"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a vitrine.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Catalog JSON file to import")]
    data: Option<PathBuf>,
    #[arg(long, global = true, help = "Abort the import on the first invalid product")]
    strict: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start the interactive console (default)")]
    Shop,
    #[command(about = "Print catalog statistics")]
    Stats {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Validate the catalog file and report products that would be skipped")]
    Check {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                data_path: self.data.clone(),
                import_policy: self.strict.then_some(ImportPolicy::Strict),
                log_level: None,
            },
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.load_options();
    init_logging(AppConfig::load(options.clone()).ok().as_ref());

    let result = match cli.command.unwrap_or(Command::Shop) {
        Command::Shop => commands::shop::run(options),
        Command::Stats { json } => commands::stats::run(options, json),
        Command::Check { json } => commands::check::run(options, json),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(&options) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so the console keeps stdout to itself.
fn init_logging(config: Option<&AppConfig>) {
    use tracing::Level;

    let defaults = AppConfig::default();
    let config = config.unwrap_or(&defaults);
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
