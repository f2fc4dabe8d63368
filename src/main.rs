use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use autolab_portal::config::{config_schema, load_config};
use autolab_portal::startup::{run, Command};
use autolab_portal::utils::logger::init_logging;

#[derive(Parser, Debug)]
#[command(name = "autolab-portal", version, about = "Autolab self-service portal client")]
struct Cli {
    /// Configuration file; `AUTOLAB_PORTAL_*` variables override it.
    #[arg(long, default_value = "./config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // The schema does not need a config file.
    if cli.command == Command::Schema {
        return match config_schema() {
            Ok(schema) => {
                println!("{}", schema);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to generate config schema: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config = match load_config(&cli.config) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialise logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(config, cli.command).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
