use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

use carepulse::{ActionContext, ActionError, Config};
use commands::{ConfigCommand, PatientCommand, UserCommand};

#[derive(Parser)]
#[command(name = "carepulse")]
#[command(version)]
#[command(about = "Register and look up patients on an Appwrite backend", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and look up directory users
    User(UserCommand),

    /// Register and look up patients
    Patient(PatientCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carepulse=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        match e.downcast_ref::<ActionError>() {
            Some(action_error) => eprintln!("Error ({}): {}", action_error.kind(), e),
            None => eprintln!("Error: {}", e),
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::User(cmd)) => {
            let actions = ActionContext::from_settings(&config.backend_settings()?)?;
            cmd.run(&actions).await?;
        }
        Some(Commands::Patient(cmd)) => {
            let actions = ActionContext::from_settings(&config.backend_settings()?)?;
            cmd.run(&actions).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
