#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod command;

use command::{
    ChatInput, ChatStrategy, CommandStrategy, InfoStrategy, InitStrategy, ServeInput,
    ServeStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "francie")]
#[command(about = "Francie French conversation tutor", long_about = None)]
struct Cli {
    /// Config file (default: ~/francie/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Address to bind, overrides server.bind
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Talk to the tutor in the terminal
    Chat {
        /// Session to resume (a new one is created if omitted)
        #[arg(short, long)]
        session: Option<String>,

        /// Single message to send
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Initialize configuration
    Init,
    /// Show effective configuration
    Info,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config_path = cli.config;

    match cli.command {
        Commands::Serve { bind } => {
            ServeStrategy
                .execute(ServeInput { config_path, bind })
                .await
        }
        Commands::Chat { session, message } => {
            ChatStrategy
                .execute(ChatInput {
                    config_path,
                    session_id: session,
                    message,
                })
                .await
        }
        Commands::Init => InitStrategy.execute(config_path).await,
        Commands::Info => InfoStrategy.execute(config_path).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
