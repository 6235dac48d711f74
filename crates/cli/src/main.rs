mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "edumate")]
#[command(about = "Teaching assistant backend: document chat, grading and curriculum planning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        #[arg(short, long, default_value = "8000")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// List chat sessions
    Sessions,
    /// List curricula with their state
    Curriculums,
    /// Print a curriculum's roadmap as a Mermaid flowchart
    Roadmap { id: String },
    /// Print a curriculum and its step details as Markdown
    Show { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();
    tracing::debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Serve { port, host } => commands::serve::run(config, host, port).await,
        Commands::Sessions => commands::inspect::sessions(&config).await,
        Commands::Curriculums => commands::inspect::curriculums(&config).await,
        Commands::Roadmap { id } => commands::inspect::roadmap(&config, &id).await,
        Commands::Show { id } => commands::inspect::show(&config, &id).await,
    }
}
