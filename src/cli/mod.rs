pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Quill CLI - Command-line interface for the Quill blog and notes API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "API base URL (defaults to QUILL_API_URL, then the saved session)")]
    pub url: Option<String>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Remote server checks")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Accounts and session token")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Blog posts (create, update and delete require the admin account)")]
    Post {
        #[command(subcommand)]
        cmd: commands::post::PostCommands,
    },

    #[command(about = "Your notes")]
    Note {
        #[command(subcommand)]
        cmd: commands::note::NoteCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let url = cli.url;

    match cli.command {
        Commands::Server { cmd } => commands::server::handle(cmd, url, output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, url, output_format).await,
        Commands::Post { cmd } => commands::post::handle(cmd, url, output_format).await,
        Commands::Note { cmd } => commands::note::handle(cmd, url, output_format).await,
    }
}
