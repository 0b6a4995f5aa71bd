use clap::Subcommand;

use crate::cli::utils::{output_data, ApiClient};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Check server health status from API /health endpoint")]
    Health,

    #[command(about = "Show server information from API root endpoint")]
    Info,
}

pub async fn handle(cmd: ServerCommands, url: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let (client, _) = ApiClient::from_session(url)?;

    match cmd {
        ServerCommands::Health => {
            let health = client.get("/health").await?;
            output_data(output_format, &health, |data| {
                println!(
                    "{}: {} (store: {})",
                    client.base_url(),
                    data["status"].as_str().unwrap_or("unknown"),
                    data["store"].as_str().unwrap_or("unknown")
                );
            })
        }
        ServerCommands::Info => {
            let info = client.get("/").await?;
            output_data(output_format, &info, |data| {
                println!(
                    "{} {}",
                    data["name"].as_str().unwrap_or("unknown"),
                    data["version"].as_str().unwrap_or_default()
                );
                if let Some(endpoints) = data["endpoints"].as_object() {
                    for (name, path) in endpoints {
                        println!("  {:<8} {}", name, path.as_str().unwrap_or_default());
                    }
                }
            })
        }
    }
}
