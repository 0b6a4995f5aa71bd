use anyhow::Context;
use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{load_session, save_session, CliSession};
use crate::cli::utils::{output_data, output_success, ApiClient};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Create an account and log in")]
    Join {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (falls back to QUILL_PASSWORD)")]
        password: Option<String>,
    },

    #[command(about = "Login to server")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (falls back to QUILL_PASSWORD)")]
        password: Option<String>,
    },

    #[command(about = "Forget the saved session token")]
    Logout,

    #[command(about = "Show current user information")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, url: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Join { email, password } => {
            start_session("/auth/join", email, password, url, output_format).await
        }
        AuthCommands::Login { email, password } => {
            start_session("/auth/login", email, password, url, output_format).await
        }
        AuthCommands::Logout => {
            let session = load_session()?;
            save_session(&CliSession {
                url: session.url,
                ..Default::default()
            })?;
            output_success(output_format, "Logged out", None)
        }
        AuthCommands::Whoami => {
            let (client, _) = ApiClient::from_session(url)?;
            let whoami = client.get("/api/auth/whoami").await?;
            output_data(output_format, &whoami, |data| {
                let role = if data["is_admin"].as_bool().unwrap_or(false) { "admin" } else { "user" };
                println!("{} ({})", data["user"]["email"].as_str().unwrap_or("unknown"), role);
            })
        }
    }
}

async fn start_session(
    path: &str,
    email: String,
    password: Option<String>,
    url: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let password = password
        .or_else(|| std::env::var("QUILL_PASSWORD").ok())
        .context("a password is required (--password or QUILL_PASSWORD)")?;

    let session = load_session()?;
    let base_url = session.resolve_url(url);
    let client = ApiClient::new(base_url.clone(), None)?;
    let payload = client
        .post_json(path, &json!({ "email": email, "password": password }))
        .await?;

    let token = payload["token"]
        .as_str()
        .context("server response did not include a token")?
        .to_string();

    save_session(&CliSession {
        url: Some(base_url),
        token: Some(token),
        email: Some(email.clone()),
        logged_in_at: Some(Utc::now()),
    })?;

    output_success(
        output_format,
        &format!("Logged in as {}", email),
        Some(json!({ "email": email, "is_admin": payload["is_admin"] })),
    )
}
