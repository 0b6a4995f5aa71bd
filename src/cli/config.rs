use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Saved between CLI invocations in `session.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliSession {
    pub url: Option<String>,
    pub token: Option<String>,
    pub email: Option<String>,
    pub logged_in_at: Option<DateTime<Utc>>,
}

impl CliSession {
    /// `--url`, then `QUILL_API_URL`, then the saved URL, then localhost
    pub fn resolve_url(&self, url_override: Option<String>) -> String {
        url_override
            .or_else(|| std::env::var("QUILL_API_URL").ok())
            .or_else(|| self.url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string()
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("QUILL_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("quill").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_session() -> anyhow::Result<CliSession> {
    let session_file = get_config_dir()?.join("session.json");

    if !session_file.exists() {
        return Ok(CliSession::default());
    }

    let content = fs::read_to_string(session_file)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_session(session: &CliSession) -> anyhow::Result<()> {
    let session_file = get_config_dir()?.join("session.json");
    fs::write(session_file, serde_json::to_string_pretty(session)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_url_wins_and_loses_trailing_slash() {
        let session = CliSession {
            url: Some("http://saved:1".to_string()),
            ..Default::default()
        };
        assert_eq!(session.resolve_url(Some("http://flag:2/".to_string())), "http://flag:2");
    }
}
