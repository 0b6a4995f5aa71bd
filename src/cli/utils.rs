use std::time::Duration;

use reqwest::{redirect::Policy, Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::config::{load_session, CliSession};
use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let Some(data) = data {
                response["data"] = data;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print a value as pretty JSON, or hand it to `text` for human output
pub fn output_data<F>(output_format: OutputFormat, data: &Value, text: F) -> anyhow::Result<()>
where
    F: FnOnce(&Value),
{
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Text => text(data),
    }
    Ok(())
}

/// Thin reqwest wrapper that unwraps the API envelope.
/// Redirects are not followed; a 303 comes back as `{ "redirect": location }`.
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            token,
            http,
        })
    }

    /// Client for the saved session, honoring a `--url` override
    pub fn from_session(url_override: Option<String>) -> anyhow::Result<(Self, CliSession)> {
        let session = load_session()?;
        let client = Self::new(session.resolve_url(url_override), session.token.clone())?;
        Ok((client, session))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<Value> {
        self.send(self.http.get(self.url(path))).await
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<Value> {
        self.send(self.http.delete(self.url(path))).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> anyhow::Result<Value> {
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    pub async fn post_form<T: Serialize + ?Sized>(&self, path: &str, form: &T) -> anyhow::Result<Value> {
        self.send(self.http.post(self.url(path)).form(form)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> anyhow::Result<Value> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::SEE_OTHER {
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            return Ok(json!({ "redirect": location }));
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        if status.is_success() {
            return Ok(body.get("data").cloned().unwrap_or(body));
        }

        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed"));
        let mut details = String::new();
        if let Some(fields) = body.get("field_errors").and_then(Value::as_object) {
            for (field, error) in fields {
                details.push_str(&format!("\n  {}: {}", field, error.as_str().unwrap_or_default()));
            }
        }
        anyhow::bail!("{} ({}){}", message, status.as_u16(), details)
    }
}
