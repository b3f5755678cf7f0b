//! AI explanation via a hosted chat-completion endpoint.
//! One request per click: no retry, no streaming. Every failure becomes a display string.

use crate::constants::*;
use crate::settings::Settings;
use crate::utils::format_flow_rate;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ExplainError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response contained no completion")]
    EmptyResponse,
}

/// Endpoint and sampling parameters for one explanation request
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl ExplainConfig {
    pub fn from_settings(settings: &Settings, api_key: &str) -> Self {
        Self {
            api_base_url: settings.api_base_url.clone(),
            api_key: api_key.to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            timeout: Duration::from_secs(settings.request_timeout_secs),
        }
    }
}

/// API key from the environment, or the placeholder (requests will then fail with an auth error)
pub fn api_key_from_env() -> String {
    resolve_api_key(std::env::var(API_KEY_ENV).ok())
}

/// A set variable is used as-is, even when empty; only an unset one falls back
fn resolve_api_key(value: Option<String>) -> String {
    match value {
        Some(key) => {
            if key.trim().is_empty() {
                warn!(var = API_KEY_ENV, "API key is set but empty");
            }
            key
        }
        None => {
            warn!(var = API_KEY_ENV, "API key not set, using placeholder");
            API_KEY_PLACEHOLDER.to_string()
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct Explainer {
    client: Client,
    config: ExplainConfig,
}

impl Explainer {
    pub fn new(config: ExplainConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to build HTTP client with timeout, using defaults");
                Client::new()
            });
        Self { client, config }
    }

    pub fn config(&self) -> &ExplainConfig {
        &self.config
    }

    pub fn prompt(pollutant: &str, flow_rate: f64) -> String {
        format!(
            "Explain in technical detail how to treat {} in wastewater with flow rate {} m³/day.",
            pollutant,
            format_flow_rate(flow_rate)
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_base_url.trim_end_matches('/'))
    }

    /// Send one chat-completion request and return the first choice's text
    pub async fn request(&self, prompt: &str) -> Result<String, ExplainError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = self.endpoint();
        debug!(url = %url, model = %self.config.model, "Sending explanation request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ExplainError::Status { status, body: text });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ExplainError::EmptyResponse)
    }

    /// Explanation text for the panel; failures are folded into a warning string
    pub async fn explain(&self, pollutant: &str, flow_rate: f64) -> String {
        let prompt = Self::prompt(pollutant, flow_rate);
        match self.request(&prompt).await {
            Ok(content) => {
                info!(pollutant, chars = content.len(), "Explanation received");
                content
            }
            Err(e) => {
                warn!(pollutant, error = %e, "Explanation request failed");
                format!("{}{}", EXPLAIN_FAILURE_PREFIX, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    fn config(base_url: &str) -> ExplainConfig {
        ExplainConfig {
            api_base_url: base_url.to_string(),
            api_key: "test-key".to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(5),
        }
    }

    /// Serve one canned HTTP response and hand back the raw request
    async fn serve_once(status: u16, body: &str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/openai/v1", listener.local_addr().unwrap());
        let body = body.to_string();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let raw = String::from_utf8_lossy(&buf);
                if let Some(end) = raw.find("\r\n\r\n") {
                    let content_length = raw[..end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }
            let _ = tx.send(String::from_utf8_lossy(&buf).to_string());

            let response = format!(
                "HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        });

        (url, rx)
    }

    #[test]
    fn prompt_text() {
        assert_eq!(
            Explainer::prompt("lead", 100.0),
            "Explain in technical detail how to treat lead in wastewater with flow rate 100.0 m³/day."
        );
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let explainer = Explainer::new(config("http://localhost:8000/v1/"));
        assert_eq!(explainer.endpoint(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn config_from_settings() {
        let settings = Settings::default();
        let cfg = ExplainConfig::from_settings(&settings, "abc");
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(cfg.model, "llama-3.1-8b-instant");
        assert_eq!(cfg.temperature, 0.6);
        assert_eq!(cfg.max_tokens, 500);
        assert_eq!(cfg.api_key, "abc");
        assert_eq!(cfg.timeout, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
    }

    #[test]
    fn api_key_fallback_only_when_unset() {
        assert_eq!(resolve_api_key(None), "demo_key_replace");
        assert_eq!(resolve_api_key(Some("gsk_live".to_string())), "gsk_live");
        assert_eq!(resolve_api_key(Some(String::new())), "");
        assert_eq!(resolve_api_key(Some("  ".to_string())), "  ");
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Use lime softening."}},{"index":1,"message":{"role":"assistant","content":"ignored"}}]}"#;
        let (url, request_rx) = serve_once(200, body).await;

        let explainer = Explainer::new(config(&url));
        let text = explainer.explain("lead", 250.0).await;
        assert_eq!(text, "Use lime softening.");

        let request = request_rx.await.unwrap();
        assert!(request.starts_with("POST /openai/v1/chat/completions"));
        assert!(request.to_lowercase().contains("authorization: bearer test-key"));
        assert!(request.contains(r#""model":"llama-3.1-8b-instant""#));
        assert!(request.contains(r#""max_tokens":500"#));
        assert!(request.contains(r#""role":"user""#));
        assert!(request.contains("treat lead in wastewater with flow rate 250.0"));
    }

    #[tokio::test]
    async fn http_error_becomes_warning_text() {
        let (url, _rx) = serve_once(401, r#"{"error":{"message":"Invalid API Key"}}"#).await;
        let text = Explainer::new(config(&url)).explain("arsenic", 100.0).await;
        assert!(text.starts_with(EXPLAIN_FAILURE_PREFIX), "{text}");
        assert!(text.contains("401"));
        assert!(text.contains("Invalid API Key"));
    }

    #[tokio::test]
    async fn empty_choices_is_a_failure() {
        let (url, _rx) = serve_once(200, r#"{"choices":[]}"#).await;
        let explainer = Explainer::new(config(&url));
        let err = explainer.request("anything").await.unwrap_err();
        assert!(matches!(err, ExplainError::EmptyResponse));
    }

    #[tokio::test]
    async fn malformed_json_is_a_failure() {
        let (url, _rx) = serve_once(200, "not json").await;
        let text = Explainer::new(config(&url)).explain("chromium", 1.0).await;
        assert!(text.starts_with("⚠️ AI explanation unavailable: failed to parse response"));
    }

    #[tokio::test]
    async fn network_failure_becomes_warning_text() {
        // Reserve a port, then close it so the connection is refused
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let text = Explainer::new(config(&format!("http://{}", addr)))
            .explain("lead", 100.0)
            .await;
        assert!(text.starts_with("⚠️ AI explanation unavailable: "), "{text}");
        assert!(text.len() > EXPLAIN_FAILURE_PREFIX.len());
    }
}
