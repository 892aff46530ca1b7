// API client module: contains a small blocking HTTP client that talks to
// the GenAI Bot API gateway. It is intentionally synchronous; the batch
// dispatcher gets its parallelism from worker threads, not from the
// client, so the client must stay safe to share across threads.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::CliConfig;

/// Blocking API client holding the reqwest client, the gateway base URL
/// and the configured per-request defaults. Holds no mutable state, so
/// one instance can be shared by reference between batch workers.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    defaults: GenerateDefaults,
}

/// Configured fallbacks applied when a request leaves a parameter unset.
#[derive(Debug, Clone)]
pub struct GenerateDefaults {
    pub max_tokens: u32,
    pub temperature: f64,
    pub user_id: String,
}

/// Per-request overrides. Unset fields fall back to `GenerateDefaults`.
#[derive(Debug, Clone, Default)]
pub struct GenerateParams {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub user_id: Option<String>,
}

/// Payload for POST /generate. Fields mirror the backend expectations.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    max_tokens: u32,
    temperature: f64,
    user_id: &'a str,
}

/// Successful response from /generate. `metadata` is kept as a JSON map
/// because the backend adds fields over time (token counts, latency,
/// mock_mode) and the CLI only ever displays them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub generated_text: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Structured detail the backend attaches to 4xx errors. For content
/// policy violations `reason` is "Content policy violation" and
/// `severity` carries the filter level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
}

/// Error body shape for non-2xx responses: `{error, details?, message?}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<ErrorDetails>,
    #[serde(default)]
    message: Option<String>,
}

/// Uniform failure shape for every way a request can go wrong. The
/// caller decides what to do with it; no retry happens at this level.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiFailure {
    #[error("Request timeout - API took too long to respond")]
    Timeout,
    #[error("Connection error - Could not reach API")]
    Connection,
    #[error("Invalid JSON response: {0}")]
    InvalidBody(String),
    /// Backend-reported error with its actual HTTP status. 4xx bodies
    /// may carry structured details (content policy violations).
    #[error("{error}")]
    Api {
        status: u16,
        error: String,
        message: Option<String>,
        details: Option<ErrorDetails>,
    },
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ApiFailure {
    /// HTTP status for backend errors, or a surrogate for failures that
    /// never produced a response (408 timeout, 503 connection, 500 rest).
    pub fn status_code(&self) -> u16 {
        match self {
            ApiFailure::Timeout => 408,
            ApiFailure::Connection => 503,
            ApiFailure::InvalidBody(_) => 500,
            ApiFailure::Api { status, .. } => *status,
            ApiFailure::Unexpected(_) => 500,
        }
    }
}

/// Seam between the batch dispatcher and the HTTP client, so dispatcher
/// tests can run against an in-memory generator.
pub trait TextGenerator {
    fn generate(&self, prompt: &str, params: &GenerateParams) -> Result<Generation, ApiFailure>;
}

impl TextGenerator for ApiClient {
    fn generate(&self, prompt: &str, params: &GenerateParams) -> Result<Generation, ApiFailure> {
        ApiClient::generate(self, prompt, params)
    }
}

/// Usage statistics returned by GET /usage/{user_id}. Every field is
/// defaulted so a sparse backend response still renders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageStats {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub period_days: u32,
    #[serde(default)]
    pub total_requests: u64,
    #[serde(default)]
    pub total_input_tokens: u64,
    #[serde(default)]
    pub total_output_tokens: u64,
    #[serde(default)]
    pub average_response_time_ms: u64,
    #[serde(default)]
    pub content_filter_events: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub last_request: Option<String>,
    #[serde(default)]
    pub requests_by_day: Vec<DayStats>,
}

/// One row of the daily usage breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayStats {
    pub date: String,
    #[serde(default)]
    pub requests: u64,
    #[serde(default)]
    pub tokens: u64,
}

impl ApiClient {
    /// Build a client from the loaded configuration. The configured
    /// timeout bounds every request made through this client.
    pub fn new(config: &CliConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: config.api_endpoint.trim_end_matches('/').to_string(),
            defaults: GenerateDefaults {
                max_tokens: config.default_max_tokens,
                temperature: config.default_temperature,
                user_id: config.default_user_id.clone(),
            },
        })
    }

    /// POST one prompt to /generate. Exactly one attempt; every failure
    /// mode comes back as an `ApiFailure` rather than a panic or a raw
    /// reqwest error.
    pub fn generate(&self, prompt: &str, params: &GenerateParams) -> Result<Generation, ApiFailure> {
        let url = format!("{}/generate", self.base_url);
        let payload = GenerateRequest {
            prompt,
            max_tokens: params.max_tokens.unwrap_or(self.defaults.max_tokens),
            temperature: params.temperature.unwrap_or(self.defaults.temperature),
            user_id: params.user_id.as_deref().unwrap_or(&self.defaults.user_id),
        };

        debug!(url = %url, max_tokens = payload.max_tokens, "sending generate request");
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .map_err(send_failure)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(send_failure)?;
        debug!(status, "generate response received");

        decode_generate(status, &body)
    }

    /// GET usage statistics for a user over the last `days` days. The
    /// backend defaults to 7, so the query parameter is only attached
    /// when asking for something else.
    pub fn get_usage(&self, user_id: &str, days: u32) -> Result<UsageStats, ApiFailure> {
        let url = format!("{}/usage/{}", self.base_url, user_id);
        debug!(user_id, days, "fetching usage stats");

        let mut request = self.client.get(&url);
        if days != 7 {
            request = request.query(&[("days", days)]);
        }
        let response = request.send().map_err(send_failure)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(send_failure)?;

        decode_usage(status, &body)
    }

    /// Cheap connectivity probe: one tiny generation request.
    pub fn health_check(&self) -> bool {
        let params = GenerateParams {
            max_tokens: Some(10),
            ..GenerateParams::default()
        };
        self.generate("test", &params).is_ok()
    }
}

fn send_failure(err: reqwest::Error) -> ApiFailure {
    if err.is_timeout() {
        ApiFailure::Timeout
    } else if err.is_connect() {
        ApiFailure::Connection
    } else {
        ApiFailure::Unexpected(err.to_string())
    }
}

/// Map a /generate response to a result. Split from the request so the
/// status handling is testable without a server.
fn decode_generate(status: u16, body: &str) -> Result<Generation, ApiFailure> {
    match status {
        200 => serde_json::from_str(body).map_err(|e| ApiFailure::InvalidBody(e.to_string())),
        400 => {
            // Client errors carry a structured body; an undecodable one
            // is treated like any other malformed response.
            let err: ErrorBody =
                serde_json::from_str(body).map_err(|e| ApiFailure::InvalidBody(e.to_string()))?;
            warn!(status, error = err.error.as_deref(), "client error from API");
            Err(ApiFailure::Api {
                status,
                error: err.error.unwrap_or_else(|| "Bad request".to_string()),
                message: err.message,
                details: err.details,
            })
        }
        _ => {
            let err: ErrorBody = if body.is_empty() {
                ErrorBody::default()
            } else {
                serde_json::from_str(body).unwrap_or_default()
            };
            warn!(status, "API error");
            Err(ApiFailure::Api {
                status,
                error: err.error.unwrap_or_else(|| "Unknown API error".to_string()),
                message: err.message,
                details: err.details,
            })
        }
    }
}

fn decode_usage(status: u16, body: &str) -> Result<UsageStats, ApiFailure> {
    if status == 200 {
        return serde_json::from_str(body).map_err(|e| ApiFailure::InvalidBody(e.to_string()));
    }
    let err: ErrorBody = if body.is_empty() {
        ErrorBody::default()
    } else {
        serde_json::from_str(body).unwrap_or_default()
    };
    Err(ApiFailure::Api {
        status,
        error: err
            .error
            .unwrap_or_else(|| "Could not fetch usage statistics".to_string()),
        message: err.message,
        details: err.details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_generate_success() {
        let body = r#"{"generated_text":"hello","metadata":{"output_tokens":5}}"#;
        let generation = decode_generate(200, body).unwrap();
        assert_eq!(generation.generated_text, "hello");
        assert_eq!(generation.metadata["output_tokens"], 5);
    }

    #[test]
    fn decode_generate_garbage_body_is_invalid() {
        let err = decode_generate(200, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, ApiFailure::InvalidBody(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn decode_generate_content_policy_details_survive() {
        let body = r#"{
            "error": "Content rejected",
            "details": {"reason": "Content policy violation", "severity": "HIGH"},
            "message": "Please rephrase your prompt"
        }"#;
        let err = decode_generate(400, body).unwrap_err();
        match err {
            ApiFailure::Api {
                status,
                error,
                message,
                details,
            } => {
                assert_eq!(status, 400);
                assert_eq!(error, "Content rejected");
                assert_eq!(message.as_deref(), Some("Please rephrase your prompt"));
                let details = details.unwrap();
                assert_eq!(details.reason.as_deref(), Some("Content policy violation"));
                assert_eq!(details.severity.as_deref(), Some("HIGH"));
            }
            other => panic!("expected Api failure, got {other:?}"),
        }
    }

    #[test]
    fn decode_generate_server_error_with_empty_body() {
        let err = decode_generate(502, "").unwrap_err();
        match &err {
            ApiFailure::Api { status, error, .. } => {
                assert_eq!(*status, 502);
                assert_eq!(error, "Unknown API error");
            }
            other => panic!("expected Api failure, got {other:?}"),
        }
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn status_code_surrogates() {
        assert_eq!(ApiFailure::Timeout.status_code(), 408);
        assert_eq!(ApiFailure::Connection.status_code(), 503);
        assert_eq!(ApiFailure::Unexpected("boom".into()).status_code(), 500);
    }

    #[test]
    fn decode_usage_success_defaults_missing_fields() {
        let stats = decode_usage(200, r#"{"user_id":"cli_user","total_requests":12}"#).unwrap();
        assert_eq!(stats.user_id, "cli_user");
        assert_eq!(stats.total_requests, 12);
        assert_eq!(stats.total_output_tokens, 0);
        assert!(stats.requests_by_day.is_empty());
    }

    #[test]
    fn decode_usage_error_has_fallback_message() {
        let err = decode_usage(404, "{}").unwrap_err();
        match err {
            ApiFailure::Api { status, error, .. } => {
                assert_eq!(status, 404);
                assert_eq!(error, "Could not fetch usage statistics");
            }
            other => panic!("expected Api failure, got {other:?}"),
        }
    }
}
