//! HTTP transport to the CyberChef engine.
//!
//! Every exchange ends in an [`Exchange`]: the parsed JSON body, or an
//! [`ErrorResult`] describing what went wrong. Nothing here returns a fault
//! to the caller, so the bake layer only ever inspects data.
use crate::config::EngineConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Uniform failure shape: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub error: String,
}

impl ErrorResult {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl fmt::Display for ErrorResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error)
    }
}

/// Outcome of one request/response exchange.
pub type Exchange = Result<Value, ErrorResult>;

/// Flatten an exchange into the JSON value handed back to agents.
pub fn into_payload(exchange: Exchange) -> Value {
    match exchange {
        Ok(value) => value,
        Err(err) => serde_json::json!({ "error": err.error }),
    }
}

/// Sends one JSON POST to a named endpoint.
pub trait Transport {
    fn send(&self, endpoint: &str, body: &Value) -> Exchange;
}

/// Blocking transport backed by a pooled `ureq` agent.
pub struct HttpTransport {
    config: EngineConfig,
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(config: EngineConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .max_redirects(0)
            .build()
            .into();
        Self { config, agent }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Transport for HttpTransport {
    fn send(&self, endpoint: &str, body: &Value) -> Exchange {
        let url = self.config.endpoint_url(endpoint);
        tracing::info!(url = %url, "Attempting to send POST request");
        tracing::debug!(body = %body, "request data");

        let response = self
            .agent
            .post(&url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .send_json(body);
        let mut response = match response {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(url = %url, error = %err, "HTTP POST request failed");
                return Err(ErrorResult::new(format!(
                    "Exception raised during HTTP POST request to {url} - {err}"
                )));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let text = response.body_mut().read_to_string().unwrap_or_default();
            tracing::error!(
                url = %url,
                status = status.as_u16(),
                "HTTP error during POST request"
            );
            return Err(ErrorResult::new(status_error_message(
                status.as_u16(),
                status.canonical_reason(),
                &text,
            )));
        }

        let limit = self.config.max_response_bytes;
        let bytes = match response.body_mut().with_config().limit(limit).read_to_vec() {
            Ok(bytes) => bytes,
            Err(ureq::Error::BodyExceedsLimit(limit)) => {
                tracing::error!(url = %url, limit, "response body exceeds limit");
                return Err(ErrorResult::new(format!(
                    "Response from {url} exceeds the {limit} byte limit"
                )));
            }
            Err(err) => {
                tracing::error!(url = %url, error = %err, "reading response body failed");
                return Err(ErrorResult::new(format!(
                    "Exception raised during HTTP POST request to {url} - {err}"
                )));
            }
        };
        serde_json::from_slice(&bytes).map_err(|err| {
            tracing::error!(url = %url, error = %err, "response body is not JSON");
            ErrorResult::new(format!("Invalid JSON response from {url} - {err}"))
        })
    }
}

/// Message for a non-2xx response, preferring the engine's `message` field.
pub fn status_error_message(status: u16, reason: Option<&str>, body: &str) -> String {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| match value.get("message") {
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        });
    match message {
        Some(message) => format!("HTTP {status}: {message}"),
        None => match reason {
            Some(reason) => format!("HTTP {status}: {reason}"),
            None => format!("HTTP {status}: request failed with status {status}"),
        },
    }
}
