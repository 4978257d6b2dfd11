use std::time::Duration;

use serde_json::Value;

use crate::content::{ContentPayload, GenerationRequest};

pub const FALLBACK_ERROR: &str = "Failed to generate content";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Network failure, timeout, or a client built without network support.
    #[error("{0}")]
    Transport(String),
    /// Non-2xx response without an `error` field in the body. `message` is the
    /// reason phrase, kept for logs only.
    #[error("Request failed with status code {status}")]
    Status { status: u16, message: String },
    /// The server reported a failure in the body, whatever the status.
    #[error("{0}")]
    Remote(String),
    #[error("Invalid content payload: {0}")]
    Decode(String),
}

impl ClientError {
    /// Most specific message available, falling back to a generic one.
    pub fn user_message(&self) -> String {
        let message = match self {
            ClientError::Remote(msg) | ClientError::Transport(msg) => msg.trim().to_string(),
            other => other.to_string(),
        };
        if message.is_empty() {
            FALLBACK_ERROR.to_string()
        } else {
            message
        }
    }
}

/// Anything that can turn a [`GenerationRequest`] into content.
pub trait ContentClient: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> Result<ContentPayload, ClientError>;
}

/// Decode a `/generate` response.
///
/// An `error` string in the body wins over the status code: the service
/// answers some failures with 200.
pub fn interpret_response(status: u16, body: &str) -> Result<ContentPayload, ClientError> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    if let Some(message) = parsed
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
    {
        return Err(ClientError::Remote(message.to_string()));
    }

    if !(200..300).contains(&status) {
        let reason = status_reason(status);
        tracing::warn!(status, reason, "content service returned a failure status");
        return Err(ClientError::Status {
            status,
            message: reason.to_string(),
        });
    }

    match parsed {
        Some(value @ Value::Object(_)) => {
            serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
        }
        Some(_) => Err(ClientError::Decode("expected a JSON object".to_string())),
        None => Err(ClientError::Decode("response body is not JSON".to_string())),
    }
}

fn status_reason(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        408 => "Request Timeout",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unexpected response",
    }
}

#[derive(Clone, Debug)]
pub struct HttpContentClient {
    base_url: String,
    #[cfg(feature = "network")]
    http: reqwest::blocking::Client,
}

impl HttpContentClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        #[cfg(not(feature = "network"))]
        let _ = timeout;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            #[cfg(feature = "network")]
            http: reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()?,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/generate", self.base_url)
    }
}

#[cfg(feature = "network")]
impl ContentClient for HttpContentClient {
    fn generate(&self, request: &GenerationRequest) -> Result<ContentPayload, ClientError> {
        let url = self.endpoint();
        tracing::info!(%url, skill = %request.skill, difficulty = %request.difficulty, "requesting content");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Transport("Request timed out".to_string())
                } else {
                    ClientError::Transport(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        tracing::debug!(status, bytes = body.len(), "content response received");

        interpret_response(status, &body)
    }
}

#[cfg(not(feature = "network"))]
impl ContentClient for HttpContentClient {
    fn generate(&self, _request: &GenerationRequest) -> Result<ContentPayload, ClientError> {
        Err(ClientError::Transport(
            "Network support is disabled in this build".to_string(),
        ))
    }
}
