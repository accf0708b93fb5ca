use serde::Deserialize;
use thiserror::Error;

/// Error type shared by every layer of the chat client.
///
/// All variants are terminal for the call that produced them; nothing is
/// retried internally.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Encoding error: failed to serialize request body: {0}")]
    EncodingFailed(#[source] serde_json::Error),
    #[error("Transport error: {0}")]
    TransportFailed(#[from] reqwest::Error),
    #[error("Malformed response: body is not valid JSON: {0}")]
    MalformedResponse(String),
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
    #[error("API error (status {status}): {body}")]
    ApiError { status: u16, body: String },
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: Option<serde_json::Value>,
    status: Option<String>,
    message: String,
}

impl ClientError {
    /// HTTP status of an `ApiError`, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Renders `{"error": {"code", "status", "message"}}` bodies as
    /// `[<code> <status>] <message>`. The raw body stays untouched in the error.
    pub fn api_error_summary(&self) -> Option<String> {
        let ClientError::ApiError { body, .. } = self else {
            return None;
        };
        let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
        let detail = envelope.error;

        let code = match detail.code {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let label = [code, detail.status]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");

        if label.is_empty() {
            Some(detail.message)
        } else {
            Some(format!("[{}] {}", label, detail.message))
        }
    }
}
