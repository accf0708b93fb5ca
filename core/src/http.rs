use crate::error::ClientError;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Per-request options layered on top of the client's defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, key: impl IntoHeaderName, value: &str) -> Result<Self, ClientError> {
        let val = HeaderValue::from_str(value)
            .map_err(|e| ClientError::ConfigError(format!("Invalid header value: {}", e)))?;
        self.headers.insert(key, val);
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A fully buffered HTTP response: status code plus the body bytes as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Turns any status other than 200 into `ClientError::ApiError`.
    ///
    /// UTF-8 bodies are carried verbatim. Other bytes are converted lossily,
    /// since the error carries text.
    pub fn error_for_status(self) -> Result<Self, ClientError> {
        if self.is_ok() {
            return Ok(self);
        }
        let body = match String::from_utf8(self.body) {
            Ok(text) => text,
            Err(e) => {
                warn!(status = self.status, "error body is not valid UTF-8");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        Err(ClientError::ApiError {
            status: self.status,
            body,
        })
    }
}

/// Serialize `request_body` and POST it to `url` exactly once.
///
/// Authentication and content-type headers are expected to be installed as
/// default headers on `http_client`. The whole body is read into memory
/// before returning; no status inspection happens here.
pub async fn send_once<T: Serialize>(
    http_client: &reqwest::Client,
    url: &str,
    request_body: &T,
    options: &RequestOptions,
) -> Result<RawResponse, ClientError> {
    let payload = serde_json::to_vec(request_body).map_err(ClientError::EncodingFailed)?;

    let mut request_builder = http_client.request(Method::POST, url).body(payload);

    if let Some(timeout) = options.timeout {
        request_builder = request_builder.timeout(timeout);
    }

    if !options.headers.is_empty() {
        request_builder = request_builder.headers(options.headers.clone());
    }

    debug!(%url, "sending chat completion request");
    let response = request_builder.send().await?;
    let status = response.status().as_u16();
    let body = response.bytes().await?.to_vec();
    debug!(%url, status, bytes = body.len(), "received response");

    if status != 200 {
        warn!(%url, status, "request returned non-success status");
    }

    Ok(RawResponse { status, body })
}
