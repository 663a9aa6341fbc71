//! HTTP transport seam.
//!
//! `Transport` is the dumb pipe every higher layer talks through; the real
//! implementation is reqwest-backed, tests swap in an in-memory store.
//! Cancellation is by dropping the returned future: callers that need to
//! abort an in-flight request race it against their own cancel signal.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiError;
use crate::config::ConnectionConfig;

/// HTTP verbs the store understands, including inside batch steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// A single outbound call, relative to the transport's base URL.
#[derive(Clone, Debug)]
pub struct TransportRequest {
    pub method: Method,
    /// Path relative to the base URL, no leading slash.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl TransportRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Patch, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// A successful (2xx) response.
#[derive(Clone, Debug)]
pub struct TransportResponse {
    pub status: u16,
    /// Location header, present on resource creation.
    pub location: Option<String>,
    /// Decoded body; `Null` when the response was empty.
    pub body: Value,
}

impl TransportResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(self.body.clone())
            .map_err(|err| ApiError::decode(format!("response decode failed: {err}")))
    }
}

/// The pipe to the store's REST facade.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, req: TransportRequest) -> Result<TransportResponse, ApiError>;
}

// =============================================================================
// Reqwest-backed transport
// =============================================================================

/// Real HTTP transport over reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
    base: reqwest::Url,
}

impl HttpTransport {
    pub fn new(config: &ConnectionConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| ApiError::network(format!("client init failed: {err}")))?;
        // `Url::join` treats a base without a trailing slash as a file;
        // normalize so relative paths always append.
        let mut raw = config.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = reqwest::Url::parse(&raw)
            .map_err(|err| ApiError::decode(format!("invalid base url `{raw}`: {err}")))?;
        Ok(Self { client, base })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, req: TransportRequest) -> Result<TransportResponse, ApiError> {
        let mut url = self
            .base
            .join(&req.path)
            .map_err(|err| ApiError::decode(format!("invalid path `{}`: {err}", req.path)))?;
        for (key, value) in &req.query {
            url.query_pairs_mut().append_pair(key, value);
        }

        let mut builder = match req.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Patch => self.client.patch(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        };
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| ApiError::network(err.to_string()))?;

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let text = response
            .text()
            .await
            .map_err(|err| ApiError::network(err.to_string()))?;

        if !(200..300).contains(&status) {
            let message = if text.is_empty() {
                format!("{} {}", req.method.as_str(), req.path)
            } else {
                truncated(&text, 512)
            };
            return Err(ApiError::from_status(status, message));
        }

        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)
                .map_err(|err| ApiError::decode(format!("response body is not JSON: {err}")))?
        };

        Ok(TransportResponse {
            status,
            location,
            body,
        })
    }
}

fn truncated(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}

// =============================================================================
// Retry wrapper
// =============================================================================

/// Retry settings: additional attempts after the first, fixed backoff.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ConnectionConfig) -> Self {
        Self {
            retries: config.retry_count,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

/// Transport decorator retrying retryable failures with a fixed backoff.
///
/// Retryability is decided by the normalized error kind; domain-level
/// failures (validation, conflicts, batch composites) never reach here as
/// retryable.
pub struct Retrying<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> Retrying<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<T: Transport> Transport for Retrying<T> {
    async fn send(&self, req: TransportRequest) -> Result<TransportResponse, ApiError> {
        let mut attempt = 0;
        loop {
            match self.inner.send(req.clone()).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() && attempt < self.policy.retries => {
                    attempt += 1;
                    tracing::debug!(
                        attempt,
                        kind = err.kind.as_str(),
                        "retrying after transient failure"
                    );
                    tokio::time::sleep(self.policy.backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::error::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` sends, then succeeds.
    struct Flaky {
        failures: AtomicUsize,
        sends: AtomicUsize,
        error: ApiError,
    }

    impl Flaky {
        fn new(failures: usize, error: ApiError) -> Self {
            Self {
                failures: AtomicUsize::new(failures),
                sends: AtomicUsize::new(0),
                error,
            }
        }
    }

    #[async_trait]
    impl Transport for Flaky {
        async fn send(&self, _req: TransportRequest) -> Result<TransportResponse, ApiError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(self.error.clone());
            }
            Ok(TransportResponse {
                status: 200,
                location: None,
                body: Value::Null,
            })
        }
    }

    fn policy(retries: u32) -> RetryPolicy {
        RetryPolicy {
            retries,
            backoff: Duration::from_millis(250),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried_until_success() {
        let transport = Retrying::new(
            Flaky::new(2, ApiError::from_status(503, "busy")),
            policy(2),
        );
        let response = transport
            .send(TransportRequest::get("elements/E1"))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(transport.inner.sends.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn the_retry_budget_is_finite() {
        let transport = Retrying::new(
            Flaky::new(5, ApiError::from_status(503, "busy")),
            policy(2),
        );
        let err = transport
            .send(TransportRequest::get("elements/E1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Server);
        assert_eq!(transport.inner.sends.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_failures_are_not_retried() {
        let transport = Retrying::new(
            Flaky::new(5, ApiError::from_status(404, "gone")),
            policy(3),
        );
        let err = transport
            .send(TransportRequest::get("elements/E1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(transport.inner.sends.load(Ordering::SeqCst), 1);
    }
}
