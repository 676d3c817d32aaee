//! HTTP client wrapper for the GameZone REST backend.
//!
//! Every request goes through [`HttpClient::send`], which:
//! - resolves the path against the configured base URL and applies the
//!   request timeout,
//! - attaches `Authorization: Bearer <credential>` when a session exists,
//! - retries idempotent requests on network errors, timeouts and 5xx with
//!   jittered exponential backoff,
//! - turns a 401 into a single session expiry (see [`Session::expire`]),
//! - normalizes every failure into an [`ApiError`].

use gamezone_core::{ApiError, ApiResult, RetryConfig};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::session::Session;

// ============================================================================
// REQUEST DESCRIPTOR
// ============================================================================

/// A request to send. Idempotency defaults from the method and decides
/// whether transient failures are retried.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    idempotent: bool,
    handles_unauthorized: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let idempotent = matches!(
            method,
            Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS
        );
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            idempotent,
            handles_unauthorized: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query<K, V, I>(mut self, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_json<B: Serialize>(mut self, body: &B) -> ApiResult<Self> {
        let value = serde_json::to_value(body).map_err(|err| ApiError::InvalidRequest {
            reason: format!("body does not serialize: {}", err),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn idempotent(mut self, idempotent: bool) -> Self {
        self.idempotent = idempotent;
        self
    }

    /// Let a 401 come back as an ordinary `Http` error instead of expiring
    /// the session. Used by the login calls, whose 401 means "bad
    /// credentials".
    pub fn without_auth_expiry(mut self) -> Self {
        self.handles_unauthorized = false;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_idempotent(&self) -> bool {
        self.idempotent
    }
}

/// A 2xx response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_slice(&self.body).map_err(|err| ApiError::MalformedResponse {
            status_code: self.status.as_u16(),
            reason: err.to_string(),
        })
    }
}

// ============================================================================
// CLIENT
// ============================================================================

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    retry: RetryConfig,
    session: Session,
}

impl HttpClient {
    pub fn new(config: &ClientConfig, session: Session) -> ApiResult<Self> {
        let timeout = config.request_timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::InvalidRequest {
                reason: format!("http client: {}", err),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            timeout,
            retry: config.retry.clone(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn retry_policy(&self) -> &RetryConfig {
        &self.retry
    }

    /// Send `request`, retrying where allowed. Returns the 2xx response or
    /// the normalized failure of the last attempt.
    pub async fn send(&self, request: &ApiRequest) -> ApiResult<ApiResponse> {
        let mut retry = 0u32;
        loop {
            let generation = self.session.generation();
            let err = match self.send_once(request).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            if err.status_code() == StatusCode::UNAUTHORIZED.as_u16()
                && request.handles_unauthorized
            {
                if self.session.expire(generation) {
                    warn!(path = %request.path, "401 from backend, session expired");
                }
                return Err(ApiError::AuthExpired);
            }

            let retryable = request.idempotent && err.is_transient();
            if !retryable || retry >= self.retry.max_retries {
                debug!(
                    method = %request.method,
                    path = %request.path,
                    attempts = retry + 1,
                    error = %err,
                    "request failed"
                );
                return Err(err);
            }

            let base = self.retry.base_delay(retry).as_millis() as u64;
            let delay = jittered_backoff(base, self.retry.jitter_ms);
            debug!(
                method = %request.method,
                path = %request.path,
                retry = retry + 1,
                delay_ms = delay,
                error = %err,
                "retrying request"
            );
            tokio::time::sleep(Duration::from_millis(delay)).await;
            retry += 1;
        }
    }

    pub async fn send_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> ApiResult<T> {
        self.send(request).await?.json()
    }

    /// Send and discard the body.
    pub async fn send_empty(&self, request: &ApiRequest) -> ApiResult<()> {
        self.send(request).await.map(|_| ())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send_json(&ApiRequest::get(path)).await
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.send_json(&ApiRequest::post(path).with_json(body)?).await
    }

    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.send_json(&ApiRequest::put(path).with_json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send_empty(&ApiRequest::delete(path)).await
    }

    async fn send_once(&self, request: &ApiRequest) -> ApiResult<ApiResponse> {
        let url = join_url(&self.base_url, &request.path);
        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .timeout(self.timeout)
            .header(reqwest::header::ACCEPT, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(credential) = self.session.credential() {
            builder = builder.bearer_auth(credential);
        }

        let response = builder.send().await.map_err(|err| self.transport_error(err))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(err))?
            .to_vec();

        if status.is_success() {
            return Ok(ApiResponse { status, body });
        }

        let text = String::from_utf8_lossy(&body);
        Err(ApiError::from_error_body(
            status.as_u16(),
            &text,
            status.canonical_reason().unwrap_or(""),
        ))
    }

    fn transport_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else if err.is_builder() {
            ApiError::InvalidRequest {
                reason: err.to_string(),
            }
        } else {
            ApiError::network(err.to_string())
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn jittered_backoff(base_ms: u64, jitter_ms: u64) -> u64 {
    if jitter_ms == 0 {
        return base_ms;
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_nanos(0))
        .subsec_nanos() as u64;
    base_ms.saturating_add(nanos % jitter_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotency_defaults_from_method() {
        assert!(ApiRequest::get("/games").is_idempotent());
        assert!(ApiRequest::put("/games/1").is_idempotent());
        assert!(ApiRequest::delete("/games/1").is_idempotent());
        assert!(!ApiRequest::post("/transactions").is_idempotent());
        assert!(ApiRequest::post("/members/search").idempotent(true).is_idempotent());
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://h:8080/", "/games"), "http://h:8080/games");
        assert_eq!(join_url("http://h:8080", "api/health"), "http://h:8080/api/health");
        assert_eq!(join_url("http://h", "https://other/x"), "https://other/x");
    }

    #[test]
    fn test_jitter_bounded() {
        for _ in 0..100 {
            let delay = jittered_backoff(100, 20);
            assert!((100..120).contains(&delay));
        }
        assert_eq!(jittered_backoff(100, 0), 100);
    }

    #[test]
    fn test_malformed_body_on_success() {
        let response = ApiResponse {
            status: StatusCode::OK,
            body: b"<html>".to_vec(),
        };
        let err = response.json::<Value>().unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse { status_code: 200, .. }));
    }
}
