//! Request dispatch: bearer attachment, error shaping, refresh-and-retry.
//!
//! Every resource call funnels through [`ApiClient::request`]. A 401 on the
//! first attempt is handed to the [`RefreshGate`]; the request is replayed at
//! most once with the refreshed token. A 401 on the replay is returned as-is.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use platera_types::{ListEnvelope, Page, RefreshResponse};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::broadcast;

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::form::FormData;
use crate::refresh::{RefreshGate, RefreshState};
use crate::store::{self, TokenStore};

/// Standard User-Agent header for Platera API requests.
pub const USER_AGENT: &str = concat!("platera/", env!("CARGO_PKG_VERSION"));

/// Token refresh endpoint, relative to the base URL.
pub const REFRESH_PATH: &str = "auth/token/refresh/";

pub(crate) const EVENT_CAPACITY: usize = 16;

/// Session lifecycle notifications broadcast by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Tokens from a successful login were stored.
    LoggedIn,
    /// The session was ended on request.
    LoggedOut,
    /// Token refresh failed; the session was torn down and the user must
    /// sign in again.
    Expired,
}

/// Body of an outgoing request.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Form(FormData),
}

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Query string pairs, appended in order
    pub query: Vec<(String, String)>,
    /// Do not attempt a token refresh on 401 (login endpoints)
    pub skip_refresh: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Adds a query pair only when `value` is present.
    #[must_use]
    pub fn query_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    #[must_use]
    pub fn without_refresh(mut self) -> Self {
        self.skip_refresh = true;
        self
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub url: String,
    body: Bytes,
}

impl ApiResponse {
    /// Decodes the body as `T`.
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_slice(&self.body).map_err(|err| {
            ApiError::decode(format!("Failed to decode response from {}: {err}", self.url))
        })
    }

    /// Returns the body as JSON; empty or non-JSON bodies become `null`.
    pub fn value(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    /// Normalizes a list body (bare array, paginated envelope, anything else).
    pub fn list<T: DeserializeOwned>(&self) -> Vec<T> {
        ListEnvelope::parse(self.value()).into_items()
    }

    pub fn page<T: DeserializeOwned>(&self) -> Page<T> {
        ListEnvelope::parse(self.value()).into_page()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }
}

struct Inner {
    base_url: String,
    http: reqwest::Client,
    store: Arc<dyn TokenStore>,
    gate: RefreshGate,
    events: broadcast::Sender<SessionEvent>,
}

/// HTTP client for the restaurant API. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("refresh_state", &self.inner.gate.state())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client with the default timeout.
    pub fn new(base_url: impl Into<String>, store: Arc<dyn TokenStore>) -> Result<Self> {
        Self::with_timeout(
            base_url,
            store,
            Duration::from_secs(Config::DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        store: Arc<dyn TokenStore>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            inner: Arc::new(Inner {
                base_url,
                http,
                store,
                gate: RefreshGate::new(),
                events,
            }),
        })
    }

    /// Creates a client from resolved configuration.
    pub fn from_config(config: &Config, store: Arc<dyn TokenStore>) -> Result<Self> {
        Self::with_timeout(config.base_url()?, store, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn store(&self) -> &dyn TokenStore {
        self.inner.store.as_ref()
    }

    pub fn refresh_state(&self) -> RefreshState {
        self.inner.gate.state()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn notify(&self, event: SessionEvent) {
        // No receivers is fine.
        let _ = self.inner.events.send(event);
    }

    /// Stores tokens from a successful login and re-arms the interceptor.
    pub fn begin_session(&self, access: &str, refresh: &str) {
        store::store_tokens(self.store(), access, refresh);
        self.inner.gate.reset();
        self.notify(SessionEvent::LoggedIn);
    }

    /// Clears every session key.
    pub fn end_session(&self) {
        self.store().clear_session();
        self.notify(SessionEvent::LoggedOut);
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    /// Sends a request, refreshing the access token and replaying once on 401.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> ApiResult<ApiResponse> {
        let url = self.url(path);
        let sent_with = store::access_token(self.store());

        let (status, bytes) = self
            .send(&method, &url, &body, &options, sent_with.as_deref())
            .await?;

        if status != StatusCode::UNAUTHORIZED || options.skip_refresh {
            return finish(status, url, bytes);
        }

        tracing::debug!(%method, %url, "401 received, entering refresh");
        let token = match self
            .inner
            .gate
            .refresh(self.store(), sent_with.as_deref(), |refresh| {
                self.call_refresh(refresh)
            })
            .await
        {
            Ok(token) => token,
            Err(failure) => {
                if failure.ended_session {
                    tracing::info!("session expired, stored credentials cleared");
                    self.notify(SessionEvent::Expired);
                }
                return Err(failure.error);
            }
        };

        let (status, bytes) = self
            .send(&method, &url, &body, &options, Some(&token))
            .await?;
        finish(status, url, bytes)
    }

    async fn send(
        &self,
        method: &Method,
        url: &str,
        body: &RequestBody,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> ApiResult<(StatusCode, Bytes)> {
        let mut builder = self
            .inner
            .http
            .request(method.clone(), url)
            .header(ACCEPT, "application/json");

        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        builder = match body {
            RequestBody::Empty => builder.header(CONTENT_TYPE, "application/json"),
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(form) => builder.multipart(form.to_multipart()?),
        };

        tracing::debug!(%method, %url, authenticated = token.is_some(), "sending request");
        let response = builder.send().await.map_err(|err| ApiError::network(&err))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ApiError::network(&err))?;
        tracing::debug!(%method, %url, status = status.as_u16(), "response received");
        Ok((status, bytes))
    }

    /// Calls the refresh endpoint directly, outside the interceptor.
    async fn call_refresh(&self, refresh_token: String) -> ApiResult<RefreshResponse> {
        let url = self.url(REFRESH_PATH);
        let response = self
            .inner
            .http
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&json!({ "refresh": refresh_token }))
            .send()
            .await
            .map_err(|err| ApiError::network(&err))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ApiError::network(&err))?;
        finish(status, url, bytes)?.json()
    }

    pub async fn get(&self, path: &str) -> ApiResult<ApiResponse> {
        self.request(
            Method::GET,
            path,
            RequestBody::Empty,
            RequestOptions::default(),
        )
        .await
    }

    pub async fn get_query(&self, path: &str, options: RequestOptions) -> ApiResult<ApiResponse> {
        self.request(Method::GET, path, RequestBody::Empty, options)
            .await
    }

    pub async fn post(&self, path: &str, body: Value) -> ApiResult<ApiResponse> {
        self.request(
            Method::POST,
            path,
            RequestBody::Json(body),
            RequestOptions::default(),
        )
        .await
    }

    pub async fn post_empty(&self, path: &str) -> ApiResult<ApiResponse> {
        self.request(
            Method::POST,
            path,
            RequestBody::Empty,
            RequestOptions::default(),
        )
        .await
    }

    pub async fn patch(&self, path: &str, body: Value) -> ApiResult<ApiResponse> {
        self.request(
            Method::PATCH,
            path,
            RequestBody::Json(body),
            RequestOptions::default(),
        )
        .await
    }

    pub async fn put(&self, path: &str, body: Value) -> ApiResult<ApiResponse> {
        self.request(
            Method::PUT,
            path,
            RequestBody::Json(body),
            RequestOptions::default(),
        )
        .await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<ApiResponse> {
        self.request(
            Method::DELETE,
            path,
            RequestBody::Empty,
            RequestOptions::default(),
        )
        .await
    }

    pub async fn post_form(&self, path: &str, form: FormData) -> ApiResult<ApiResponse> {
        self.request(
            Method::POST,
            path,
            RequestBody::Form(form),
            RequestOptions::default(),
        )
        .await
    }

    pub async fn patch_form(&self, path: &str, form: FormData) -> ApiResult<ApiResponse> {
        self.request(
            Method::PATCH,
            path,
            RequestBody::Form(form),
            RequestOptions::default(),
        )
        .await
    }

    /// GET + normalized list decode.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<Vec<T>> {
        Ok(self.get_query(path, options).await?.list())
    }

    /// GET + typed decode.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.get(path).await?.json()
    }
}

fn finish(status: StatusCode, url: String, body: Bytes) -> ApiResult<ApiResponse> {
    if status.is_success() {
        return Ok(ApiResponse {
            status: status.as_u16(),
            url,
            body,
        });
    }
    let text = String::from_utf8_lossy(&body);
    let err = ApiError::from_status(status.as_u16(), &text);
    tracing::debug!(%url, status = status.as_u16(), kind = %err.kind, "request failed");
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn test_url_joining() {
        let c = client("http://localhost:8000/api/");
        assert_eq!(c.base_url(), "http://localhost:8000/api");
        assert_eq!(c.url("/users/"), "http://localhost:8000/api/users/");
        assert_eq!(c.url("users/1/"), "http://localhost:8000/api/users/1/");
        assert_eq!(
            c.url("https://cdn.example.com/x"),
            "https://cdn.example.com/x"
        );
    }

    #[test]
    fn test_request_options_builder() {
        let opts = RequestOptions::new()
            .query("status", "OCCUPIED")
            .query("page", 2)
            .query_opt("section", None::<u64>)
            .query_opt("min", Some(4))
            .without_refresh();
        assert_eq!(
            opts.query,
            vec![
                ("status".to_string(), "OCCUPIED".to_string()),
                ("page".to_string(), "2".to_string()),
                ("min".to_string(), "4".to_string()),
            ]
        );
        assert!(opts.skip_refresh);
    }

    #[test]
    fn test_response_helpers_fail_soft() {
        let resp = ApiResponse {
            status: 200,
            url: "u".into(),
            body: Bytes::from_static(b""),
        };
        assert_eq!(resp.value(), Value::Null);
        assert!(resp.list::<u64>().is_empty());
        assert!(resp.json::<Vec<u64>>().is_err());
    }

    #[test]
    fn test_finish_maps_errors() {
        let err = finish(
            StatusCode::NOT_FOUND,
            "u".into(),
            Bytes::from_static(br#"{"detail":"Not found."}"#),
        )
        .unwrap_err();
        assert_eq!(err.status, Some(404));
        assert_eq!(err.message, "Not found.");
    }
}
