//! HTTP client layer shared by every API module.
//!
//! [`ApiClient`] owns the request pipeline:
//!
//! 1. Resolve the path against the configured base URL
//! 2. Inject `Authorization: Bearer <token>` from the [`SessionToken`]
//! 3. Hand the request to a [`Transport`] (browser fetch or an in-memory mock)
//! 4. Apply token rotation from the `x-new-token` response header
//! 5. Unwrap the `{code, message, data}` envelope (or pass binary bodies through)
//! 6. Trip the one-shot [`UnauthorizedGate`] on 401 and notify the registered handler
//!
//! The transport is a generic parameter rather than a trait object so that
//! wasm futures (which are `!Send`) need no boxing.

mod browser;
mod envelope;
mod gate;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

use std::future::Future;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{ROTATED_TOKEN_HEADER, UNAUTHORIZED_RESET_MS};
use crate::core::error::{ApiError, TransportError};
use crate::core::session::SessionToken;
use crate::utils::time::now_ms;

pub use browser::BrowserTransport;
pub use envelope::{decode_binary, decode_envelope};
pub use gate::UnauthorizedGate;

// =============================================================================
// Request / Response Types
// =============================================================================

/// HTTP method subset used by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// A file attached to a multipart body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Value of a single multipart field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File(Upload),
}

/// A named multipart field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub value: PartValue,
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: PartValue::Text(value.into()),
        }
    }

    pub fn file(name: impl Into<String>, upload: Upload) -> Self {
        Self {
            name: name.into(),
            value: PartValue::File(upload),
        }
    }
}

/// Request body.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

/// A request as described by an API function (relative path, no auth).
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Body,
    /// Return the raw body instead of unwrapping an envelope.
    pub binary: bool,
    /// Never trip the 401 gate (login, whoami, refresh).
    pub silent_auth: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: Body::Empty,
            binary: false,
            silent_auth: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a query parameter only when a value is present.
    pub fn query_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Body::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = Body::Multipart(parts);
        self
    }

    pub fn expect_binary(mut self) -> Self {
        self.binary = true;
        self
    }

    pub fn silent_auth(mut self) -> Self {
        self.silent_auth = true;
        self
    }

    /// Value of the first query parameter named `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A fully resolved request handed to the transport.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl HttpRequest {
    /// Value of a request header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A response as received from the transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Value of a response header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.header("content-type")
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
    }
}

/// Sends resolved requests. Implemented by [`BrowserTransport`] and, in tests,
/// by `mock::MockTransport`.
pub trait Transport: Clone + 'static {
    fn send(&self, request: HttpRequest)
    -> impl Future<Output = Result<RawResponse, TransportError>>;
}

// =============================================================================
// ApiClient
// =============================================================================

/// Callback run when the 401 gate trips.
pub type UnauthorizedHandler = Arc<dyn Fn() + Send + Sync>;

/// Shared REST client. Cheap to clone; clones share session and gate state.
#[derive(Clone)]
pub struct ApiClient<T> {
    transport: T,
    base_url: Arc<str>,
    session: SessionToken,
    gate: UnauthorizedGate,
    on_unauthorized: Arc<RwLock<Option<UnauthorizedHandler>>>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, base_url: &str) -> Self {
        Self {
            transport,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            session: SessionToken::default(),
            gate: UnauthorizedGate::new(UNAUTHORIZED_RESET_MS),
            on_unauthorized: Arc::new(RwLock::new(None)),
        }
    }

    /// The session token shared by all clones of this client.
    pub fn session(&self) -> &SessionToken {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Register the callback run when a 401 trips the gate.
    pub fn set_unauthorized_handler(&self, handler: impl Fn() + Send + Sync + 'static) {
        let mut slot = self
            .on_unauthorized
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(Arc::new(handler));
    }

    /// Absolute URL for an API path. Absolute URLs pass through unchanged.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send a request and unwrap the envelope's `data` into `R`.
    ///
    /// Use `R = ()` for endpoints that return `data: null`.
    pub async fn send<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        let silent = request.silent_auth;
        let response = self.dispatch(request).await?;
        let result = decode_envelope(&response);
        self.observe(result, silent)
    }

    /// Send a request and return the raw body bytes on success.
    pub async fn send_binary(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
        let silent = request.silent_auth;
        let response = self.dispatch(request.expect_binary()).await?;
        let result = decode_binary(&response);
        self.observe(result, silent)
    }

    async fn dispatch(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let mut headers = Vec::new();
        if let Some(token) = self.session.get() {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        let http = HttpRequest {
            method: request.method,
            url: self.url_for(&request.path),
            query: request.query,
            headers,
            body: request.body,
        };

        tracing::debug!(method = ?http.method, url = %http.url, "request");

        let response = self.transport.send(http).await.map_err(|err| {
            tracing::error!(error = %err, "request failed before a response arrived");
            ApiError::from(err)
        })?;

        if let Some(rotated) = response.header(ROTATED_TOKEN_HEADER)
            && self.session.rotate(rotated)
        {
            tracing::info!("access token rotated by server");
        }

        Ok(response)
    }

    fn observe<R>(&self, result: Result<R, ApiError>, silent: bool) -> Result<R, ApiError> {
        if let Err(ApiError::Unauthorized) = &result
            && !silent
        {
            self.handle_unauthorized();
        }
        result
    }

    fn handle_unauthorized(&self) {
        if !self.gate.try_trip(now_ms()) {
            tracing::debug!("401 already being handled");
            return;
        }

        tracing::warn!("access token expired or invalid, signing out");
        self.session.set(None);

        let handler = self
            .on_unauthorized
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        if let Some(handler) = handler {
            handler();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde::Deserialize;
    use serde_json::json;

    use super::mock::MockTransport;
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Greeting {
        text: String,
    }

    fn client() -> (ApiClient<MockTransport>, MockTransport) {
        let transport = MockTransport::default();
        (ApiClient::new(transport.clone(), "http://api.test/"), transport)
    }

    #[test]
    fn test_url_for() {
        let (client, _) = client();
        assert_eq!(client.url_for("/api/documents"), "http://api.test/api/documents");
        assert_eq!(client.url_for("api/documents"), "http://api.test/api/documents");
        assert_eq!(
            client.url_for("https://cdn.test/a.md"),
            "https://cdn.test/a.md"
        );
    }

    #[tokio::test]
    async fn test_injects_bearer_token() {
        let (client, transport) = client();
        client.session().set(Some("tok-1".to_string()));
        transport.push_ok(json!({ "text": "hi" }));

        let greeting: Greeting = client.send(ApiRequest::get("/api/hello")).await.unwrap();

        assert_eq!(greeting.text, "hi");
        let sent = transport.last_request().unwrap();
        assert_eq!(sent.header("authorization"), Some("Bearer tok-1"));
        assert_eq!(sent.url, "http://api.test/api/hello");
    }

    #[tokio::test]
    async fn test_no_token_no_header() {
        let (client, transport) = client();
        transport.push_ok(json!(null));

        let () = client.send(ApiRequest::post("/api/ping")).await.unwrap();

        assert_eq!(transport.last_request().unwrap().header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_business_error_surfaces_message() {
        let (client, transport) = client();
        transport.push_envelope(4002, "Group name taken", json!(null));

        let err = client
            .send::<()>(ApiRequest::post("/api/groups"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Group name taken");
    }

    #[tokio::test]
    async fn test_unauthorized_trips_gate_once() {
        let (client, transport) = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        client.set_unauthorized_handler(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        client.session().set(Some("stale".to_string()));

        transport.push_envelope(401, "expired", json!(null));
        transport.push_envelope(401, "expired", json!(null));

        let first = client.send::<()>(ApiRequest::get("/api/a")).await;
        let second = client.send::<()>(ApiRequest::get("/api/b")).await;

        assert_eq!(first, Err(ApiError::Unauthorized));
        assert_eq!(second, Err(ApiError::Unauthorized));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.session().get(), None);
    }

    #[tokio::test]
    async fn test_silent_auth_skips_gate() {
        let (client, transport) = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        client.set_unauthorized_handler(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        transport.push_status(401, b"".to_vec());
        let result = client
            .send::<()>(ApiRequest::get("/api/auth/me").silent_auth())
            .await;

        assert_eq!(result, Err(ApiError::Unauthorized));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_token_rotation_header() {
        let (client, transport) = client();
        client.session().set(Some("old".to_string()));
        transport.push_response(RawResponse {
            status: 200,
            headers: vec![
                ("Content-Type".into(), "application/json".into()),
                ("X-New-Token".into(), "fresh".into()),
            ],
            body: json!({ "code": 200, "message": "ok", "data": null })
                .to_string()
                .into_bytes(),
        });

        let () = client.send(ApiRequest::get("/api/x")).await.unwrap();

        assert_eq!(client.session().get().as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_rotation_ignored_when_signed_out() {
        let (client, transport) = client();
        transport.push_response(RawResponse {
            status: 200,
            headers: vec![("x-new-token".into(), "fresh".into())],
            body: br#"{"code":200,"data":null}"#.to_vec(),
        });

        let () = client.send(ApiRequest::get("/api/x")).await.unwrap();

        assert_eq!(client.session().get(), None);
    }

    #[tokio::test]
    async fn test_binary_passthrough() {
        let (client, transport) = client();
        transport.push_response(RawResponse {
            status: 200,
            headers: vec![("content-type".into(), "application/pdf".into())],
            body: vec![0x25, 0x50, 0x44, 0x46],
        });

        let bytes = client
            .send_binary(ApiRequest::get("/api/files/3/download"))
            .await
            .unwrap();

        assert_eq!(bytes, vec![0x25, 0x50, 0x44, 0x46]);
    }

    #[tokio::test]
    async fn test_network_failure() {
        let (client, transport) = client();
        transport.push_error(TransportError::Network("offline".into()));

        let err = client
            .send::<()>(ApiRequest::get("/api/x"))
            .await
            .unwrap_err();

        assert_eq!(err, ApiError::Network("offline".into()));
    }

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::get("/api/documents")
            .query("limit", 20)
            .query_opt("cursor", None::<String>)
            .query_opt("q", Some("rust"));
        assert_eq!(request.query_value("limit"), Some("20"));
        assert_eq!(request.query_value("cursor"), None);
        assert_eq!(request.query_value("q"), Some("rust"));
    }
}
