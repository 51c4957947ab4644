//! In-memory transport for tests.
//!
//! Responses are queued up front and served in order; every request is
//! recorded so tests can assert on paths, queries and bodies.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use super::{HttpRequest, RawResponse, Transport};
use crate::core::error::TransportError;

#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<Result<RawResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn push_response(&self, response: RawResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Queue `{ code, message, data }` with HTTP 200.
    pub fn push_envelope(&self, code: i64, message: &str, data: Value) {
        let body = json!({ "code": code, "message": message, "data": data, "timestamp": 0 });
        self.push_response(RawResponse {
            status: 200,
            headers: vec![("content-type".into(), "application/json".into())],
            body: body.to_string().into_bytes(),
        });
    }

    /// Queue a successful envelope carrying `data`.
    pub fn push_ok(&self, data: Value) {
        self.push_envelope(200, "success", data);
    }

    /// Queue a bare HTTP status with the given body.
    pub fn push_status(&self, status: u16, body: Vec<u8>) {
        self.push_response(RawResponse {
            status,
            headers: vec![],
            body,
        });
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn pending(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, TransportError> {
        let path = request.url.clone();
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network(format!("no mock response for {path}"))))
    }
}
