//! Browser transport over `fetch` (via `gloo-net`).
//!
//! Timeouts abort the underlying request through an `AbortController`
//! armed by a `gloo-timers` callback; dropping the callback on completion
//! cancels it.

use std::cell::Cell;
use std::rc::Rc;

use gloo_net::http::{Method as FetchMethod, RequestBuilder};
use gloo_timers::callback::Timeout;
use web_sys::{AbortController, FormData, RequestCredentials};

use super::{Body, FormPart, HttpRequest, Method, PartValue, RawResponse, Transport};
use crate::config::FETCH_TIMEOUT_MS;
use crate::core::error::TransportError;
use crate::utils::download::bytes_to_blob;

/// Sends requests with `fetch`, including cookies (`credentials: include`).
#[derive(Clone, Copy, Debug)]
pub struct BrowserTransport {
    timeout_ms: u32,
}

impl Default for BrowserTransport {
    fn default() -> Self {
        Self {
            timeout_ms: FETCH_TIMEOUT_MS,
        }
    }
}

impl Transport for BrowserTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, TransportError> {
        let controller = AbortController::new()
            .map_err(|_| TransportError::Build("AbortController unavailable".to_string()))?;
        let timed_out = Rc::new(Cell::new(false));

        let _timer = {
            let controller = controller.clone();
            let timed_out = timed_out.clone();
            Timeout::new(self.timeout_ms, move || {
                timed_out.set(true);
                controller.abort();
            })
        };

        let signal = controller.signal();
        let mut builder = RequestBuilder::new(&request.url)
            .method(fetch_method(request.method))
            .credentials(RequestCredentials::Include)
            .abort_signal(Some(&signal));

        if !request.query.is_empty() {
            builder = builder.query(request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let built = match request.body {
            Body::Empty => builder.build(),
            Body::Json(value) => builder
                .header("Content-Type", "application/json")
                .body(value.to_string()),
            Body::Multipart(parts) => builder.body(form_data(&parts)?),
        }
        .map_err(|e| TransportError::Build(e.to_string()))?;

        let response = match built.send().await {
            Ok(response) => response,
            Err(_) if timed_out.get() => return Err(TransportError::Timeout),
            Err(e) => return Err(TransportError::Network(e.to_string())),
        };

        let headers = response.headers().entries().collect();
        let status = response.status();
        let body = response.binary().await.map_err(|e| {
            if timed_out.get() {
                TransportError::Timeout
            } else {
                TransportError::Network(e.to_string())
            }
        })?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

fn fetch_method(method: Method) -> FetchMethod {
    match method {
        Method::Get => FetchMethod::GET,
        Method::Post => FetchMethod::POST,
        Method::Put => FetchMethod::PUT,
        Method::Patch => FetchMethod::PATCH,
        Method::Delete => FetchMethod::DELETE,
    }
}

fn form_data(parts: &[FormPart]) -> Result<FormData, TransportError> {
    let build_err = |what: &str| TransportError::Build(format!("multipart {what}"));
    let form = FormData::new().map_err(|_| build_err("form"))?;

    for part in parts {
        match &part.value {
            PartValue::Text(text) => form
                .append_with_str(&part.name, text)
                .map_err(|_| build_err("field"))?,
            PartValue::File(upload) => {
                let blob = bytes_to_blob(&upload.bytes, &upload.mime)
                    .map_err(|_| build_err("blob"))?;
                form.append_with_blob_and_filename(&part.name, &blob, &upload.file_name)
                    .map_err(|_| build_err("file"))?
            }
        }
    }

    Ok(form)
}
