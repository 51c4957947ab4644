//! Response envelope decoding.
//!
//! The server wraps every JSON payload as `{ code, message, data, timestamp }`.
//! HTTP-level failures that still carry an envelope report the envelope code,
//! otherwise the HTTP status is mapped directly.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::RawResponse;
use crate::core::error::{ApiError, CODE_GONE, CODE_OK, CODE_UNAUTHORIZED};

#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
}

/// Decode a JSON response and return its `data` as `R`.
pub fn decode_envelope<R: DeserializeOwned>(response: &RawResponse) -> Result<R, ApiError> {
    if !response.is_success() {
        return Err(status_error(response));
    }

    let envelope: Envelope = serde_json::from_slice(&response.body)?;
    if envelope.code != CODE_OK {
        return Err(ApiError::from_code(envelope.code, envelope.message));
    }

    Ok(serde_json::from_value(envelope.data)?)
}

/// Return the body bytes of a binary response.
///
/// A JSON body that parses as a failing envelope is reported as an error;
/// anything else is passed through unmodified.
pub fn decode_binary(response: &RawResponse) -> Result<Vec<u8>, ApiError> {
    if !response.is_success() {
        return Err(status_error(response));
    }

    if response.is_json()
        && let Ok(envelope) = serde_json::from_slice::<Envelope>(&response.body)
        && envelope.code != CODE_OK
    {
        return Err(ApiError::from_code(envelope.code, envelope.message));
    }

    Ok(response.body.clone())
}

fn status_error(response: &RawResponse) -> ApiError {
    if let Ok(envelope) = serde_json::from_slice::<Envelope>(&response.body)
        && envelope.code != CODE_OK
    {
        return ApiError::from_code(envelope.code, envelope.message);
    }

    match i64::from(response.status) {
        CODE_UNAUTHORIZED => ApiError::Unauthorized,
        CODE_GONE => ApiError::CursorExpired,
        _ => ApiError::Http(response.status),
    }
}
