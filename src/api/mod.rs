//! Typed REST endpoints.
//!
//! Each function describes one endpoint as an [`ApiRequest`] and sends it
//! through the shared [`ApiClient`]. Endpoints that read or write user data
//! take the signed-in user's id, sent as the `userId` query parameter.

pub mod auth;
pub mod documents;
pub mod files;
pub mod folders;
pub mod groups;
pub mod recycle;

use crate::core::error::ApiError;
use crate::core::http::{ApiClient, ApiRequest, Transport};

const USER_ID: &str = "userId";

/// Scope a request to `user_id`.
pub(crate) fn scoped(request: ApiRequest, user_id: i64) -> ApiRequest {
    request.query(USER_ID, user_id)
}

/// Drop server-side caches (`POST /api/cache/clear`).
pub async fn clear_server_cache<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
) -> Result<(), ApiError> {
    client
        .send(scoped(ApiRequest::post("/api/cache/clear"), user_id))
        .await
}
