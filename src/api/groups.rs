//! Group and directory tree endpoints.

use serde::Serialize;

use super::scoped;
use crate::core::error::ApiError;
use crate::core::http::{ApiClient, ApiRequest, Transport};
use crate::core::tree::TreeSnapshot;
use crate::models::{Group, GroupPayload, SortItem};

/// The whole group/document tree.
pub async fn directory_tree<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
) -> Result<TreeSnapshot, ApiError> {
    client
        .send(scoped(ApiRequest::get("/api/directory-tree"), user_id))
        .await
}

pub async fn create<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    payload: &GroupPayload,
) -> Result<Group, ApiError> {
    let request = scoped(ApiRequest::post("/api/groups"), user_id).json(payload)?;
    client.send(request).await
}

pub async fn update<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    id: i64,
    payload: &GroupPayload,
) -> Result<Group, ApiError> {
    let request = scoped(ApiRequest::patch(format!("/api/groups/{id}")), user_id).json(payload)?;
    client.send(request).await
}

pub async fn delete<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    id: i64,
) -> Result<(), ApiError> {
    client
        .send(scoped(ApiRequest::delete(format!("/api/groups/{id}")), user_id))
        .await
}

#[derive(Serialize)]
struct SortBody<'a> {
    items: &'a [SortItem],
}

pub async fn sort<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    items: &[SortItem],
) -> Result<(), ApiError> {
    let request = scoped(ApiRequest::post("/api/sort/groups"), user_id).json(&SortBody { items })?;
    client.send(request).await
}
