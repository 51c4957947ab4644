//! Document endpoints.

use serde::Serialize;

use super::scoped;
use crate::core::error::ApiError;
use crate::core::http::{ApiClient, ApiRequest, FormPart, Transport, Upload};
use crate::core::pagination::Page;
use crate::models::{BatchUploadReport, DocSortBy, Document, DocumentPatch, DocumentQuery, SortItem};

/// `GET /api/documents`, one page.
pub async fn list<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    query: &DocumentQuery,
    cursor: Option<&str>,
    limit: u32,
) -> Result<Page<Document>, ApiError> {
    let keyword = query.q.trim();
    let request = scoped(ApiRequest::get("/api/documents"), user_id)
        .query("limit", limit)
        .query_opt("cursor", cursor)
        .query_opt("q", (!keyword.is_empty()).then_some(keyword))
        .query_opt("groupId", query.group_id)
        .query_opt(
            "sortBy",
            (query.sort_by != DocSortBy::Default).then(|| query.sort_by.as_str()),
        )
        .query("order", query.order.as_str());
    client.send(request).await
}

pub async fn get<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    id: i64,
) -> Result<Document, ApiError> {
    client
        .send(scoped(ApiRequest::get(format!("/api/documents/{id}")), user_id))
        .await
}

/// Create a document from an uploaded body (`POST /api/documents`).
pub async fn create<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    title: &str,
    group_id: Option<i64>,
    file: Upload,
) -> Result<Document, ApiError> {
    let mut parts = vec![FormPart::text("title", title), FormPart::file("file", file)];
    if let Some(group_id) = group_id {
        parts.push(FormPart::text("groupId", group_id.to_string()));
    }
    let request = scoped(ApiRequest::post("/api/documents"), user_id).multipart(parts);
    client.send(request).await
}

pub async fn update<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    id: i64,
    patch: &DocumentPatch,
) -> Result<Document, ApiError> {
    let request = scoped(ApiRequest::patch(format!("/api/documents/{id}")), user_id).json(patch)?;
    client.send(request).await
}

/// Replace the stored body (`PUT /api/documents/{id}/file`).
pub async fn replace_file<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    id: i64,
    file: Upload,
) -> Result<Document, ApiError> {
    let request = scoped(ApiRequest::put(format!("/api/documents/{id}/file")), user_id)
        .multipart(vec![FormPart::file("file", file)]);
    client.send(request).await
}

pub async fn delete<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    id: i64,
) -> Result<(), ApiError> {
    client
        .send(scoped(ApiRequest::delete(format!("/api/documents/{id}")), user_id))
        .await
}

/// Import every document in a zip archive into `group_id`.
pub async fn batch_upload<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    group_id: Option<i64>,
    archive: Upload,
) -> Result<BatchUploadReport, ApiError> {
    let mut parts = vec![FormPart::file("file", archive)];
    if let Some(group_id) = group_id {
        parts.push(FormPart::text("groupId", group_id.to_string()));
    }
    let request = scoped(ApiRequest::post("/api/documents/batch-upload"), user_id).multipart(parts);
    client.send(request).await
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
    let request =
        scoped(ApiRequest::post("/api/sort/documents"), user_id).json(&SortBody { items })?;
    client.send(request).await
}

/// Fetch the text body of a document from its storage URL.
pub async fn fetch_content<T: Transport>(
    client: &ApiClient<T>,
    file_url: &str,
) -> Result<String, ApiError> {
    let bytes = client.send_binary(ApiRequest::get(file_url)).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
