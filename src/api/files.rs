//! File endpoints of the file manager.

use serde::Serialize;

use super::scoped;
use crate::core::error::ApiError;
use crate::core::http::{ApiClient, ApiRequest, FormPart, Transport, Upload};
use crate::models::{FileItem, FilePatch};

pub async fn upload<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    folder_id: Option<i64>,
    file: Upload,
) -> Result<FileItem, ApiError> {
    let mut parts = vec![FormPart::file("file", file)];
    if let Some(folder_id) = folder_id {
        parts.push(FormPart::text("folderId", folder_id.to_string()));
    }
    let request = scoped(ApiRequest::post("/api/files/upload"), user_id).multipart(parts);
    client.send(request).await
}

pub async fn update<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    id: i64,
    patch: &FilePatch,
) -> Result<FileItem, ApiError> {
    let request = scoped(ApiRequest::patch(format!("/api/files/{id}")), user_id).json(patch)?;
    client.send(request).await
}

/// Move a file to the recycle bin.
pub async fn delete<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    id: i64,
) -> Result<(), ApiError> {
    client
        .send(scoped(ApiRequest::delete(format!("/api/files/{id}")), user_id))
        .await
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveBody {
    target_folder_id: Option<i64>,
}

pub async fn move_to<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    id: i64,
    target_folder_id: Option<i64>,
) -> Result<FileItem, ApiError> {
    let request = scoped(ApiRequest::post(format!("/api/files/{id}/move")), user_id)
        .json(&MoveBody { target_folder_id })?;
    client.send(request).await
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchBody<'a> {
    file_ids: &'a [i64],
    #[serde(skip_serializing_if = "Option::is_none")]
    target_folder_id: Option<i64>,
}

pub async fn batch_move<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    file_ids: &[i64],
    target_folder_id: Option<i64>,
) -> Result<(), ApiError> {
    let request = scoped(ApiRequest::post("/api/files/batch/move"), user_id).json(&BatchBody {
        file_ids,
        target_folder_id,
    })?;
    client.send(request).await
}

pub async fn batch_delete<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    file_ids: &[i64],
) -> Result<(), ApiError> {
    let request = scoped(ApiRequest::post("/api/files/batch/delete"), user_id).json(&BatchBody {
        file_ids,
        target_folder_id: None,
    })?;
    client.send(request).await
}

/// Raw file bytes.
pub async fn download<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    id: i64,
) -> Result<Vec<u8>, ApiError> {
    client
        .send_binary(scoped(ApiRequest::get(format!("/api/files/{id}/download")), user_id))
        .await
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::http::Body;
    use crate::core::http::mock::MockTransport;

    #[tokio::test]
    async fn test_batch_move_body() {
        let transport = MockTransport::default();
        let client = ApiClient::new(transport.clone(), "http://api.test");
        transport.push_ok(json!(null));

        batch_move(&client, 1, &[4, 5], Some(9)).await.unwrap();

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.url, "http://api.test/api/files/batch/move");
        assert_eq!(sent.body, Body::Json(json!({ "fileIds": [4, 5], "targetFolderId": 9 })));
    }

    #[tokio::test]
    async fn test_download_error_envelope_surfaces() {
        let transport = MockTransport::default();
        let client = ApiClient::new(transport.clone(), "http://api.test");
        transport.push_envelope(404, "File not found", json!(null));

        let err = download(&client, 1, 3).await.unwrap_err();

        assert_eq!(err.to_string(), "File not found");
    }
}
