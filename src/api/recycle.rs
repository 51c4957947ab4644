//! Recycle bin endpoints.

use serde::Deserialize;

use super::scoped;
use crate::core::error::ApiError;
use crate::core::http::{ApiClient, ApiRequest, Transport};
use crate::core::pagination::{Page, PageInfo};
use crate::models::FileItem;

/// The recycle bin answers either with a regular page or with a flat
/// `{files, total}` object.
#[derive(Deserialize)]
struct RecycleListing {
    #[serde(default, alias = "files")]
    items: Vec<FileItem>,
    #[serde(default)]
    pagination: Option<PageInfo>,
    #[serde(default)]
    total: Option<u64>,
}

impl From<RecycleListing> for Page<FileItem> {
    fn from(listing: RecycleListing) -> Self {
        let mut pagination = listing.pagination.unwrap_or_default();
        if pagination.total.is_none() {
            pagination.total = listing.total;
        }
        Page {
            items: listing.items,
            pagination,
        }
    }
}

pub async fn list<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    cursor: Option<&str>,
    limit: u32,
) -> Result<Page<FileItem>, ApiError> {
    let request = scoped(ApiRequest::get("/api/recycle-bin"), user_id)
        .query("limit", limit)
        .query_opt("cursor", cursor);
    let listing: RecycleListing = client.send(request).await?;
    Ok(listing.into())
}

pub async fn restore<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    id: i64,
) -> Result<(), ApiError> {
    client
        .send(scoped(ApiRequest::post(format!("/api/recycle-bin/{id}/restore")), user_id))
        .await
}

/// Delete a recycled file for good.
pub async fn purge<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    id: i64,
) -> Result<(), ApiError> {
    client
        .send(scoped(ApiRequest::delete(format!("/api/recycle-bin/{id}")), user_id))
        .await
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::http::mock::MockTransport;

    #[tokio::test]
    async fn test_flat_listing_shape() {
        let transport = MockTransport::default();
        let client = ApiClient::new(transport.clone(), "http://api.test");
        transport.push_ok(json!({
            "files": [{ "id": 1, "fileName": "a.txt", "daysUntilPermanentDeletion": 5 }],
            "total": 1
        }));

        let page = list(&client, 1, None, 50).await.unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.pagination.total, Some(1));
        assert!(!page.pagination.has_more);
    }
}
