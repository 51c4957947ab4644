//! Folder endpoints of the file manager.

use serde::Serialize;

use super::scoped;
use crate::core::error::ApiError;
use crate::core::folder_cache::{FolderKey, FolderTicket};
use crate::core::http::{ApiClient, ApiRequest, Transport};
use crate::core::pagination::Page;
use crate::models::{FolderChild, FolderItem, FolderPath, FolderPayload, RootFolder, SortItem};

fn folder_segment(key: FolderKey) -> String {
    match key {
        FolderKey::Root => "root".to_string(),
        FolderKey::Folder(id) => id.to_string(),
    }
}

pub async fn root<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
) -> Result<RootFolder, ApiError> {
    client
        .send(scoped(ApiRequest::get("/api/folders/root"), user_id))
        .await
}

/// One page of a folder listing, or of a search inside it when the
/// ticket's query carries a keyword.
pub async fn children<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    ticket: &FolderTicket,
    limit: u32,
) -> Result<Page<FolderChild>, ApiError> {
    let folder = folder_segment(ticket.key);
    let query = &ticket.query;
    let request = if query.is_search() {
        ApiRequest::get(format!("/api/folders/{folder}/search")).query("keyword", &query.keyword)
    } else {
        ApiRequest::get(format!("/api/folders/{folder}/children"))
    };
    let request = scoped(request, user_id)
        .query("limit", limit)
        .query_opt("cursor", ticket.cursor.as_deref())
        .query("sortBy", &query.sort_field)
        .query("order", query.order.as_str());
    client.send(request).await
}

/// Breadcrumb from the root to `id`.
pub async fn path<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    id: i64,
) -> Result<FolderPath, ApiError> {
    client
        .send(scoped(ApiRequest::get(format!("/api/folders/{id}/path")), user_id))
        .await
}

pub async fn create<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    payload: &FolderPayload,
) -> Result<FolderItem, ApiError> {
    let request = scoped(ApiRequest::post("/api/folders"), user_id).json(payload)?;
    client.send(request).await
}

pub async fn update<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    id: i64,
    payload: &FolderPayload,
) -> Result<FolderItem, ApiError> {
    let request = scoped(ApiRequest::patch(format!("/api/folders/{id}")), user_id).json(payload)?;
    client.send(request).await
}

/// Delete a folder. Without `recursive` the server refuses non-empty folders.
pub async fn delete<T: Transport>(
    client: &ApiClient<T>,
    user_id: i64,
    id: i64,
    recursive: bool,
) -> Result<(), ApiError> {
    let request = scoped(ApiRequest::delete(format!("/api/folders/{id}")), user_id)
        .query("recursive", recursive);
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
    let request = scoped(ApiRequest::post("/api/folders/sort"), user_id).json(&SortBody { items })?;
    client.send(request).await
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::folder_cache::{FetchPlan, FolderCache, FolderQuery};
    use crate::core::http::mock::MockTransport;

    fn ticket(key: FolderKey, query: FolderQuery) -> FolderTicket {
        let mut cache = FolderCache::<FolderChild>::new();
        match cache.plan_fetch(key, query, false) {
            FetchPlan::Fetch(ticket) => ticket,
            other => panic!("unexpected plan {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_root_children_path() {
        let transport = MockTransport::default();
        let client = ApiClient::new(transport.clone(), "http://api.test");
        transport.push_ok(json!({ "items": [] }));

        children(&client, 2, &ticket(FolderKey::Root, FolderQuery::default()), 50)
            .await
            .unwrap();

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.url, "http://api.test/api/folders/root/children");
        assert_eq!(sent.query_value("sortBy"), Some("name"));
        assert_eq!(sent.query_value("order"), Some("asc"));
        assert_eq!(sent.query_value("cursor"), None);
    }

    #[tokio::test]
    async fn test_search_uses_search_endpoint() {
        let transport = MockTransport::default();
        let client = ApiClient::new(transport.clone(), "http://api.test");
        transport.push_ok(json!({ "items": [] }));
        let query = FolderQuery::default().with_keyword(" report ");

        children(&client, 2, &ticket(FolderKey::Folder(8), query), 50)
            .await
            .unwrap();

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.url, "http://api.test/api/folders/8/search");
        assert_eq!(sent.query_value("keyword"), Some("report"));
    }
}
