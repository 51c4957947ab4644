//! Recycle bin listing and actions.

use crate::api;
use crate::config::RECYCLE_PAGE_SIZE;
use crate::core::error::ApiError;
use crate::core::http::{ApiClient, BrowserTransport, Transport};
use crate::core::pagination::{CursorPager, Page};
use crate::models::FileItem;
use crate::stores::auth::AuthStore;
use crate::stores::paged::{PageSource, PagedList};

#[derive(Clone)]
pub struct RecycleSource<T: Transport = BrowserTransport> {
    client: ApiClient<T>,
    auth: AuthStore<T>,
}

impl<T: Transport> PageSource<FileItem> for RecycleSource<T> {
    async fn fetch(&self, cursor: Option<String>) -> Result<Page<FileItem>, ApiError> {
        let user_id = self.auth.user_id()?;
        api::recycle::list(&self.client, user_id, cursor.as_deref(), RECYCLE_PAGE_SIZE).await
    }
}

#[derive(Clone)]
pub struct RecycleBin<T: Transport = BrowserTransport> {
    client: ApiClient<T>,
    auth: AuthStore<T>,
    list: PagedList<FileItem, RecycleSource<T>>,
}

impl<T: Transport> RecycleBin<T> {
    pub fn new(client: ApiClient<T>, auth: AuthStore<T>) -> Self {
        let source = RecycleSource {
            client: client.clone(),
            auth: auth.clone(),
        };
        Self {
            client,
            auth,
            list: PagedList::with_pager(source, CursorPager::new().reset_on_error()),
        }
    }

    pub fn list(&self) -> &PagedList<FileItem, RecycleSource<T>> {
        &self.list
    }

    pub async fn load(&self) -> Result<(), ApiError> {
        self.list.load_first_page().await
    }

    pub async fn load_more(&self) -> Result<(), ApiError> {
        self.list.load_more().await
    }

    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.list.refresh().await
    }

    /// Put a file back where it was, then reload the bin.
    pub async fn restore(&self, id: i64) -> Result<(), ApiError> {
        let user_id = self.auth.user_id()?;
        api::recycle::restore(&self.client, user_id, id).await?;
        tracing::info!(id, "file restored");
        self.list.refresh().await
    }

    /// Delete a file for good, then reload the bin.
    pub async fn purge(&self, id: i64) -> Result<(), ApiError> {
        let user_id = self.auth.user_id()?;
        api::recycle::purge(&self.client, user_id, id).await?;
        tracing::info!(id, "file permanently deleted");
        self.list.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::http::mock::MockTransport;
    use crate::stores::testing::signed_in;

    #[tokio::test]
    async fn test_restore_refreshes_list() {
        let (client, transport, auth) = signed_in();
        let bin = RecycleBin::new(client, auth);

        transport.push_ok(json!({ "files": [{ "id": 1, "name": "a.txt" }, { "id": 2, "name": "b.txt" }], "total": 2 }));
        bin.load().await.unwrap();
        assert_eq!(bin.list().len(), 2);

        transport.push_ok(json!(null));
        transport.push_ok(json!({ "files": [{ "id": 2, "name": "b.txt" }], "total": 1 }));
        bin.restore(1).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[1].url, "http://api.test/api/recycle-bin/1/restore");
        assert_eq!(requests[1].query_value("userId"), Some("1"));
        assert_eq!(bin.list().len(), 1);
        assert_eq!(bin.list().total(), Some(1));
    }

    #[tokio::test]
    async fn test_signed_out_is_rejected_locally() {
        let transport = MockTransport::default();
        let client = ApiClient::new(transport.clone(), "http://api.test");
        let bin = RecycleBin::new(client.clone(), AuthStore::new(client));

        assert_eq!(bin.purge(1).await, Err(ApiError::SignedOut));
        assert_eq!(transport.request_count(), 0);
    }
}
