//! File manager: per-folder listings, breadcrumbs, selection and file
//! operations.
//!
//! Listings live in a [`FolderCache`]; revisiting a folder renders from
//! cache while mutations evict the affected entries and refetch.

use std::collections::BTreeSet;

use leptos::prelude::*;

use crate::api;
use crate::config::{FOLDER_PAGE_SIZE, MAX_ATTACHMENT_SIZE, MAX_IMAGE_SIZE};
use crate::core::error::ApiError;
use crate::core::folder_cache::{FetchPlan, FolderCache, FolderKey, FolderQuery, FolderTicket};
use crate::core::http::{ApiClient, BrowserTransport, Transport, Upload};
use crate::core::pagination::{Completion, Keyed, ResourceState, SortOrder};
use crate::models::{
    ChildKey, FileItem, FilePatch, FolderChild, FolderPayload, PathSegment, RootFolder, SortItem,
    ViewLayout,
};
use crate::stores::auth::AuthStore;
use crate::utils::file_types::is_image;
use crate::utils::format::format_size;
use crate::utils::time::now_ms;

#[derive(Clone)]
pub struct FileStore<T: Transport = BrowserTransport> {
    client: ApiClient<T>,
    auth: AuthStore<T>,
    cache: RwSignal<FolderCache<FolderChild>>,
    pub current: RwSignal<FolderKey>,
    pub query: RwSignal<FolderQuery>,
    pub path: RwSignal<Vec<PathSegment>>,
    pub root: RwSignal<Option<RootFolder>>,
    pub selection: RwSignal<BTreeSet<ChildKey>>,
    /// Item shown in the detail panel.
    pub detail: RwSignal<Option<ChildKey>>,
    pub layout: RwSignal<ViewLayout>,
}

impl<T: Transport> FileStore<T> {
    pub fn new(client: ApiClient<T>, auth: AuthStore<T>) -> Self {
        Self {
            client,
            auth,
            cache: RwSignal::new(FolderCache::new()),
            current: RwSignal::new(FolderKey::Root),
            query: RwSignal::new(FolderQuery::default()),
            path: RwSignal::new(Vec::new()),
            root: RwSignal::new(None),
            selection: RwSignal::new(BTreeSet::new()),
            detail: RwSignal::new(None),
            layout: RwSignal::new(ViewLayout::default()),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Items of the current folder.
    pub fn items(&self) -> Vec<FolderChild> {
        let key = self.current.get();
        self.cache.with(|cache| cache.items(key))
    }

    pub fn state(&self) -> ResourceState {
        let key = self.current.get();
        self.cache
            .with(|cache| cache.get(key).map_or(ResourceState::Idle, |entry| entry.state()))
    }

    pub fn error(&self) -> Option<ApiError> {
        let key = self.current.get();
        self.cache
            .with(|cache| cache.get(key).and_then(|entry| entry.error().cloned()))
    }

    pub fn has_more(&self) -> bool {
        let key = self.current.get();
        self.cache.with(|cache| {
            cache
                .get(key)
                .is_some_and(|entry| entry.has_more() && entry.cursor().is_some())
        })
    }

    pub fn total(&self) -> Option<u64> {
        let key = self.current.get();
        self.cache.with(|cache| cache.get(key).and_then(|entry| entry.total()))
    }

    pub fn find(&self, key: ChildKey) -> Option<FolderChild> {
        let folder = self.current.get();
        self.cache.with(|cache| {
            cache
                .get(folder)
                .and_then(|entry| entry.items().iter().find(|item| item.key() == key).cloned())
        })
    }

    // =========================================================================
    // Navigation and loading
    // =========================================================================

    /// Show `key`, from cache when possible. A search keyword does not
    /// carry over into another folder.
    pub async fn open_folder(&self, key: FolderKey) -> Result<(), ApiError> {
        if self.current.get_untracked() != key {
            self.current.set(key);
            self.query.update(|query| query.keyword.clear());
            self.clear_selection();
            self.detail.set(None);
        }
        let listing = self.load(false).await;
        let path = self.load_path(key).await;
        listing.and(path)
    }

    async fn load_path(&self, key: FolderKey) -> Result<(), ApiError> {
        let segments = match key {
            FolderKey::Root => Vec::new(),
            FolderKey::Folder(id) => {
                let user_id = self.auth.user_id()?;
                api::folders::path(&self.client, user_id, id).await?.path
            }
        };
        if self.current.get_untracked() == key {
            self.path.set(segments);
        }
        Ok(())
    }

    pub async fn load_root(&self) -> Result<(), ApiError> {
        let user_id = self.auth.user_id()?;
        let root = api::folders::root(&self.client, user_id).await?;
        self.root.set(Some(root));
        Ok(())
    }

    /// Load the current folder's first page. `force` skips the cache.
    pub async fn load(&self, force: bool) -> Result<(), ApiError> {
        let key = self.current.get_untracked();
        let query = self.query.get_untracked();
        let plan = self
            .cache
            .try_update(|cache| cache.plan_fetch(key, query, force))
            .unwrap_or(FetchPlan::InFlight);
        match plan {
            FetchPlan::Fetch(ticket) => self.run(ticket).await,
            FetchPlan::Cached | FetchPlan::InFlight => Ok(()),
        }
    }

    pub async fn load_more(&self) -> Result<(), ApiError> {
        let key = self.current.get_untracked();
        match self.cache.try_update(|cache| cache.plan_more(key)).flatten() {
            Some(ticket) => self.run(ticket).await,
            None => Ok(()),
        }
    }

    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.load(true).await
    }

    async fn run(&self, ticket: FolderTicket) -> Result<(), ApiError> {
        let result = match self.auth.user_id() {
            Ok(user_id) => {
                api::folders::children(&self.client, user_id, &ticket, FOLDER_PAGE_SIZE).await
            }
            Err(err) => Err(err),
        };
        let completion = self
            .cache
            .try_update(|cache| cache.complete(&ticket, result, now_ms()))
            .unwrap_or(Completion::Stale);
        completion.into_result().inspect_err(|err| {
            tracing::error!(key = ?ticket.key, error = %err, "failed to load folder");
        })
    }

    /// Search inside the current folder; a blank keyword restores the
    /// plain listing.
    pub async fn search(&self, keyword: &str) -> Result<(), ApiError> {
        let query = self.query.get_untracked().with_keyword(keyword);
        self.query.set(query);
        self.clear_selection();
        self.load(false).await
    }

    pub async fn sort(&self, field: &str, order: SortOrder) -> Result<(), ApiError> {
        self.query.update(|query| {
            query.sort_field = field.to_string();
            query.order = order;
        });
        self.load(false).await
    }

    /// Drop the current entry and refetch it.
    async fn reload_current(&self) -> Result<(), ApiError> {
        let key = self.current.get_untracked();
        self.cache.update(|cache| cache.evict(key));
        self.load(true).await
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn is_selected(&self, key: ChildKey) -> bool {
        self.selection.with(|set| set.contains(&key))
    }

    pub fn toggle_select(&self, key: ChildKey) {
        self.selection.update(|set| {
            if !set.remove(&key) {
                set.insert(key);
            }
        });
    }

    pub fn select_all(&self) {
        let keys: BTreeSet<ChildKey> = self
            .items_untracked()
            .iter()
            .map(|item| item.key())
            .collect();
        self.selection.set(keys);
    }

    pub fn clear_selection(&self) {
        self.selection.update(BTreeSet::clear);
    }

    /// Ids of the selected files (folders are not batch targets).
    pub fn selected_file_ids(&self) -> Vec<i64> {
        self.selection.with(|set| {
            set.iter()
                .filter_map(|key| match key {
                    ChildKey::File(id) => Some(*id),
                    ChildKey::Folder(_) => None,
                })
                .collect()
        })
    }

    fn items_untracked(&self) -> Vec<FolderChild> {
        let key = self.current.get_untracked();
        self.cache.with_untracked(|cache| cache.items(key))
    }

    // =========================================================================
    // Folders
    // =========================================================================

    pub async fn create_folder(&self, name: &str) -> Result<(), ApiError> {
        let name = require_name(name)?;
        let user_id = self.auth.user_id()?;
        let parent = self.current.get_untracked();
        let payload = FolderPayload {
            name: Some(name),
            parent_id: parent.id(),
            ..FolderPayload::default()
        };
        api::folders::create(&self.client, user_id, &payload).await?;
        self.reload_current().await
    }

    pub async fn rename_folder(&self, id: i64, name: &str) -> Result<(), ApiError> {
        let name = require_name(name)?;
        let user_id = self.auth.user_id()?;
        let payload = FolderPayload {
            name: Some(name.clone()),
            ..FolderPayload::default()
        };
        let updated = api::folders::update(&self.client, user_id, id, &payload).await?;
        self.cache.update(|cache| {
            cache.patch_item(&ChildKey::Folder(id), |item| {
                if let FolderChild::Folder(folder) = item {
                    folder.name = updated.name.clone();
                }
            });
        });
        self.path.update(|path| {
            for segment in path.iter_mut().filter(|s| s.id == id) {
                segment.name = name.clone();
            }
        });
        Ok(())
    }

    /// Delete a folder. Returns where to navigate when the deleted folder
    /// was the one being shown.
    pub async fn delete_folder(
        &self,
        id: i64,
        recursive: bool,
    ) -> Result<Option<FolderKey>, ApiError> {
        let user_id = self.auth.user_id()?;
        api::folders::delete(&self.client, user_id, id, recursive).await?;
        self.cache.update(|cache| cache.evict(FolderKey::Folder(id)));
        self.selection.update(|set| {
            set.remove(&ChildKey::Folder(id));
        });

        if self.current.get_untracked() == FolderKey::Folder(id) {
            let parent = self.path.with_untracked(|path| {
                path.iter()
                    .rev()
                    .nth(1)
                    .map_or(FolderKey::Root, |segment| FolderKey::Folder(segment.id))
            });
            tracing::info!(id, ?parent, "current folder deleted");
            return Ok(Some(parent));
        }

        self.reload_current().await?;
        Ok(None)
    }

    /// Move a subfolder of the current folder `offset` places among the
    /// loaded subfolders and persist the order.
    pub async fn shift_folder(&self, id: i64, offset: isize) -> Result<(), ApiError> {
        let mut ids: Vec<i64> = self
            .items_untracked()
            .iter()
            .filter_map(|item| item.as_folder().map(|folder| folder.id))
            .collect();
        let Some(from) = ids.iter().position(|&folder| folder == id) else {
            return Ok(());
        };
        let Some(to) = from
            .checked_add_signed(offset)
            .filter(|&to| to < ids.len() && to != from)
        else {
            return Ok(());
        };
        let moved = ids.remove(from);
        ids.insert(to, moved);

        let user_id = self.auth.user_id()?;
        let parent_id = self.current.get_untracked().id();
        let items: Vec<SortItem> = ids
            .into_iter()
            .zip(0..)
            .map(|(id, sort_index)| SortItem {
                id,
                parent_id,
                group_id: None,
                sort_index,
            })
            .collect();
        api::folders::sort(&self.client, user_id, &items).await?;
        self.reload_current().await
    }

    // =========================================================================
    // Files
    // =========================================================================

    /// Upload files into the current folder. Every file is attempted; the
    /// first failure is returned after the folder is refreshed.
    pub async fn upload(&self, uploads: Vec<Upload>) -> Result<usize, ApiError> {
        let user_id = self.auth.user_id()?;
        let folder = self.current.get_untracked().id();
        let mut uploaded = 0;
        let mut first_error = None;

        for upload in uploads {
            let name = upload.file_name.clone();
            let result = match check_upload_size(&upload) {
                Ok(()) => api::files::upload(&self.client, user_id, folder, upload).await.map(drop),
                Err(err) => Err(err),
            };
            match result {
                Ok(()) => uploaded += 1,
                Err(err) => {
                    tracing::error!(file = %name, error = %err, "upload failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        if uploaded > 0 {
            self.reload_current().await?;
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(uploaded),
        }
    }

    pub async fn rename_file(&self, id: i64, name: &str) -> Result<(), ApiError> {
        let name = require_name(name)?;
        let user_id = self.auth.user_id()?;
        let patch = FilePatch {
            name: Some(name),
            description: None,
        };
        let updated = api::files::update(&self.client, user_id, id, &patch).await?;
        self.patch_file(updated);
        Ok(())
    }

    pub async fn describe_file(&self, id: i64, description: &str) -> Result<(), ApiError> {
        let user_id = self.auth.user_id()?;
        let patch = FilePatch {
            name: None,
            description: Some(description.trim().to_string()),
        };
        let updated = api::files::update(&self.client, user_id, id, &patch).await?;
        self.patch_file(updated);
        Ok(())
    }

    /// Replace every cached copy of a file.
    fn patch_file(&self, updated: FileItem) {
        self.cache.update(|cache| {
            cache.patch_item(&ChildKey::File(updated.id), |item| {
                *item = FolderChild::File(updated.clone());
            });
        });
    }

    /// Move one file to the recycle bin.
    pub async fn delete_file(&self, id: i64) -> Result<(), ApiError> {
        let user_id = self.auth.user_id()?;
        api::files::delete(&self.client, user_id, id).await?;
        self.forget(&[ChildKey::File(id)]);
        self.reload_current().await
    }

    pub async fn delete_files(&self, ids: &[i64]) -> Result<(), ApiError> {
        if ids.is_empty() {
            return Ok(());
        }
        let user_id = self.auth.user_id()?;
        api::files::batch_delete(&self.client, user_id, ids).await?;
        let keys: Vec<ChildKey> = ids.iter().copied().map(ChildKey::File).collect();
        self.forget(&keys);
        self.reload_current().await
    }

    /// Move files into `target` (root when `None`).
    pub async fn move_files(&self, ids: &[i64], target: Option<i64>) -> Result<(), ApiError> {
        let user_id = self.auth.user_id()?;
        match ids {
            [] => return Ok(()),
            [id] => {
                api::files::move_to(&self.client, user_id, *id, target).await?;
            }
            _ => api::files::batch_move(&self.client, user_id, ids, target).await?,
        }
        let keys: Vec<ChildKey> = ids.iter().copied().map(ChildKey::File).collect();
        self.forget(&keys);
        self.cache
            .update(|cache| cache.evict(FolderKey::from_id(target)));
        self.reload_current().await
    }

    /// Fetch a file's bytes.
    pub async fn download(&self, id: i64) -> Result<Vec<u8>, ApiError> {
        let user_id = self.auth.user_id()?;
        api::files::download(&self.client, user_id, id).await
    }

    fn forget(&self, keys: &[ChildKey]) {
        self.selection.update(|set| {
            for key in keys {
                set.remove(key);
            }
        });
        self.detail.update(|detail| {
            if detail.is_some_and(|key| keys.contains(&key)) {
                *detail = None;
            }
        });
    }

    /// Drop every listing of a signed-out user.
    pub fn reset(&self) {
        self.cache.update(|cache| cache.clear());
        self.current.set(FolderKey::Root);
        self.query.set(FolderQuery::default());
        self.path.set(Vec::new());
        self.root.set(None);
        self.clear_selection();
        self.detail.set(None);
    }

    /// Drop every cached listing here and on the server, then reload.
    pub async fn clear_cache(&self) -> Result<(), ApiError> {
        self.cache.update(|cache| cache.clear());
        let user_id = self.auth.user_id()?;
        api::clear_server_cache(&self.client, user_id).await?;
        tracing::info!("caches cleared");
        self.load(true).await
    }
}

fn require_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::InvalidInput("Name cannot be empty".to_string()));
    }
    if name.contains(['/', '\\']) {
        return Err(ApiError::InvalidInput("Name cannot contain slashes".to_string()));
    }
    Ok(name.to_string())
}

fn check_upload_size(upload: &Upload) -> Result<(), ApiError> {
    let limit = if is_image(&upload.file_name) {
        MAX_IMAGE_SIZE
    } else {
        MAX_ATTACHMENT_SIZE
    };
    if upload.size() > limit {
        return Err(ApiError::InvalidInput(format!(
            "{} exceeds {}",
            upload.file_name,
            format_size(limit)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::http::mock::MockTransport;
    use crate::core::http::{Body, Method};
    use crate::stores::testing::signed_in;

    fn store() -> (FileStore<MockTransport>, MockTransport) {
        let (client, transport, auth) = signed_in();
        (FileStore::new(client, auth), transport)
    }

    fn listing(items: serde_json::Value) -> serde_json::Value {
        json!({ "items": items, "pagination": { "hasMore": false } })
    }

    fn folder(id: i64, name: &str) -> serde_json::Value {
        json!({ "type": "folder", "id": id, "name": name })
    }

    fn file(id: i64, name: &str) -> serde_json::Value {
        json!({ "type": "file", "id": id, "fileName": name, "fileSize": 10 })
    }

    #[tokio::test]
    async fn test_revisit_served_from_cache() {
        let (store, transport) = store();
        transport.push_ok(listing(json!([folder(2, "Photos"), file(5, "a.txt")])));
        store.open_folder(FolderKey::Root).await.unwrap();

        transport.push_ok(listing(json!([file(6, "b.txt")])));
        transport.push_ok(json!({ "path": [{ "id": 2, "name": "Photos" }] }));
        store.open_folder(FolderKey::Folder(2)).await.unwrap();
        assert_eq!(store.path.get_untracked().len(), 1);

        store.open_folder(FolderKey::Root).await.unwrap();

        assert_eq!(transport.request_count(), 3);
        assert_eq!(store.items_untracked().len(), 2);
        assert!(store.path.get_untracked().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_requeries() {
        let (store, transport) = store();
        transport.push_ok(listing(json!([file(5, "a.txt")])));
        store.open_folder(FolderKey::Root).await.unwrap();

        transport.push_ok(listing(json!([file(5, "a.txt"), file(6, "b.txt")])));
        store.refresh().await.unwrap();

        assert_eq!(transport.request_count(), 2);
        assert_eq!(store.items_untracked().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_current_folder_returns_parent() {
        let (store, transport) = store();
        transport.push_ok(listing(json!([])));
        transport.push_ok(json!({ "path": [{ "id": 1, "name": "Docs" }, { "id": 2, "name": "Old" }] }));
        store.open_folder(FolderKey::Folder(2)).await.unwrap();

        transport.push_ok(json!(null));
        let target = store.delete_folder(2, true).await.unwrap();

        assert_eq!(target, Some(FolderKey::Folder(1)));
        let delete = transport.last_request().unwrap();
        assert_eq!(delete.method, Method::Delete);
        assert_eq!(delete.query_value("recursive"), Some("true"));
    }

    #[tokio::test]
    async fn test_delete_child_folder_reloads_current() {
        let (store, transport) = store();
        transport.push_ok(listing(json!([folder(2, "Old")])));
        store.open_folder(FolderKey::Root).await.unwrap();

        transport.push_ok(json!(null));
        transport.push_ok(listing(json!([])));
        let target = store.delete_folder(2, false).await.unwrap();

        assert_eq!(target, None);
        assert!(store.items_untracked().is_empty());
    }

    #[tokio::test]
    async fn test_shift_folder_sends_new_order() {
        let (store, transport) = store();
        transport.push_ok(listing(json!([folder(2, "A"), folder(3, "B"), file(5, "a.txt")])));
        store.open_folder(FolderKey::Root).await.unwrap();

        transport.push_ok(json!(null));
        transport.push_ok(listing(json!([folder(3, "B"), folder(2, "A"), file(5, "a.txt")])));
        store.shift_folder(3, -1).await.unwrap();

        let sort = &transport.requests()[1];
        assert_eq!(sort.url, "http://api.test/api/folders/sort");
        assert_eq!(
            sort.body,
            Body::Json(json!({ "items": [
                { "id": 3, "sortIndex": 0 },
                { "id": 2, "sortIndex": 1 }
            ] }))
        );
        assert_eq!(store.items_untracked()[0].key(), ChildKey::Folder(3));

        store.shift_folder(3, -1).await.unwrap();
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_rename_file_patches_cached_copies() {
        let (store, transport) = store();
        transport.push_ok(listing(json!([file(5, "a.txt")])));
        store.open_folder(FolderKey::Root).await.unwrap();

        transport.push_ok(json!({ "id": 5, "fileName": "renamed.txt", "fileSize": 10 }));
        store.rename_file(5, "renamed.txt").await.unwrap();

        assert_eq!(store.items_untracked()[0].name(), "renamed.txt");
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected_others_sent() {
        let (store, transport) = store();
        transport.push_ok(listing(json!([])));
        store.open_folder(FolderKey::Root).await.unwrap();

        let big = Upload::new("huge.png", "image/png", vec![0; (MAX_IMAGE_SIZE + 1) as usize]);
        let small = Upload::new("ok.txt", "text/plain", b"hi".to_vec());
        transport.push_ok(json!({ "id": 9, "fileName": "ok.txt" }));
        transport.push_ok(listing(json!([file(9, "ok.txt")])));

        let err = store.upload(vec![big, small]).await.unwrap_err();

        assert!(matches!(err, ApiError::InvalidInput(_)));
        let uploads = transport
            .requests()
            .iter()
            .filter(|r| r.url.ends_with("/api/files/upload"))
            .count();
        assert_eq!(uploads, 1);
        assert_eq!(store.items_untracked().len(), 1);
    }

    #[tokio::test]
    async fn test_select_all_and_batch_delete() {
        let (store, transport) = store();
        transport.push_ok(listing(json!([folder(2, "Photos"), file(5, "a.txt"), file(6, "b.txt")])));
        store.open_folder(FolderKey::Root).await.unwrap();

        store.select_all();
        assert_eq!(store.selected_file_ids(), vec![5, 6]);

        transport.push_ok(json!(null));
        transport.push_ok(listing(json!([folder(2, "Photos")])));
        store.delete_files(&store.selected_file_ids()).await.unwrap();

        assert_eq!(
            store.selection.get_untracked().into_iter().collect::<Vec<_>>(),
            vec![ChildKey::Folder(2)]
        );
        assert_eq!(store.items_untracked().len(), 1);
    }

    #[tokio::test]
    async fn test_search_then_clear() {
        let (store, transport) = store();
        transport.push_ok(listing(json!([file(5, "a.txt")])));
        store.open_folder(FolderKey::Root).await.unwrap();

        transport.push_ok(listing(json!([])));
        store.search("zzz").await.unwrap();
        assert!(transport.last_request().unwrap().url.ends_with("/root/search"));

        transport.push_ok(listing(json!([file(5, "a.txt")])));
        store.search("").await.unwrap();
        assert!(transport.last_request().unwrap().url.ends_with("/root/children"));
        assert_eq!(store.items_untracked().len(), 1);
    }
}
