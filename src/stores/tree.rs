//! Group/document tree of the workspace sidebar.
//!
//! The tree is always replaced wholesale: every mutation sends its request
//! and then refetches. After each fetch the open document and the selection
//! are checked against the new tree.

use std::collections::BTreeSet;

use leptos::prelude::*;

use crate::api;
use crate::config::{MAX_ATTACHMENT_SIZE, MAX_BATCH_ZIP_SIZE};
use crate::core::error::ApiError;
use crate::core::http::{ApiClient, BrowserTransport, Transport, Upload};
use crate::core::pagination::ResourceState;
use crate::core::tree::{self, DirectoryNode, FilteredTree, NodeType};
use crate::models::{BatchUploadReport, DocType, Document, DocumentPatch, GroupPayload, SortItem};
use crate::stores::auth::AuthStore;
use crate::stores::doc::DocStore;
use crate::stores::latest::LatestDocuments;
use crate::utils::format::{file_extension, format_size, title_from_file_name};

#[derive(Clone)]
pub struct TreeStore<T: Transport = BrowserTransport> {
    client: ApiClient<T>,
    auth: AuthStore<T>,
    doc: DocStore<T>,
    latest: LatestDocuments<T>,
    pub nodes: RwSignal<Vec<DirectoryNode>>,
    pub state: RwSignal<ResourceState>,
    /// Whether the server answered from its cache.
    pub cached: RwSignal<bool>,
    pub expanded: RwSignal<BTreeSet<i64>>,
    pub selected: RwSignal<Option<(i64, NodeType)>>,
}

impl<T: Transport> TreeStore<T> {
    pub fn new(
        client: ApiClient<T>,
        auth: AuthStore<T>,
        doc: DocStore<T>,
        latest: LatestDocuments<T>,
    ) -> Self {
        Self {
            client,
            auth,
            doc,
            latest,
            nodes: RwSignal::new(Vec::new()),
            state: RwSignal::new(ResourceState::Idle),
            cached: RwSignal::new(false),
            expanded: RwSignal::new(BTreeSet::new()),
            selected: RwSignal::new(None),
        }
    }

    /// Replace the tree with the server's and revalidate the open document.
    pub async fn fetch_tree(&self) -> Result<(), ApiError> {
        let user_id = self.auth.user_id()?;
        self.state.set(ResourceState::Loading);

        match api::groups::directory_tree(&self.client, user_id).await {
            Ok(snapshot) => {
                tracing::debug!(
                    roots = snapshot.tree.len(),
                    cached = snapshot.cached,
                    "tree loaded"
                );
                self.nodes.set(snapshot.tree);
                self.cached.set(snapshot.cached);
                self.state.set(ResourceState::Loaded);
                self.revalidate();
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to load directory tree");
                self.state.set(ResourceState::Error);
                Err(err)
            }
        }
    }

    fn revalidate(&self) {
        let open_missing = self.doc.current_id().is_some_and(|id| {
            self.nodes.with_untracked(|nodes| {
                !tree::find_by_id(nodes, id, Some(NodeType::Document)).is_found()
            })
        });
        if open_missing {
            self.doc.force_close();
            self.selected.set(None);
            return;
        }

        let selection_missing = self.selected.get_untracked().is_some_and(|(id, node_type)| {
            self.nodes
                .with_untracked(|nodes| !tree::find_by_id(nodes, id, Some(node_type)).is_found())
        });
        if selection_missing {
            tracing::warn!("selected node no longer exists");
            self.selected.set(None);
        }
    }

    /// Refetch after a mutation, whatever its outcome.
    async fn settle<R>(&self, result: Result<R, ApiError>) -> Result<R, ApiError> {
        if let Err(err) = self.fetch_tree().await {
            tracing::warn!(error = %err, "tree refetch after mutation failed");
        }
        result
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    pub fn find(&self, id: i64, node_type: NodeType) -> Option<DirectoryNode> {
        self.nodes
            .with(|nodes| tree::find_by_id(nodes, id, Some(node_type)).node().cloned())
    }

    /// Names from the root down to the node, for breadcrumbs.
    pub fn path_names(&self, id: i64, node_type: NodeType) -> Vec<String> {
        self.nodes.with(|nodes| {
            tree::node_path(nodes, id, node_type)
                .into_iter()
                .map(|node| node.name.clone())
                .collect()
        })
    }

    pub fn filtered(&self, keyword: &str) -> FilteredTree {
        self.nodes.with(|nodes| tree::filter_by_keyword(nodes, keyword))
    }

    /// Every group, depth-first, for "move to" pickers.
    pub fn groups(&self) -> Vec<(i64, String)> {
        self.nodes.with(|nodes| {
            tree::flatten(nodes)
                .into_iter()
                .filter(|node| node.is_group())
                .map(|node| (node.id, node.name.clone()))
                .collect()
        })
    }

    // =========================================================================
    // UI state
    // =========================================================================

    pub fn is_expanded(&self, id: i64) -> bool {
        self.expanded.with(|set| set.contains(&id))
    }

    pub fn toggle(&self, id: i64) {
        self.expanded.update(|set| {
            if !set.remove(&id) {
                set.insert(id);
            }
        });
    }

    pub fn expand(&self, ids: impl IntoIterator<Item = i64>) {
        self.expanded.update(|set| set.extend(ids));
    }

    pub fn collapse(&self, id: i64) {
        self.expanded.update(|set| {
            set.remove(&id);
        });
    }

    pub fn collapse_all(&self) {
        self.expanded.update(BTreeSet::clear);
    }

    pub fn select(&self, id: i64, node_type: NodeType) {
        self.selected.set(Some((id, node_type)));
    }

    pub fn is_selected(&self, id: i64, node_type: NodeType) -> bool {
        self.selected.with(|selected| *selected == Some((id, node_type)))
    }

    /// Forget the tree of a signed-out user.
    pub fn reset(&self) {
        self.nodes.set(Vec::new());
        self.state.set(ResourceState::Idle);
        self.cached.set(false);
        self.collapse_all();
        self.selected.set(None);
    }

    /// Select a node and expand the groups above it.
    pub fn reveal(&self, id: i64, node_type: NodeType) {
        let ancestors: Vec<i64> = self.nodes.with_untracked(|nodes| {
            tree::node_path(nodes, id, node_type)
                .into_iter()
                .filter(|node| node.is_group() && !(node.id == id && node_type == NodeType::Group))
                .map(|node| node.id)
                .collect()
        });
        self.expand(ancestors);
        self.select(id, node_type);
    }

    // =========================================================================
    // Groups
    // =========================================================================

    pub async fn create_group(&self, name: &str, parent_id: Option<i64>) -> Result<(), ApiError> {
        let name = require_name(name)?;
        let user_id = self.auth.user_id()?;
        let payload = GroupPayload {
            name: Some(name),
            parent_id,
            sort_index: None,
        };
        let result = api::groups::create(&self.client, user_id, &payload).await;
        if let Some(parent) = parent_id {
            self.expand([parent]);
        }
        self.settle(result).await.map(drop)
    }

    pub async fn rename_group(&self, id: i64, name: &str) -> Result<(), ApiError> {
        let name = require_name(name)?;
        self.update_group(
            id,
            GroupPayload {
                name: Some(name),
                ..GroupPayload::default()
            },
        )
        .await
    }

    pub async fn update_group(&self, id: i64, payload: GroupPayload) -> Result<(), ApiError> {
        let user_id = self.auth.user_id()?;
        let result = api::groups::update(&self.client, user_id, id, &payload).await;
        self.settle(result).await.map(drop)
    }

    pub async fn delete_group(&self, id: i64) -> Result<(), ApiError> {
        let user_id = self.auth.user_id()?;
        let result = api::groups::delete(&self.client, user_id, id).await;
        if result.is_ok() {
            self.collapse(id);
        }
        self.settle(result).await
    }

    pub async fn sort_groups(&self, items: &[SortItem]) -> Result<(), ApiError> {
        let user_id = self.auth.user_id()?;
        let result = api::groups::sort(&self.client, user_id, items).await;
        self.settle(result).await
    }

    // =========================================================================
    // Documents
    // =========================================================================

    pub async fn sort_documents(&self, items: &[SortItem]) -> Result<(), ApiError> {
        let user_id = self.auth.user_id()?;
        let result = api::documents::sort(&self.client, user_id, items).await;
        self.settle(result).await
    }

    /// Move a group or document one or more places among its siblings and
    /// persist the new order.
    pub async fn shift(&self, id: i64, node_type: NodeType, offset: isize) -> Result<(), ApiError> {
        let Some(order) = self
            .nodes
            .with_untracked(|nodes| tree::shifted_order(nodes, id, node_type, offset))
        else {
            return Ok(());
        };

        let items: Vec<SortItem> = order
            .ids
            .iter()
            .zip(0..)
            .map(|(&id, sort_index)| SortItem {
                id,
                parent_id: order.parent_id.filter(|_| node_type == NodeType::Group),
                group_id: order.parent_id.filter(|_| node_type == NodeType::Document),
                sort_index,
            })
            .collect();
        match node_type {
            NodeType::Group => self.sort_groups(&items).await,
            NodeType::Document => self.sort_documents(&items).await,
        }
    }

    /// Create an empty text document from the type's default content.
    pub async fn create_document(
        &self,
        title: &str,
        doc_type: DocType,
        group_id: Option<i64>,
    ) -> Result<Document, ApiError> {
        if !doc_type.is_text() {
            return Err(ApiError::InvalidInput(format!(
                "{} documents can only be uploaded",
                doc_type.label()
            )));
        }
        let title = require_name(title)?;
        let upload = Upload::new(
            format!("{title}.{}", doc_type.extension()),
            doc_type.mime(),
            doc_type.default_content().as_bytes().to_vec(),
        );
        self.create_from_upload(&title, group_id, upload).await
    }

    /// Create a document from a picked file (markdown, text, HTML or PDF).
    pub async fn upload_document(
        &self,
        upload: Upload,
        group_id: Option<i64>,
    ) -> Result<Document, ApiError> {
        if DocType::from_file_name(&upload.file_name).is_none() {
            return Err(ApiError::InvalidInput(format!(
                "Unsupported file type, expected one of {}",
                DocType::accept()
            )));
        }
        if upload.size() > MAX_ATTACHMENT_SIZE {
            return Err(ApiError::InvalidInput(format!(
                "File exceeds {}",
                format_size(MAX_ATTACHMENT_SIZE)
            )));
        }
        let title = title_from_file_name(&upload.file_name);
        self.create_from_upload(&title, group_id, upload).await
    }

    async fn create_from_upload(
        &self,
        title: &str,
        group_id: Option<i64>,
        upload: Upload,
    ) -> Result<Document, ApiError> {
        let user_id = self.auth.user_id()?;
        let result = api::documents::create(&self.client, user_id, title, group_id, upload).await;
        let document = self.settle(result).await?;
        tracing::info!(id = document.id, "document created");
        if let Some(group) = group_id {
            self.expand([group]);
        }
        self.latest.promote(document.clone());
        Ok(document)
    }

    /// Import a zip archive of documents into `group_id`.
    pub async fn batch_upload(
        &self,
        archive: Upload,
        group_id: Option<i64>,
    ) -> Result<BatchUploadReport, ApiError> {
        if file_extension(&archive.file_name).as_deref() != Some("zip") {
            return Err(ApiError::InvalidInput("Batch upload expects a .zip archive".to_string()));
        }
        if archive.size() > MAX_BATCH_ZIP_SIZE {
            return Err(ApiError::InvalidInput(format!(
                "Archive exceeds {}",
                format_size(MAX_BATCH_ZIP_SIZE)
            )));
        }
        let user_id = self.auth.user_id()?;
        let result = api::documents::batch_upload(&self.client, user_id, group_id, archive).await;
        let report = self.settle(result).await?;
        tracing::info!(created = report.created, failed = report.failed, "batch upload finished");
        if report.created > 0 {
            let _ = self.latest.refresh().await;
        }
        Ok(report)
    }

    pub async fn delete_document(&self, id: i64) -> Result<(), ApiError> {
        let user_id = self.auth.user_id()?;
        let result = api::documents::delete(&self.client, user_id, id).await;
        if result.is_ok() {
            if self.doc.current_id() == Some(id) {
                self.doc.close();
            }
            self.latest.remove(id);
        }
        self.settle(result).await
    }

    /// Move a document under another group.
    pub async fn move_document(&self, id: i64, group_id: Option<i64>) -> Result<(), ApiError> {
        let user_id = self.auth.user_id()?;
        let patch = DocumentPatch {
            group_id,
            ..DocumentPatch::default()
        };
        let result = api::documents::update(&self.client, user_id, id, &patch).await;
        self.settle(result).await.map(drop)
    }
}

fn require_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::InvalidInput("Name cannot be empty".to_string()));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::http::mock::MockTransport;
    use crate::core::http::{Body, Method};
    use crate::stores::testing::signed_in;

    struct Fixture {
        tree: TreeStore<MockTransport>,
        doc: DocStore<MockTransport>,
        transport: MockTransport,
    }

    fn fixture() -> Fixture {
        let (client, transport, auth) = signed_in();
        let latest = LatestDocuments::new(client.clone(), auth.clone());
        let doc = DocStore::new(client.clone(), auth.clone(), latest.clone());
        let tree = TreeStore::new(client, auth, doc.clone(), latest);
        Fixture { tree, doc, transport }
    }

    fn snapshot(with_doc: bool) -> serde_json::Value {
        let children = if with_doc {
            json!([{ "id": 10, "nodeType": "DOCUMENT", "name": "A", "docType": "md" }])
        } else {
            json!([])
        };
        let tree = if with_doc {
            json!([{ "id": 1, "nodeType": "GROUP", "name": "Notes", "children": children }])
        } else {
            json!([])
        };
        json!({ "tree": tree, "cached": false })
    }

    async fn open_doc(f: &Fixture, id: i64) {
        f.transport
            .push_ok(json!({ "id": id, "title": "A", "type": "md", "content": "body" }));
        f.doc.open(id).await.unwrap();
        f.tree.select(id, NodeType::Document);
    }

    #[tokio::test]
    async fn test_vanished_document_is_closed() {
        let f = fixture();
        f.transport.push_ok(snapshot(true));
        f.tree.fetch_tree().await.unwrap();
        open_doc(&f, 10).await;
        assert_eq!(f.doc.current_id(), Some(10));

        // The group holding the document was deleted elsewhere.
        f.transport.push_ok(snapshot(false));
        f.tree.fetch_tree().await.unwrap();

        assert_eq!(f.doc.current_id(), None);
        assert_eq!(f.tree.selected.get_untracked(), None);
    }

    #[tokio::test]
    async fn test_existing_document_stays_open() {
        let f = fixture();
        f.transport.push_ok(snapshot(true));
        f.tree.fetch_tree().await.unwrap();
        open_doc(&f, 10).await;

        f.transport.push_ok(snapshot(true));
        f.tree.fetch_tree().await.unwrap();

        assert_eq!(f.doc.current_id(), Some(10));
        assert_eq!(f.tree.selected.get_untracked(), Some((10, NodeType::Document)));
    }

    #[tokio::test]
    async fn test_vanished_group_is_deselected() {
        let f = fixture();
        f.transport.push_ok(snapshot(true));
        f.tree.fetch_tree().await.unwrap();
        f.tree.select(1, NodeType::Group);

        f.transport.push_ok(snapshot(false));
        f.tree.fetch_tree().await.unwrap();

        assert_eq!(f.tree.selected.get_untracked(), None);
    }

    #[tokio::test]
    async fn test_mutation_refetches_even_on_failure() {
        let f = fixture();
        f.transport.push_envelope(4001, "Group name taken", json!(null));
        f.transport.push_ok(snapshot(true));

        let err = f.tree.create_group("Notes", None).await.unwrap_err();

        assert_eq!(err.to_string(), "Group name taken");
        let requests = f.transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].url, "http://api.test/api/directory-tree");
        assert_eq!(f.tree.nodes.get_untracked().len(), 1);
    }

    #[tokio::test]
    async fn test_create_document_uploads_default_content() {
        let f = fixture();
        f.transport
            .push_ok(json!({ "id": 11, "title": "Plan", "type": "md", "groupId": 1 }));
        f.transport.push_ok(snapshot(true));

        let created = f
            .tree
            .create_document(" Plan ", DocType::Md, Some(1))
            .await
            .unwrap();

        assert_eq!(created.id, 11);
        let create = &f.transport.requests()[0];
        assert_eq!(create.method, Method::Post);
        assert_eq!(create.url, "http://api.test/api/documents");
        assert!(f.tree.is_expanded(1));
    }

    #[tokio::test]
    async fn test_delete_open_document_closes_editor() {
        let f = fixture();
        f.transport.push_ok(snapshot(true));
        f.tree.fetch_tree().await.unwrap();
        open_doc(&f, 10).await;

        f.transport.push_ok(json!(null));
        f.transport.push_ok(snapshot(false));
        f.tree.delete_document(10).await.unwrap();

        assert_eq!(f.doc.current_id(), None);
    }

    #[tokio::test]
    async fn test_shift_document_sends_sibling_order() {
        let f = fixture();
        f.transport.push_ok(json!({ "tree": [{
            "id": 1, "nodeType": "GROUP", "name": "Notes", "children": [
                { "id": 10, "nodeType": "DOCUMENT", "name": "A" },
                { "id": 11, "nodeType": "DOCUMENT", "name": "B" }
            ]
        }] }));
        f.tree.fetch_tree().await.unwrap();

        f.transport.push_ok(json!(null));
        f.transport.push_ok(snapshot(true));
        f.tree.shift(11, NodeType::Document, -1).await.unwrap();

        let sort = &f.transport.requests()[1];
        assert_eq!(sort.url, "http://api.test/api/sort/documents");
        assert_eq!(
            sort.body,
            Body::Json(json!({ "items": [
                { "id": 11, "groupId": 1, "sortIndex": 0 },
                { "id": 10, "groupId": 1, "sortIndex": 1 }
            ] }))
        );
    }

    #[tokio::test]
    async fn test_shift_past_the_edge_sends_nothing() {
        let f = fixture();
        f.transport.push_ok(snapshot(true));
        f.tree.fetch_tree().await.unwrap();

        f.tree.shift(1, NodeType::Group, 1).await.unwrap();

        assert_eq!(f.transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_batch_upload_rejects_non_zip() {
        let f = fixture();
        let err = f
            .tree
            .batch_upload(Upload::new("notes.md", "text/markdown", vec![1]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert_eq!(f.transport.request_count(), 0);
    }

    #[test]
    fn test_reveal_expands_ancestors() {
        let f = fixture();
        f.tree.nodes.set(vec![tree::tests::group(
            1,
            "Notes",
            vec![tree::tests::group(2, "Rust", vec![tree::tests::doc(10, "A")])],
        )]);

        f.tree.reveal(10, NodeType::Document);

        assert!(f.tree.is_expanded(1));
        assert!(f.tree.is_expanded(2));
        assert!(f.tree.is_selected(10, NodeType::Document));
    }
}
