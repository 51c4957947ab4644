//! The open document and its autosave loop.
//!
//! Edits update the buffer signals and feed [`Autosave`]; the debounce is a
//! `gloo_timers` [`Timeout`] owned by the store, so re-arming or closing
//! simply drops the previous one. Saves upload the whole buffer as the
//! document's file and patch the title when it changed.

use gloo_timers::callback::Timeout;
use leptos::prelude::*;

use crate::api;
use crate::config::{AUTO_SAVE_DEBOUNCE_MS, MAX_EDITABLE_SIZE};
use crate::core::autosave::{Autosave, SaveOutcome, SaveTicket, SyncStatus};
use crate::core::error::ApiError;
use crate::core::http::{ApiClient, BrowserTransport, Transport, Upload};
use crate::models::{DocStatus, Document, DocumentPatch};
use crate::stores::auth::AuthStore;
use crate::stores::latest::LatestDocuments;
use crate::utils::time::now_ms;

#[derive(Clone)]
pub struct DocStore<T: Transport = BrowserTransport> {
    client: ApiClient<T>,
    auth: AuthStore<T>,
    latest: LatestDocuments<T>,
    /// Metadata of the open document as last confirmed by the server.
    pub current: RwSignal<Option<Document>>,
    /// Editor buffers.
    pub title: RwSignal<String>,
    pub content: RwSignal<String>,
    pub loading: RwSignal<bool>,
    autosave: RwSignal<Autosave>,
    saved_title: RwSignal<String>,
    open_epoch: RwSignal<u64>,
    timer: StoredValue<Option<Timeout>, LocalStorage>,
}

impl<T: Transport> DocStore<T> {
    pub fn new(client: ApiClient<T>, auth: AuthStore<T>, latest: LatestDocuments<T>) -> Self {
        Self {
            client,
            auth,
            latest,
            current: RwSignal::new(None),
            title: RwSignal::new(String::new()),
            content: RwSignal::new(String::new()),
            loading: RwSignal::new(false),
            autosave: RwSignal::new(Autosave::new(AUTO_SAVE_DEBOUNCE_MS)),
            saved_title: RwSignal::new(String::new()),
            open_epoch: RwSignal::new(0),
            timer: StoredValue::new_local(None),
        }
    }

    pub fn current_id(&self) -> Option<i64> {
        self.current.with_untracked(|doc| doc.as_ref().map(|d| d.id))
    }

    pub fn status(&self) -> SyncStatus {
        self.autosave.with(|a| a.status())
    }

    pub fn is_dirty(&self) -> bool {
        self.autosave.with(|a| a.is_dirty())
    }

    pub fn status_text(&self, now: f64) -> String {
        self.autosave.with(|a| a.status_text(now))
    }

    /// Whether the body can be edited inline (text type, not oversized).
    pub fn is_editable(&self) -> bool {
        self.current.with(|doc| doc.as_ref().is_some_and(editable))
    }

    // =========================================================================
    // Open / close
    // =========================================================================

    /// Load a document and its text body. Opening the document that is
    /// already open does nothing; a newer open supersedes a slower one.
    pub async fn open(&self, id: i64) -> Result<(), ApiError> {
        if self.current_id() == Some(id) {
            return Ok(());
        }
        self.close();

        let epoch = self.open_epoch.get_untracked();
        self.loading.set(true);
        let result = self.fetch(id).await;
        if self.open_epoch.get_untracked() != epoch {
            tracing::debug!(id, "document open superseded");
            return Ok(());
        }
        self.loading.set(false);

        let (document, content) = result.inspect_err(|err| {
            tracing::error!(id, error = %err, "failed to open document");
        })?;
        self.saved_title.set(document.title.clone());
        self.title.set(document.title.clone());
        self.content.set(content);
        self.current.set(Some(document));
        Ok(())
    }

    async fn fetch(&self, id: i64) -> Result<(Document, String), ApiError> {
        let user_id = self.auth.user_id()?;
        let mut document = api::documents::get(&self.client, user_id, id).await?;
        let content = match (document.content.take(), &document.file_url) {
            _ if !document.doc_type.is_text() => String::new(),
            (Some(content), _) => content,
            (None, Some(url)) => api::documents::fetch_content(&self.client, url).await?,
            (None, None) => String::new(),
        };
        Ok((document, content))
    }

    /// Close the editor. Pending edits are dropped and a save still in
    /// flight no longer applies.
    pub fn close(&self) {
        self.cancel_timer();
        self.autosave.update(|a| a.reset());
        self.open_epoch.update(|epoch| *epoch += 1);
        self.loading.set(false);
        self.current.set(None);
        self.title.set(String::new());
        self.content.set(String::new());
        self.saved_title.set(String::new());
    }

    /// Close because the document disappeared server-side.
    pub fn force_close(&self) {
        if let Some(id) = self.current_id() {
            tracing::warn!(id, "open document no longer exists, closing editor");
        }
        self.close();
    }

    // =========================================================================
    // Editing
    // =========================================================================

    pub fn edit_content(&self, content: String) {
        self.edit_content_at(content, now_ms());
    }

    pub fn edit_title(&self, title: String) {
        self.edit_title_at(title, now_ms());
    }

    pub(crate) fn edit_content_at(&self, content: String, now: f64) {
        if !self.current.with_untracked(|doc| doc.as_ref().is_some_and(editable)) {
            return;
        }
        self.content.set(content);
        self.record_edit(now);
    }

    pub(crate) fn edit_title_at(&self, title: String, now: f64) {
        if self.current_id().is_none() {
            return;
        }
        self.title.set(title);
        self.record_edit(now);
    }

    fn record_edit(&self, now: f64) {
        if let Some(deadline) = self.autosave.try_update(|a| a.record_edit(now)).flatten() {
            self.arm_timer(deadline);
        }
    }

    // =========================================================================
    // Saving
    // =========================================================================

    /// Run the debounced save if its deadline has passed.
    pub async fn flush_due(&self) -> Result<(), ApiError> {
        self.flush_due_at(now_ms()).await
    }

    pub(crate) async fn flush_due_at(&self, now: f64) -> Result<(), ApiError> {
        match self.autosave.try_update(|a| a.begin_save(now)).flatten() {
            Some(ticket) => self.run_save(ticket).await,
            None => Ok(()),
        }
    }

    /// Save immediately (Ctrl+S).
    pub async fn save_now(&self) -> Result<(), ApiError> {
        match self.autosave.try_update(|a| a.save_now()).flatten() {
            Some(ticket) => {
                self.cancel_timer();
                self.run_save(ticket).await
            }
            None => Ok(()),
        }
    }

    /// Try again after a failed save.
    pub async fn retry(&self) -> Result<(), ApiError> {
        match self.autosave.try_update(|a| a.retry()).flatten() {
            Some(ticket) => self.run_save(ticket).await,
            None => Ok(()),
        }
    }

    async fn run_save(&self, ticket: SaveTicket) -> Result<(), ApiError> {
        let Some(document) = self.current.get_untracked() else {
            return Ok(());
        };
        let title = self.title.get_untracked();
        let content = self.content.get_untracked();

        let result = self.persist(&document, &title, content).await;
        let status = result.as_ref().map(|_| ()).map_err(ToString::to_string);
        let outcome = self
            .autosave
            .try_update(|a| a.finish_save(ticket, status, now_ms()))
            .unwrap_or(SaveOutcome::Stale);

        match (outcome, result) {
            (SaveOutcome::Stale, _) => {
                tracing::debug!(id = document.id, "save finished for a closed document");
                Ok(())
            }
            (SaveOutcome::Failed, Err(err)) => {
                tracing::error!(id = document.id, error = %err, "autosave failed");
                Err(err)
            }
            (outcome, Ok(saved)) => {
                self.saved_title.set(saved.title.clone());
                self.current.set(Some(saved.clone()));
                self.latest.promote(saved);
                if let SaveOutcome::Pending { deadline } = outcome {
                    self.arm_timer(deadline);
                }
                Ok(())
            }
            (_, Err(err)) => Err(err),
        }
    }

    async fn persist(
        &self,
        document: &Document,
        title: &str,
        content: String,
    ) -> Result<Document, ApiError> {
        let user_id = self.auth.user_id()?;
        let title = title.trim();
        let mut saved = document.clone();

        if editable(document) {
            let named = Document {
                title: title.to_string(),
                ..document.clone()
            };
            let upload = Upload::new(
                named.file_name(),
                document.doc_type.mime(),
                content.into_bytes(),
            );
            saved = api::documents::replace_file(&self.client, user_id, document.id, upload).await?;
        }

        if title != self.saved_title.get_untracked() {
            let patch = DocumentPatch {
                title: Some(title.to_string()),
                ..DocumentPatch::default()
            };
            saved = api::documents::update(&self.client, user_id, document.id, &patch).await?;
        }

        saved.content = None;
        Ok(saved)
    }

    /// Publish or unpublish the open document.
    pub async fn set_published(&self, published: bool) -> Result<(), ApiError> {
        let Some(id) = self.current_id() else {
            return Ok(());
        };
        let user_id = self.auth.user_id()?;
        let status = if published {
            DocStatus::Published
        } else {
            DocStatus::Draft
        };
        let patch = DocumentPatch {
            status: Some(status),
            ..DocumentPatch::default()
        };
        api::documents::update(&self.client, user_id, id, &patch).await?;

        self.current.update(|doc| {
            if let Some(doc) = doc.as_mut().filter(|doc| doc.id == id) {
                doc.status = status;
            }
        });
        self.latest.update(id, |doc| doc.status = status);
        Ok(())
    }

    // =========================================================================
    // Timer
    // =========================================================================

    #[cfg(target_arch = "wasm32")]
    fn arm_timer(&self, deadline: f64) {
        let store = self.clone();
        let delay = (deadline - now_ms()).max(0.0) as u32;
        let timeout = Timeout::new(delay, move || {
            leptos::task::spawn_local(async move {
                let _ = store.flush_due().await;
            });
        });
        self.timer.set_value(Some(timeout));
    }

    // Native builds have no event loop to fire a timer; tests drive
    // `flush_due_at` directly.
    #[cfg(not(target_arch = "wasm32"))]
    fn arm_timer(&self, _deadline: f64) {}

    /// Dropping the `Timeout` cancels it.
    fn cancel_timer(&self) {
        self.timer.set_value(None);
    }
}

fn editable(document: &Document) -> bool {
    document.doc_type.is_text() && document.file_size.is_none_or(|size| size <= MAX_EDITABLE_SIZE)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::http::mock::MockTransport;
    use crate::core::http::{Body, Method, PartValue, RawResponse};
    use crate::stores::testing::signed_in;

    fn store() -> (DocStore<MockTransport>, MockTransport) {
        let (client, transport, auth) = signed_in();
        let latest = LatestDocuments::new(client.clone(), auth.clone());
        (DocStore::new(client, auth, latest), transport)
    }

    fn markdown_doc(id: i64, title: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "type": "md",
            "fileUrl": format!("https://cdn.test/{id}.md")
        })
    }

    async fn open(store: &DocStore<MockTransport>, transport: &MockTransport, id: i64) {
        transport.push_ok(markdown_doc(id, "Notes"));
        transport.push_response(RawResponse {
            status: 200,
            headers: vec![("content-type".into(), "text/markdown".into())],
            body: b"# Notes".to_vec(),
        });
        store.open(id).await.unwrap();
    }

    fn uploads(transport: &MockTransport) -> usize {
        transport
            .requests()
            .iter()
            .filter(|r| r.method == Method::Put)
            .count()
    }

    #[tokio::test]
    async fn test_open_loads_content() {
        let (store, transport) = store();
        open(&store, &transport, 4).await;

        assert_eq!(store.current_id(), Some(4));
        assert_eq!(store.content.get_untracked(), "# Notes");
        assert_eq!(store.title.get_untracked(), "Notes");
        assert_eq!(transport.requests()[1].url, "https://cdn.test/4.md");
        assert_eq!(store.status(), SyncStatus::Synced);
    }

    #[tokio::test]
    async fn test_save_after_exact_interval() {
        let (store, transport) = store();
        open(&store, &transport, 4).await;

        store.edit_content_at("# Notes!".into(), 0.0);
        assert_eq!(store.status(), SyncStatus::Pending);
        store.flush_due_at(999.0).await.unwrap();
        assert_eq!(uploads(&transport), 0);

        transport.push_ok(markdown_doc(4, "Notes"));
        store.flush_due_at(1000.0).await.unwrap();

        assert_eq!(uploads(&transport), 1);
        assert_eq!(store.status(), SyncStatus::Synced);
        assert!(!store.is_dirty());
    }

    #[tokio::test]
    async fn test_continuous_typing_saves_once_at_end() {
        let (store, transport) = store();
        open(&store, &transport, 4).await;

        let interval = f64::from(AUTO_SAVE_DEBOUNCE_MS);
        let mut now = 0.0;
        while now < interval * 10.0 {
            store.edit_content_at(format!("draft {now}"), now);
            store.flush_due_at(now).await.unwrap();
            now += interval / 4.0;
        }
        assert_eq!(uploads(&transport), 0);

        transport.push_ok(markdown_doc(4, "Notes"));
        store.flush_due_at(now + interval).await.unwrap();
        assert_eq!(uploads(&transport), 1);

        let upload = transport.last_request().unwrap();
        let Body::Multipart(parts) = upload.body else {
            panic!("expected multipart upload");
        };
        let PartValue::File(file) = &parts[0].value else {
            panic!("expected file part");
        };
        assert_eq!(file.file_name, "Notes.md");
        assert_eq!(file.mime, "text/markdown");
    }

    #[tokio::test]
    async fn test_failed_save_then_retry() {
        let (store, transport) = store();
        open(&store, &transport, 4).await;

        store.edit_content_at("x".into(), 0.0);
        transport.push_status(500, Vec::new());
        let err = store.flush_due_at(1000.0).await.unwrap_err();

        assert_eq!(err, ApiError::Http(500));
        assert_eq!(store.status(), SyncStatus::Error);
        assert!(store.is_dirty());
        assert_eq!(store.status_text(1000.0), "Save failed: Internal server error");

        transport.push_ok(markdown_doc(4, "Notes"));
        store.retry().await.unwrap();
        assert_eq!(store.status(), SyncStatus::Synced);
    }

    #[tokio::test]
    async fn test_save_error_stays_until_retry() {
        let (store, transport) = store();
        open(&store, &transport, 4).await;

        store.edit_content_at("x".into(), 0.0);
        transport.push_status(500, Vec::new());
        store.flush_due_at(1000.0).await.unwrap_err();

        // Ctrl+S and a later tick must not swallow the failure.
        store.save_now().await.unwrap();
        store.flush_due_at(9000.0).await.unwrap();
        assert_eq!(uploads(&transport), 1);
        assert_eq!(store.status(), SyncStatus::Error);
        assert!(store.is_dirty());

        transport.push_ok(markdown_doc(4, "Notes"));
        store.retry().await.unwrap();
        assert_eq!(uploads(&transport), 2);
        assert_eq!(store.status(), SyncStatus::Synced);
        assert!(!store.is_dirty());
    }

    #[tokio::test]
    async fn test_title_change_is_patched() {
        let (store, transport) = store();
        open(&store, &transport, 4).await;

        store.edit_title_at("Renamed".into(), 0.0);
        transport.push_ok(markdown_doc(4, "Notes"));
        transport.push_ok(markdown_doc(4, "Renamed"));
        store.flush_due_at(1000.0).await.unwrap();

        let requests = transport.requests();
        let patch = requests.last().unwrap();
        assert_eq!(patch.method, Method::Patch);
        assert_eq!(patch.body, Body::Json(json!({ "title": "Renamed" })));
        assert_eq!(
            store.current.get_untracked().map(|d| d.title),
            Some("Renamed".to_string())
        );
    }

    #[tokio::test]
    async fn test_close_discards_pending_save() {
        let (store, transport) = store();
        open(&store, &transport, 4).await;

        store.edit_content_at("x".into(), 0.0);
        store.close();
        store.flush_due_at(5000.0).await.unwrap();

        assert_eq!(uploads(&transport), 0);
        assert_eq!(store.current_id(), None);
        assert_eq!(store.status(), SyncStatus::Synced);
    }

    #[tokio::test]
    async fn test_save_now_from_editing() {
        let (store, transport) = store();
        open(&store, &transport, 4).await;

        store.edit_content_at("y".into(), 0.0);
        transport.push_ok(markdown_doc(4, "Notes"));
        store.save_now().await.unwrap();

        assert_eq!(uploads(&transport), 1);
        assert_eq!(store.status(), SyncStatus::Synced);
    }
}
