//! Recently modified documents.
//!
//! Built once in the app context and shared by the sidebar feed and the
//! editor, which promotes a document to the top after every save.

use leptos::prelude::*;

use crate::config::LATEST_PAGE_SIZE;
use crate::core::error::ApiError;
use crate::core::http::{ApiClient, BrowserTransport, Transport};
use crate::models::{Document, DocumentQuery};
use crate::stores::auth::AuthStore;
use crate::stores::document_list::DocumentSource;
use crate::stores::paged::PagedList;

#[derive(Clone)]
pub struct LatestDocuments<T: Transport = BrowserTransport> {
    list: PagedList<Document, DocumentSource<T>>,
    initialized: RwSignal<bool>,
}

impl<T: Transport> LatestDocuments<T> {
    pub fn new(client: ApiClient<T>, auth: AuthStore<T>) -> Self {
        let source = DocumentSource::new(client, auth, DocumentQuery::latest(), LATEST_PAGE_SIZE);
        Self {
            list: PagedList::new(source),
            initialized: RwSignal::new(false),
        }
    }

    pub fn list(&self) -> &PagedList<Document, DocumentSource<T>> {
        &self.list
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    /// Load the first page unless that already happened.
    pub async fn ensure_initialized(&self) -> Result<(), ApiError> {
        if self.initialized.get_untracked() {
            return Ok(());
        }
        self.initialized.set(true);
        let result = self.list.load_first_page().await;
        if result.is_err() {
            self.initialized.set(false);
        }
        result
    }

    /// Forget everything (sign out).
    pub fn teardown(&self) {
        self.list.reset();
        self.initialized.set(false);
    }

    /// Move a freshly saved or created document to the top.
    pub fn promote(&self, document: Document) {
        if self.initialized.get_untracked() {
            self.list.promote(document);
        }
    }

    pub fn update(&self, id: i64, update: impl FnOnce(&mut Document)) -> bool {
        self.list.update_item(&id, update)
    }

    pub fn remove(&self, id: i64) {
        self.list.remove(&id);
    }

    pub async fn load_more(&self) -> Result<(), ApiError> {
        self.list.load_more().await
    }

    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.initialized.set(true);
        self.list.refresh().await
    }
}
