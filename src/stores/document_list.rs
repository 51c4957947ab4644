//! Searchable document listing.

use leptos::prelude::*;

use crate::api;
use crate::config::DOCUMENT_PAGE_SIZE;
use crate::core::error::ApiError;
use crate::core::http::{ApiClient, BrowserTransport, Transport};
use crate::core::pagination::{Page, SortOrder};
use crate::models::{DocSortBy, Document, DocumentQuery};
use crate::stores::auth::AuthStore;
use crate::stores::paged::{PageSource, PagedList};

/// Pages of `GET /api/documents` for the query held in a signal.
#[derive(Clone)]
pub struct DocumentSource<T: Transport = BrowserTransport> {
    client: ApiClient<T>,
    auth: AuthStore<T>,
    query: RwSignal<DocumentQuery>,
    limit: u32,
}

impl<T: Transport> DocumentSource<T> {
    pub fn new(client: ApiClient<T>, auth: AuthStore<T>, query: DocumentQuery, limit: u32) -> Self {
        Self {
            client,
            auth,
            query: RwSignal::new(query),
            limit,
        }
    }

    pub fn query(&self) -> RwSignal<DocumentQuery> {
        self.query
    }
}

impl<T: Transport> PageSource<Document> for DocumentSource<T> {
    async fn fetch(&self, cursor: Option<String>) -> Result<Page<Document>, ApiError> {
        let user_id = self.auth.user_id()?;
        let query = self.query.get_untracked();
        api::documents::list(&self.client, user_id, &query, cursor.as_deref(), self.limit).await
    }
}

/// The document list view's data. Any query change reloads from the first
/// page.
#[derive(Clone)]
pub struct DocumentList<T: Transport = BrowserTransport> {
    list: PagedList<Document, DocumentSource<T>>,
}

impl<T: Transport> DocumentList<T> {
    pub fn new(client: ApiClient<T>, auth: AuthStore<T>) -> Self {
        let source =
            DocumentSource::new(client, auth, DocumentQuery::default(), DOCUMENT_PAGE_SIZE);
        Self {
            list: PagedList::new(source),
        }
    }

    pub fn list(&self) -> &PagedList<Document, DocumentSource<T>> {
        &self.list
    }

    pub fn query(&self) -> DocumentQuery {
        self.list.source().query().get()
    }

    /// Replace the query; reloads only when it changed.
    pub async fn set_query(&self, query: DocumentQuery) -> Result<(), ApiError> {
        let signal = self.list.source().query();
        if signal.with_untracked(|current| *current == query) {
            return Ok(());
        }
        signal.set(query);
        self.list.refresh().await
    }

    pub async fn search(&self, keyword: &str) -> Result<(), ApiError> {
        let query = DocumentQuery {
            q: keyword.trim().to_string(),
            ..self.list.source().query().get_untracked()
        };
        self.set_query(query).await
    }

    pub async fn filter_group(&self, group_id: Option<i64>) -> Result<(), ApiError> {
        let query = DocumentQuery {
            group_id,
            ..self.list.source().query().get_untracked()
        };
        self.set_query(query).await
    }

    pub async fn sort(&self, sort_by: DocSortBy, order: SortOrder) -> Result<(), ApiError> {
        let query = DocumentQuery {
            sort_by,
            order,
            ..self.list.source().query().get_untracked()
        };
        self.set_query(query).await
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
}
