//! Async driver for [`CursorPager`].
//!
//! A [`PagedList`] owns the pager inside a signal and a [`PageSource`]
//! that knows how to fetch one page. Views read the signal; actions go
//! through the async methods, which take a ticket before awaiting and hand
//! the result back afterwards so overlapping loads resolve correctly.

use std::future::Future;

use leptos::prelude::*;

use crate::core::error::ApiError;
use crate::core::pagination::{CursorPager, Keyed, Page, ResourceState, Ticket};

/// Fetches one page of a listing.
pub trait PageSource<T>: Clone + 'static {
    fn fetch(&self, cursor: Option<String>) -> impl Future<Output = Result<Page<T>, ApiError>>;
}

pub struct PagedList<T, S>
where
    T: Keyed + Send + Sync + 'static,
{
    pager: RwSignal<CursorPager<T>>,
    source: S,
}

impl<T, S> Clone for PagedList<T, S>
where
    T: Keyed + Send + Sync + 'static,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            pager: self.pager,
            source: self.source.clone(),
        }
    }
}

impl<T, S> PagedList<T, S>
where
    T: Keyed + Clone + Send + Sync + 'static,
    S: PageSource<T>,
{
    pub fn new(source: S) -> Self {
        Self::with_pager(source, CursorPager::new())
    }

    pub fn with_pager(source: S, pager: CursorPager<T>) -> Self {
        Self {
            pager: RwSignal::new(pager),
            source,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Replace the list with the first page.
    pub async fn load_first_page(&self) -> Result<(), ApiError> {
        let Some(ticket) = self.pager.try_update(|pager| pager.begin_first()) else {
            return Ok(());
        };
        let result = self.source.fetch(None).await;
        self.finish(&ticket, result)
    }

    /// Append the next page. Does nothing when no more pages remain, a
    /// load is in flight, or no cursor is held.
    pub async fn load_more(&self) -> Result<(), ApiError> {
        let Some(ticket) = self.pager.try_update(|pager| pager.begin_more()).flatten() else {
            return Ok(());
        };
        let result = self.source.fetch(ticket.cursor().map(str::to_string)).await;
        self.finish(&ticket, result)
    }

    /// Drop everything and load the first page again.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let Some(ticket) = self.pager.try_update(|pager| pager.refresh()) else {
            return Ok(());
        };
        let result = self.source.fetch(None).await;
        self.finish(&ticket, result)
    }

    fn finish(&self, ticket: &Ticket, result: Result<Page<T>, ApiError>) -> Result<(), ApiError> {
        self.pager
            .try_update(|pager| pager.complete(ticket, result))
            .map_or(Ok(()), |completion| completion.into_result())
    }

    pub fn reset(&self) {
        self.pager.update(|pager| pager.reset());
    }

    pub fn prepend(&self, item: T) {
        self.pager.update(|pager| pager.prepend(item));
    }

    pub fn promote(&self, item: T) {
        self.pager.update(|pager| pager.promote(item));
    }

    pub fn update_item(&self, key: &T::Key, update: impl FnOnce(&mut T)) -> bool {
        self.pager
            .try_update(|pager| pager.update_item(key, update))
            .unwrap_or(false)
    }

    pub fn remove(&self, key: &T::Key) -> Option<T> {
        self.pager.try_update(|pager| pager.remove(key)).flatten()
    }

    pub fn remove_many(&self, keys: &[T::Key]) -> usize {
        self.pager
            .try_update(|pager| pager.remove_many(keys))
            .unwrap_or(0)
    }

    // Reactive reads

    pub fn items(&self) -> Vec<T> {
        self.pager.with(|pager| pager.items().to_vec())
    }

    pub fn find(&self, key: &T::Key) -> Option<T> {
        self.pager.with(|pager| pager.find(key).cloned())
    }

    pub fn len(&self) -> usize {
        self.pager.with(|pager| pager.len())
    }

    pub fn is_empty(&self) -> bool {
        self.pager.with(|pager| pager.is_empty())
    }

    pub fn total(&self) -> Option<u64> {
        self.pager.with(|pager| pager.total())
    }

    pub fn has_more(&self) -> bool {
        self.pager.with(|pager| pager.has_more())
    }

    pub fn can_load_more(&self) -> bool {
        self.pager.with(|pager| pager.can_load_more())
    }

    pub fn state(&self) -> ResourceState {
        self.pager.with(|pager| pager.state())
    }

    pub fn is_loading(&self) -> bool {
        self.pager.with(|pager| pager.is_loading())
    }

    pub fn error(&self) -> Option<ApiError> {
        self.pager.with(|pager| pager.error().cloned())
    }

    pub fn is_cursor_expired(&self) -> bool {
        self.pager.with(|pager| pager.is_cursor_expired())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: u32,
        label: &'static str,
    }

    impl Keyed for Row {
        type Key = u32;

        fn key(&self) -> u32 {
            self.id
        }
    }

    fn row(id: u32) -> Row {
        Row { id, label: "v1" }
    }

    /// Serves queued pages and records requested cursors.
    #[derive(Clone, Default)]
    struct Script {
        pages: Rc<RefCell<VecDeque<Result<Page<Row>, ApiError>>>>,
        cursors: Rc<RefCell<Vec<Option<String>>>>,
    }

    impl Script {
        fn push(&self, page: Result<Page<Row>, ApiError>) {
            self.pages.borrow_mut().push_back(page);
        }

        fn calls(&self) -> usize {
            self.cursors.borrow().len()
        }
    }

    impl PageSource<Row> for Script {
        async fn fetch(&self, cursor: Option<String>) -> Result<Page<Row>, ApiError> {
            self.cursors.borrow_mut().push(cursor);
            self.pages
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(ApiError::Network("no page queued".into())))
        }
    }

    #[tokio::test]
    async fn test_pages_then_exhausted() {
        let script = Script::default();
        script.push(Ok(Page::new(vec![row(1), row(2)], Some("c1"), true)));
        script.push(Ok(Page::new(vec![row(3)], None, false)));
        let list = PagedList::new(script.clone());

        list.load_first_page().await.unwrap();
        list.load_more().await.unwrap();

        let ids: Vec<u32> = list.items().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(!list.has_more());

        list.load_more().await.unwrap();
        list.load_more().await.unwrap();
        assert_eq!(script.calls(), 2);
        assert_eq!(script.cursors.borrow()[1].as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_refresh_leaves_exactly_one_page() {
        let script = Script::default();
        script.push(Ok(Page::new(vec![row(1), row(2)], Some("c1"), true)));
        script.push(Ok(Page::new(vec![row(3), row(4)], Some("c2"), true)));
        script.push(Ok(Page::new(vec![row(1), row(2)], Some("c1"), true)));
        let list = PagedList::new(script.clone());

        list.load_first_page().await.unwrap();
        list.load_more().await.unwrap();
        assert_eq!(list.len(), 4);

        list.refresh().await.unwrap();
        assert_eq!(list.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_keeps_newest_fields() {
        let script = Script::default();
        script.push(Ok(Page::new(vec![row(1), row(2)], Some("c1"), true)));
        script.push(Ok(Page::new(
            vec![Row { id: 2, label: "v2" }, row(3)],
            None,
            false,
        )));
        let list = PagedList::new(script);

        list.load_first_page().await.unwrap();
        list.load_more().await.unwrap();

        let items = list.items();
        assert_eq!(items.iter().filter(|r| r.id == 2).count(), 1);
        assert_eq!(list.find(&2).unwrap().label, "v2");
    }

    #[tokio::test]
    async fn test_cursor_expiry_stops_paging() {
        let script = Script::default();
        script.push(Ok(Page::new(vec![row(1)], Some("c1"), true)));
        script.push(Err(ApiError::CursorExpired));
        let list = PagedList::new(script.clone());

        list.load_first_page().await.unwrap();
        let err = list.load_more().await.unwrap_err();

        assert!(err.is_cursor_expired());
        assert!(list.is_cursor_expired());
        assert!(!list.has_more());
        list.load_more().await.unwrap();
        assert_eq!(script.calls(), 2);
        assert_eq!(list.len(), 1);
    }

    #[tokio::test]
    async fn test_first_page_failure() {
        let script = Script::default();
        script.push(Err(ApiError::Http(500)));
        let list = PagedList::new(script);

        let err = list.load_first_page().await.unwrap_err();

        assert_eq!(err, ApiError::Http(500));
        assert_eq!(list.state(), ResourceState::Error);
        assert!(!list.has_more());
    }
}
