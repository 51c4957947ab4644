//! Per-folder content cache for the file manager.
//!
//! Each folder (and the root) has an entry holding its loaded children,
//! pagination cursor, query and load state. The cache decides whether a
//! navigation needs a request at all ([`FetchPlan`]) and stamps every
//! request with the entry's generation. Generations come from one counter
//! shared by all entries, so a response for an entry that was evicted and
//! recreated (or refreshed) in the meantime is recognized as stale.

use std::collections::HashMap;

use crate::core::error::ApiError;
use crate::core::pagination::{
    Completion, Keyed, LoadKind, Page, ResourceState, SortOrder, append_dedup,
};

/// Identifies a folder entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FolderKey {
    Root,
    Folder(i64),
}

impl FolderKey {
    pub fn from_id(id: Option<i64>) -> Self {
        id.map_or(Self::Root, Self::Folder)
    }

    pub fn id(self) -> Option<i64> {
        match self {
            Self::Root => None,
            Self::Folder(id) => Some(id),
        }
    }
}

/// Listing options for a folder.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FolderQuery {
    pub sort_field: String,
    pub order: SortOrder,
    pub keyword: String,
}

impl Default for FolderQuery {
    fn default() -> Self {
        Self {
            sort_field: "name".to_string(),
            order: SortOrder::Asc,
            keyword: String::new(),
        }
    }
}

impl FolderQuery {
    pub fn with_keyword(mut self, keyword: &str) -> Self {
        self.keyword = keyword.trim().to_string();
        self
    }

    pub fn is_search(&self) -> bool {
        !self.keyword.is_empty()
    }
}

/// Ticket for one folder request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderTicket {
    pub key: FolderKey,
    pub kind: LoadKind,
    pub cursor: Option<String>,
    pub query: FolderQuery,
    generation: u64,
}

/// What a navigation needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchPlan {
    /// Entry is loaded for this query; render from cache.
    Cached,
    /// The same request is already outstanding.
    InFlight,
    /// Send this request.
    Fetch(FolderTicket),
}

#[derive(Clone, Debug)]
pub struct FolderEntry<T> {
    items: Vec<T>,
    cursor: Option<String>,
    has_more: bool,
    total: Option<u64>,
    query: FolderQuery,
    state: ResourceState,
    error: Option<ApiError>,
    fetched_at: Option<f64>,
    generation: u64,
    in_flight: Option<FolderTicket>,
}

impl<T> FolderEntry<T> {
    fn new(generation: u64, query: FolderQuery) -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            has_more: true,
            total: None,
            query,
            state: ResourceState::Idle,
            error: None,
            fetched_at: None,
            generation,
            in_flight: None,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn query(&self) -> &FolderQuery {
        &self.query
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn fetched_at(&self) -> Option<f64> {
        self.fetched_at
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct FolderCache<T> {
    entries: HashMap<FolderKey, FolderEntry<T>>,
    next_generation: u64,
}

impl<T> Default for FolderCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            next_generation: 0,
        }
    }
}

impl<T: Keyed + Clone> FolderCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: FolderKey) -> Option<&FolderEntry<T>> {
        self.entries.get(&key)
    }

    pub fn items(&self, key: FolderKey) -> Vec<T> {
        self.entries
            .get(&key)
            .map(|entry| entry.items.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, key: FolderKey) -> bool {
        self.entries.contains_key(&key)
    }

    fn bump(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Decide what loading `key` with `query` requires.
    ///
    /// `force` ignores a loaded entry and re-queries from the first page.
    pub fn plan_fetch(&mut self, key: FolderKey, query: FolderQuery, force: bool) -> FetchPlan {
        let created = self.bump();
        let generation = self.bump();
        let entry = self
            .entries
            .entry(key)
            .or_insert_with(|| FolderEntry::new(created, query.clone()));

        if let Some(pending) = &entry.in_flight
            && pending.kind == LoadKind::First
            && pending.query == query
        {
            return FetchPlan::InFlight;
        }

        if !force && entry.state == ResourceState::Loaded && entry.query == query {
            tracing::debug!(?key, "folder served from cache");
            return FetchPlan::Cached;
        }

        entry.items.clear();
        entry.cursor = None;
        entry.has_more = true;
        entry.total = None;
        entry.error = None;
        entry.query = query.clone();
        entry.state = ResourceState::Loading;
        entry.generation = generation;

        let ticket = FolderTicket {
            key,
            kind: LoadKind::First,
            cursor: None,
            query,
            generation,
        };
        entry.in_flight = Some(ticket.clone());
        FetchPlan::Fetch(ticket)
    }

    /// Ticket for the next page of `key`, or `None` when nothing is left or
    /// a request is outstanding.
    pub fn plan_more(&mut self, key: FolderKey) -> Option<FolderTicket> {
        let entry = self.entries.get_mut(&key)?;
        if entry.in_flight.is_some() || !entry.has_more || entry.state != ResourceState::Loaded {
            return None;
        }
        let cursor = entry.cursor.clone()?;
        let ticket = FolderTicket {
            key,
            kind: LoadKind::More,
            cursor: Some(cursor),
            query: entry.query.clone(),
            generation: entry.generation,
        };
        entry.in_flight = Some(ticket.clone());
        Some(ticket)
    }

    /// Apply the response for `ticket`.
    pub fn complete(
        &mut self,
        ticket: &FolderTicket,
        result: Result<Page<T>, ApiError>,
        now: f64,
    ) -> Completion {
        let Some(entry) = self.entries.get_mut(&ticket.key) else {
            tracing::debug!(key = ?ticket.key, "response for evicted folder dropped");
            return Completion::Stale;
        };
        if entry.generation != ticket.generation || entry.in_flight.as_ref() != Some(ticket) {
            tracing::debug!(key = ?ticket.key, "stale folder response dropped");
            return Completion::Stale;
        }
        entry.in_flight = None;

        match (ticket.kind, result) {
            (kind, Ok(page)) => {
                if kind == LoadKind::First {
                    entry.items.clear();
                }
                append_dedup(&mut entry.items, page.items);
                entry.cursor = page.pagination.next_cursor;
                entry.has_more = page.pagination.has_more;
                if page.pagination.total.is_some() {
                    entry.total = page.pagination.total;
                }
                entry.state = ResourceState::Loaded;
                entry.fetched_at = Some(now);
                Completion::Applied
            }
            (LoadKind::More, Err(ApiError::CursorExpired)) => {
                tracing::warn!(key = ?ticket.key, "folder cursor expired");
                entry.has_more = false;
                entry.cursor = None;
                entry.error = Some(ApiError::CursorExpired);
                Completion::CursorExpired
            }
            (LoadKind::More, Err(err)) => {
                entry.error = Some(err.clone());
                Completion::Failed(err)
            }
            (LoadKind::First, Err(err)) => {
                entry.has_more = false;
                entry.state = ResourceState::Error;
                entry.error = Some(err.clone());
                Completion::Failed(err)
            }
        }
    }

    /// Drop the entry for `key`. Outstanding responses for it become stale.
    pub fn evict(&mut self, key: FolderKey) {
        if self.entries.remove(&key).is_some() {
            tracing::debug!(?key, "folder cache entry evicted");
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Apply `update` to every cached copy of the item with `item_key`.
    /// Returns how many copies were updated.
    pub fn patch_item(&mut self, item_key: &T::Key, update: impl Fn(&mut T)) -> usize {
        let mut patched = 0;
        for entry in self.entries.values_mut() {
            for item in entry.items.iter_mut().filter(|item| &item.key() == item_key) {
                update(item);
                patched += 1;
            }
        }
        patched
    }

    /// Remove the item with `item_key` from the entry for `key`.
    pub fn remove_item(&mut self, key: FolderKey, item_key: &T::Key) -> bool {
        let Some(entry) = self.entries.get_mut(&key) else {
            return false;
        };
        let before = entry.items.len();
        entry.items.retain(|item| &item.key() != item_key);
        let removed = entry.items.len() != before;
        if removed && let Some(total) = entry.total.as_mut() {
            *total = total.saturating_sub(1);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Entry {
        id: i64,
        name: &'static str,
    }

    impl Keyed for Entry {
        type Key = i64;

        fn key(&self) -> i64 {
            self.id
        }
    }

    fn entry(id: i64) -> Entry {
        Entry { id, name: "a" }
    }

    fn page(ids: &[i64], cursor: Option<&str>, more: bool) -> Page<Entry> {
        Page::new(ids.iter().copied().map(entry).collect(), cursor, more)
    }

    fn fetch(
        cache: &mut FolderCache<Entry>,
        key: FolderKey,
        query: FolderQuery,
        force: bool,
    ) -> FolderTicket {
        match cache.plan_fetch(key, query, force) {
            FetchPlan::Fetch(ticket) => ticket,
            other => panic!("expected fetch, got {other:?}"),
        }
    }

    fn ids(cache: &FolderCache<Entry>, key: FolderKey) -> Vec<i64> {
        cache.items(key).iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_second_visit_is_cached() {
        let mut cache = FolderCache::new();
        let ticket = fetch(&mut cache, FolderKey::Root, FolderQuery::default(), false);
        cache.complete(&ticket, Ok(page(&[1, 2], None, false)), 10.0);

        assert_eq!(
            cache.plan_fetch(FolderKey::Root, FolderQuery::default(), false),
            FetchPlan::Cached
        );
        assert_eq!(cache.get(FolderKey::Root).unwrap().fetched_at(), Some(10.0));
    }

    #[test]
    fn test_one_request_in_flight_per_key() {
        let mut cache = FolderCache::<Entry>::new();
        fetch(&mut cache, FolderKey::Folder(4), FolderQuery::default(), false);
        assert_eq!(
            cache.plan_fetch(FolderKey::Folder(4), FolderQuery::default(), false),
            FetchPlan::InFlight
        );
        assert_eq!(
            cache.plan_fetch(FolderKey::Folder(4), FolderQuery::default(), true),
            FetchPlan::InFlight
        );
        assert!(matches!(
            cache.plan_fetch(FolderKey::Folder(5), FolderQuery::default(), false),
            FetchPlan::Fetch(_)
        ));
    }

    #[test]
    fn test_force_refresh_resets_cursor() {
        let mut cache = FolderCache::new();
        let ticket = fetch(&mut cache, FolderKey::Root, FolderQuery::default(), false);
        cache.complete(&ticket, Ok(page(&[1, 2], Some("c1"), true)), 0.0);

        let refresh = fetch(&mut cache, FolderKey::Root, FolderQuery::default(), true);
        assert_eq!(refresh.cursor, None);
        let entry = cache.get(FolderKey::Root).unwrap();
        assert!(entry.items().is_empty());
        assert_eq!(entry.cursor(), None);
        assert!(entry.has_more());
    }

    #[test]
    fn test_keyword_change_supersedes_request() {
        let mut cache = FolderCache::new();
        let browse = fetch(&mut cache, FolderKey::Root, FolderQuery::default(), false);
        let search = fetch(
            &mut cache,
            FolderKey::Root,
            FolderQuery::default().with_keyword(" report "),
            false,
        );
        assert_eq!(search.query.keyword, "report");

        assert_eq!(cache.complete(&browse, Ok(page(&[1], None, false)), 0.0), Completion::Stale);
        assert_eq!(cache.complete(&search, Ok(page(&[7], None, false)), 0.0), Completion::Applied);
        assert_eq!(ids(&cache, FolderKey::Root), vec![7]);
    }

    #[test]
    fn test_evicted_entry_response_is_stale() {
        let mut cache = FolderCache::new();
        let old = fetch(&mut cache, FolderKey::Folder(3), FolderQuery::default(), false);
        cache.evict(FolderKey::Folder(3));
        assert_eq!(cache.complete(&old, Ok(page(&[1], None, false)), 0.0), Completion::Stale);

        let fresh = fetch(&mut cache, FolderKey::Folder(3), FolderQuery::default(), false);
        assert_eq!(cache.complete(&old, Ok(page(&[1], None, false)), 0.0), Completion::Stale);
        assert_eq!(cache.complete(&fresh, Ok(page(&[2], None, false)), 0.0), Completion::Applied);
        assert_eq!(ids(&cache, FolderKey::Folder(3)), vec![2]);
    }

    #[test]
    fn test_pages_append_with_dedup() {
        let mut cache = FolderCache::new();
        let first = fetch(&mut cache, FolderKey::Root, FolderQuery::default(), false);
        cache.complete(&first, Ok(page(&[1, 2], Some("c1"), true)), 0.0);

        let more = cache.plan_more(FolderKey::Root).unwrap();
        assert_eq!(more.cursor.as_deref(), Some("c1"));
        assert!(cache.plan_more(FolderKey::Root).is_none());
        cache.complete(&more, Ok(page(&[2, 3], None, false)), 0.0);

        assert_eq!(ids(&cache, FolderKey::Root), vec![1, 2, 3]);
        assert!(cache.plan_more(FolderKey::Root).is_none());
    }

    #[test]
    fn test_cursor_expiry_stops_paging() {
        let mut cache = FolderCache::new();
        let first = fetch(&mut cache, FolderKey::Root, FolderQuery::default(), false);
        cache.complete(&first, Ok(page(&[1], Some("c1"), true)), 0.0);
        let more = cache.plan_more(FolderKey::Root).unwrap();

        let outcome = cache.complete(&more, Err(ApiError::CursorExpired), 0.0);

        assert_eq!(outcome, Completion::CursorExpired);
        assert!(!cache.get(FolderKey::Root).unwrap().has_more());
        assert!(cache.plan_more(FolderKey::Root).is_none());
    }

    #[test]
    fn test_first_page_error_state() {
        let mut cache = FolderCache::<Entry>::new();
        let ticket = fetch(&mut cache, FolderKey::Root, FolderQuery::default(), false);
        cache.complete(&ticket, Err(ApiError::Http(500)), 0.0);

        let entry = cache.get(FolderKey::Root).unwrap();
        assert_eq!(entry.state(), ResourceState::Error);
        assert!(!entry.has_more());
        assert!(matches!(
            cache.plan_fetch(FolderKey::Root, FolderQuery::default(), false),
            FetchPlan::Fetch(_)
        ));
    }

    #[test]
    fn test_patch_and_remove_item() {
        let mut cache = FolderCache::new();
        for key in [FolderKey::Root, FolderKey::Folder(1)] {
            let ticket = fetch(&mut cache, key, FolderQuery::default(), false);
            cache.complete(&ticket, Ok(page(&[5, 6], None, false).with_total(2)), 0.0);
        }

        assert_eq!(cache.patch_item(&5, |e| e.name = "renamed"), 2);
        assert!(cache.items(FolderKey::Folder(1)).iter().any(|e| e.name == "renamed"));

        assert!(cache.remove_item(FolderKey::Root, &6));
        assert_eq!(ids(&cache, FolderKey::Root), vec![5]);
        assert_eq!(cache.get(FolderKey::Root).unwrap().total(), Some(1));

        cache.clear();
        assert!(!cache.contains(FolderKey::Root));
    }

    #[test]
    fn test_folder_key_ids() {
        assert_eq!(FolderKey::from_id(None), FolderKey::Root);
        assert_eq!(FolderKey::from_id(Some(9)).id(), Some(9));
    }
}
