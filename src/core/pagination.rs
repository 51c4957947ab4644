//! Cursor pagination engine.
//!
//! [`CursorPager`] is a sans-io state machine: callers ask it for a
//! [`Ticket`] before sending a request and hand the result back with
//! [`CursorPager::complete`]. Tickets carry an epoch, so a response that
//! arrives after a refresh or reset is reported as [`Completion::Stale`] and
//! changes nothing. The async driver lives in `stores::paged`.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::core::error::ApiError;

// =============================================================================
// Page Types
// =============================================================================

/// Items that can be deduplicated by key.
pub trait Keyed {
    type Key: Eq + Hash + Clone + Debug;

    fn key(&self) -> Self::Key;
}

/// Pagination metadata returned by listing endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub total: Option<u64>,
}

/// One page of a cursor listing.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new", alias = "files")]
    pub items: Vec<T>,
    #[serde(default)]
    pub pagination: PageInfo,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<&str>, has_more: bool) -> Self {
        Self {
            items,
            pagination: PageInfo {
                next_cursor: next_cursor.map(str::to_string),
                has_more,
                total: None,
            },
        }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.pagination.total = Some(total);
        self
    }
}

/// Sort direction accepted by listing endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Lifecycle of a remotely loaded resource.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResourceState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error,
}

/// Append with key dedup: an existing copy is removed and the fetched one
/// goes to the end.
pub fn append_dedup<T: Keyed>(items: &mut Vec<T>, fetched: Vec<T>) {
    for item in fetched {
        let key = item.key();
        items.retain(|existing| existing.key() != key);
        items.push(item);
    }
}

// =============================================================================
// Pager
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadKind {
    First,
    More,
}

/// Identifies one outstanding request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    kind: LoadKind,
    cursor: Option<String>,
}

impl Ticket {
    pub fn kind(&self) -> LoadKind {
        self.kind
    }

    /// Cursor to send with the request (`None` for the first page).
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }
}

/// Outcome of handing a response back to the pager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    /// The page was applied.
    Applied,
    /// The response belongs to a superseded request and was dropped.
    Stale,
    /// The request failed.
    Failed(ApiError),
    /// The cursor expired; pagination stopped until a refresh.
    CursorExpired,
}

impl Completion {
    pub fn into_result(self) -> Result<(), ApiError> {
        match self {
            Self::Applied | Self::Stale => Ok(()),
            Self::Failed(err) => Err(err),
            Self::CursorExpired => Err(ApiError::CursorExpired),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CursorPager<T: Keyed> {
    items: Vec<T>,
    cursor: Option<String>,
    has_more: bool,
    total: Option<u64>,
    state: ResourceState,
    error: Option<ApiError>,
    epoch: u64,
    in_flight: Option<Ticket>,
    reset_on_error: bool,
    cursor_expired: bool,
}

impl<T: Keyed> Default for CursorPager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Keyed> CursorPager<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            has_more: true,
            total: None,
            state: ResourceState::Idle,
            error: None,
            epoch: 0,
            in_flight: None,
            reset_on_error: false,
            cursor_expired: false,
        }
    }

    /// Drop loaded items when the first page fails instead of keeping them.
    pub fn reset_on_error(mut self) -> Self {
        self.reset_on_error = true;
        self
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
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

    pub fn state(&self) -> ResourceState {
        self.state
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_cursor_expired(&self) -> bool {
        self.cursor_expired
    }

    pub fn can_load_more(&self) -> bool {
        self.has_more && self.cursor.is_some() && self.in_flight.is_none()
    }

    /// Start loading the first page. Supersedes any outstanding request.
    pub fn begin_first(&mut self) -> Ticket {
        self.epoch += 1;
        let ticket = Ticket {
            epoch: self.epoch,
            kind: LoadKind::First,
            cursor: None,
        };
        self.in_flight = Some(ticket.clone());
        self.state = ResourceState::Loading;
        self.error = None;
        ticket
    }

    /// Start loading the next page, or `None` when there is nothing to do.
    pub fn begin_more(&mut self) -> Option<Ticket> {
        if !self.can_load_more() {
            return None;
        }
        let ticket = Ticket {
            epoch: self.epoch,
            kind: LoadKind::More,
            cursor: self.cursor.clone(),
        };
        self.in_flight = Some(ticket.clone());
        self.state = ResourceState::Loading;
        self.error = None;
        Some(ticket)
    }

    /// Clear everything and start over from the first page.
    pub fn refresh(&mut self) -> Ticket {
        self.reset();
        self.begin_first()
    }

    /// Clear everything. Outstanding responses become stale.
    pub fn reset(&mut self) {
        self.items.clear();
        self.cursor = None;
        self.has_more = true;
        self.total = None;
        self.state = ResourceState::Idle;
        self.error = None;
        self.epoch += 1;
        self.in_flight = None;
        self.cursor_expired = false;
    }

    /// Apply the result of the request identified by `ticket`.
    pub fn complete(&mut self, ticket: &Ticket, result: Result<Page<T>, ApiError>) -> Completion {
        if ticket.epoch != self.epoch || self.in_flight.as_ref() != Some(ticket) {
            tracing::debug!(kind = ?ticket.kind, "dropping stale page response");
            return Completion::Stale;
        }
        self.in_flight = None;

        match (ticket.kind, result) {
            (kind, Ok(page)) => {
                if kind == LoadKind::First {
                    self.items.clear();
                }
                append_dedup(&mut self.items, page.items);
                self.cursor = page.pagination.next_cursor;
                self.has_more = page.pagination.has_more;
                self.total = page.pagination.total;
                self.state = ResourceState::Loaded;
                self.cursor_expired = false;
                Completion::Applied
            }
            (LoadKind::More, Err(ApiError::CursorExpired)) => {
                tracing::warn!("pagination cursor expired, list needs a refresh");
                self.has_more = false;
                self.cursor = None;
                self.cursor_expired = true;
                self.state = ResourceState::Error;
                self.error = Some(ApiError::CursorExpired);
                Completion::CursorExpired
            }
            (LoadKind::More, Err(err)) => {
                self.state = ResourceState::Error;
                self.error = Some(err.clone());
                Completion::Failed(err)
            }
            (LoadKind::First, Err(err)) => {
                self.has_more = false;
                if self.reset_on_error {
                    self.items.clear();
                    self.cursor = None;
                    self.total = None;
                }
                self.state = ResourceState::Error;
                self.error = Some(err.clone());
                Completion::Failed(err)
            }
        }
    }

    // =========================================================================
    // Local list edits
    // =========================================================================

    /// Insert a newly created item at the front.
    pub fn prepend(&mut self, item: T) {
        let existed = self.take(&item.key()).is_some();
        self.items.insert(0, item);
        if !existed {
            self.bump_total(1);
        }
    }

    /// Move (or insert) an item to the front.
    ///
    /// A newly inserted item pushes the last loaded item back onto the
    /// server side while more pages remain, so the next page does not skip
    /// anything.
    pub fn promote(&mut self, item: T) {
        let before = self.items.len();
        let existed = self.take(&item.key()).is_some();
        self.items.insert(0, item);
        if !existed {
            self.bump_total(1);
            if before > 0 && self.has_more {
                self.items.pop();
            }
        }
    }

    /// Apply `update` to the item with `key`. Returns whether it was found.
    pub fn update_item(&mut self, key: &T::Key, update: impl FnOnce(&mut T)) -> bool {
        match self.items.iter_mut().find(|item| &item.key() == key) {
            Some(item) => {
                update(item);
                true
            }
            None => false,
        }
    }

    /// Remove the item with `key`.
    pub fn remove(&mut self, key: &T::Key) -> Option<T> {
        let removed = self.take(key);
        if removed.is_some() {
            self.bump_total(-1);
        }
        removed
    }

    /// Remove every item whose key is in `keys`. Returns how many were removed.
    pub fn remove_many(&mut self, keys: &[T::Key]) -> usize {
        let keys: HashSet<&T::Key> = keys.iter().collect();
        let before = self.items.len();
        self.items.retain(|item| !keys.contains(&item.key()));
        let removed = before - self.items.len();
        self.bump_total(-(removed as i64));
        removed
    }

    pub fn find(&self, key: &T::Key) -> Option<&T> {
        self.items.iter().find(|item| &item.key() == key)
    }

    fn take(&mut self, key: &T::Key) -> Option<T> {
        let index = self.items.iter().position(|item| &item.key() == key)?;
        Some(self.items.remove(index))
    }

    fn bump_total(&mut self, delta: i64) {
        if let Some(total) = self.total.as_mut() {
            *total = total.saturating_add_signed(delta);
        }
    }
}
