//! Client-side core logic, independent of the view layer.
//!
//! This module provides:
//! - [`http`] - Envelope-aware REST client over a pluggable transport
//! - [`pagination`] - Cursor pagination state machine
//! - [`folder_cache`] - Per-folder content cache for the file manager
//! - [`tree`] - Directory tree model and traversal
//! - [`autosave`] - Editor sync state machine
//! - [`session`] - Access token holder
//! - [`storage`] - localStorage persistence

pub mod autosave;
pub mod error;
pub mod folder_cache;
pub mod http;
pub mod pagination;
pub mod session;
pub mod storage;
pub mod tree;

pub use error::{ApiError, StorageError, TransportError};
pub use http::{ApiClient, ApiRequest, BrowserTransport, Transport};
pub use pagination::{CursorPager, Keyed, Page, PageInfo, ResourceState, SortOrder};
