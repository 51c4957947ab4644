//! Data models and types for the application.
//!
//! Contains domain types for:
//! - [`Document`], [`DocType`], [`DocumentQuery`] - Documents and groups
//! - [`FolderChild`], [`FileItem`], [`FolderItem`] - File manager listings
//! - [`User`], [`TokenGrant`] - Authentication
//! - [`Route`] - Hash-based navigation

mod document;
mod file;
mod route;
mod user;

pub use document::{
    BatchUploadReport, DocSortBy, DocStatus, DocType, Document, DocumentPatch, DocumentQuery,
    Group, GroupPayload, SortItem,
};
pub use file::{
    ChildKey, FileItem, FilePatch, FolderChild, FolderItem, FolderPath, FolderPayload,
    PathSegment, RootFolder, ViewLayout,
};
pub use route::Route;
pub use user::{Credentials, TokenGrant, User};
