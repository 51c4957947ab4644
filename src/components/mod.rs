//! UI components built with Leptos.
//!
//! - [`router`] - Hash routing and the auth guard (main entry point)
//! - [`layout`] - Signed-in shell: header, sidebar, section pane
//! - [`workspace`] - Directory tree and document editor
//! - [`latest`], [`documents`] - Document lists
//! - [`files`] - File manager and recycle bin
//! - [`icons`] - Centralized icon definitions (change theme here)

pub mod documents;
pub mod files;
pub mod icons;
pub mod latest;
pub mod layout;
pub mod list;
pub mod login;
pub mod router;
pub mod toast;
pub mod workspace;

pub use router::AppRouter;
