//! Application configuration.
//!
//! Centralizes all configuration constants used throughout the application.

// =============================================================================
// Application Metadata
// =============================================================================

/// Application name shown in the header and page title.
pub const APP_NAME: &str = "Folio";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Network Configuration
// =============================================================================

/// Base URL of the REST API, overridable at build time.
pub const API_BASE_URL: &str = match option_env!("FOLIO_API_BASE_URL") {
    Some(url) => url,
    None => "http://localhost:8080",
};

/// Fetch request timeout in milliseconds.
pub const FETCH_TIMEOUT_MS: u32 = 30_000;

/// Response header carrying a rotated access token.
pub const ROTATED_TOKEN_HEADER: &str = "x-new-token";

/// Delay before the 401 gate accepts another unauthorized response.
pub const UNAUTHORIZED_RESET_MS: u32 = 1000;

// =============================================================================
// Pagination
// =============================================================================

/// Page size of the document list.
pub const DOCUMENT_PAGE_SIZE: u32 = 20;

/// Page size of the latest documents feed.
pub const LATEST_PAGE_SIZE: u32 = 20;

/// Page size of folder listings.
pub const FOLDER_PAGE_SIZE: u32 = 50;

/// Page size of the recycle bin.
pub const RECYCLE_PAGE_SIZE: u32 = 50;

// =============================================================================
// Editor
// =============================================================================

/// Delay after the last edit before the document is saved.
pub const AUTO_SAVE_DEBOUNCE_MS: u32 = 1000;

/// Placeholder title for documents without one.
pub const UNTITLED_DOCUMENT: &str = "Untitled";

// =============================================================================
// Upload Limits
// =============================================================================

const MB: u64 = 1024 * 1024;

/// Maximum image upload size.
pub const MAX_IMAGE_SIZE: u64 = 10 * MB;

/// Maximum attachment (and document file) upload size.
pub const MAX_ATTACHMENT_SIZE: u64 = 50 * MB;

/// Maximum size of a zip archive for batch document upload.
pub const MAX_BATCH_ZIP_SIZE: u64 = 100 * MB;

/// Maximum size of a text file opened in the inline editor.
pub const MAX_EDITABLE_SIZE: u64 = 2 * MB;

// =============================================================================
// Storage Keys
// =============================================================================

/// localStorage key for the theme preference.
pub const THEME_KEY: &str = "theme";

/// localStorage key mirroring the access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// localStorage key for the cached user profile.
pub const USER_INFO_KEY: &str = "userInfo";

// =============================================================================
// UI
// =============================================================================

/// Icon set used across the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(dead_code)]
pub enum IconTheme {
    #[default]
    Lucide,
    Bootstrap,
}

/// Current icon theme.
pub const ICON_THEME: IconTheme = IconTheme::Lucide;

/// How long a toast stays on screen.
pub const TOAST_DURATION_MS: u32 = 3000;

/// Viewport width below which the sidebar starts collapsed.
pub const NARROW_VIEWPORT_QUERY: &str = "(max-width: 768px)";

/// Days left before purge at or below which a recycle bin badge turns red.
pub const RECYCLE_ALERT_DAYS: i64 = 3;

/// Days left before purge at or below which a recycle bin badge turns amber.
pub const RECYCLE_WARN_DAYS: i64 = 7;

// =============================================================================
// Logging
// =============================================================================

/// Maximum log level written to the browser console.
pub const LOG_LEVEL: tracing::Level = if cfg!(debug_assertions) {
    tracing::Level::DEBUG
} else {
    tracing::Level::INFO
};
