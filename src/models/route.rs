//! Hash-based routing.
//!
//! URL format: `#/me/doc/42`, `#/files/7`, `#/login?redirect=/me/latest`.
//! Redirect targets are app paths, which never contain `?`, `&` or `#`,
//! so they are carried unencoded.

use crate::utils::dom;

/// Application routes for hash-based navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// Sign-in form, returning to `redirect` afterwards.
    Login { redirect: Option<String> },
    /// Workspace with the directory tree and no open document: `#/me`.
    Workspace,
    /// Workspace with a document open: `#/me/doc/{id}`.
    Document { id: i64 },
    /// Recently modified documents: `#/me/latest`.
    Latest,
    /// Searchable document list: `#/me/documents`.
    Documents,
    /// File manager at a folder (root when `None`): `#/files[/{id}]`.
    Files { folder: Option<i64> },
    /// Recycle bin: `#/recycle`.
    Recycle,
    /// Anything else.
    NotFound { path: String },
}

impl Route {
    /// Parse URL hash into Route.
    pub fn from_hash(hash: &str) -> Self {
        let raw = hash.trim_start_matches('#');
        let (path, query) = raw.split_once('?').unwrap_or((raw, ""));
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] | ["me"] => Self::Workspace,
            ["login"] => Self::Login {
                redirect: query_param(query, "redirect").and_then(sanitize_redirect),
            },
            ["me", "latest"] => Self::Latest,
            ["me", "documents"] => Self::Documents,
            ["me", "doc", id] => match id.parse() {
                Ok(id) => Self::Document { id },
                Err(_) => Self::not_found(path),
            },
            ["files"] => Self::Files { folder: None },
            ["files", id] => match id.parse() {
                Ok(id) => Self::Files { folder: Some(id) },
                Err(_) => Self::not_found(path),
            },
            ["recycle"] => Self::Recycle,
            _ => Self::not_found(path),
        }
    }

    fn not_found(path: &str) -> Self {
        Self::NotFound {
            path: path.to_string(),
        }
    }

    /// App path without the `#` ("/me/doc/3").
    pub fn path(&self) -> String {
        match self {
            Self::Login { redirect: None } => "/login".to_string(),
            Self::Login {
                redirect: Some(target),
            } => format!("/login?redirect={target}"),
            Self::Workspace => "/me".to_string(),
            Self::Document { id } => format!("/me/doc/{id}"),
            Self::Latest => "/me/latest".to_string(),
            Self::Documents => "/me/documents".to_string(),
            Self::Files { folder: None } => "/files".to_string(),
            Self::Files { folder: Some(id) } => format!("/files/{id}"),
            Self::Recycle => "/recycle".to_string(),
            Self::NotFound { path } => path.clone(),
        }
    }

    /// Convert Route to URL hash.
    pub fn to_hash(&self) -> String {
        format!("#{}", self.path())
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Login { .. })
    }

    pub fn is_login(&self) -> bool {
        matches!(self, Self::Login { .. })
    }

    /// Login route that returns here afterwards.
    pub fn login_redirect(&self) -> Self {
        if self.is_login() {
            return self.clone();
        }
        Self::Login {
            redirect: sanitize_redirect(&self.path()),
        }
    }

    /// Where to go after signing in.
    pub fn after_login(&self) -> Self {
        match self {
            Self::Login {
                redirect: Some(target),
            } => Self::from_hash(target),
            _ => Self::Workspace,
        }
    }

    /// Get current route from browser URL.
    pub fn current() -> Self {
        Self::from_hash(&dom::get_hash())
    }

    /// Navigate to this route (adds a history entry and fires `hashchange`).
    pub fn push(&self) {
        dom::set_hash(&self.to_hash());
    }

    /// Replace the current history entry with this route.
    pub fn replace(&self) {
        dom::replace_hash(&self.to_hash());
    }
}

fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

/// Accept only in-app paths that do not point back at the login page.
fn sanitize_redirect(target: &str) -> Option<String> {
    let target = target.trim();
    let valid = target.starts_with('/')
        && !target.starts_with("//")
        && !target.starts_with("/login")
        && !target.contains(['?', '#', '&']);
    valid.then(|| target.to_string())
}
