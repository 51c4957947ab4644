//! Toasts, theme and sidebar state.

use leptos::prelude::*;

use crate::config::THEME_KEY;
use crate::core::error::ApiError;
use crate::core::storage;
use crate::utils::dom;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

#[derive(Clone, Copy)]
pub struct UiStore {
    pub toasts: RwSignal<Vec<Toast>>,
    pub theme: RwSignal<Theme>,
    pub sidebar_collapsed: RwSignal<bool>,
    next_toast: RwSignal<u64>,
}

impl UiStore {
    /// Restore the persisted theme and apply it to the document root.
    pub fn new() -> Self {
        let theme = storage::get(THEME_KEY)
            .and_then(|value| Theme::parse(&value))
            .unwrap_or_default();
        dom::set_root_attribute("data-theme", theme.as_str());
        Self {
            toasts: RwSignal::new(Vec::new()),
            theme: RwSignal::new(theme),
            sidebar_collapsed: RwSignal::new(false),
            next_toast: RwSignal::new(0),
        }
    }

    pub fn set_theme(&self, theme: Theme) {
        self.theme.set(theme);
        dom::set_root_attribute("data-theme", theme.as_str());
        if let Err(err) = storage::set(THEME_KEY, theme.as_str()) {
            tracing::warn!(error = %err, "failed to persist theme");
        }
    }

    pub fn toggle_theme(&self) {
        self.set_theme(self.theme.get_untracked().toggled());
    }

    pub fn toggle_sidebar(&self) {
        self.sidebar_collapsed.update(|collapsed| *collapsed = !*collapsed);
    }

    /// Show a toast that dismisses itself after `TOAST_DURATION_MS`.
    pub fn toast(&self, kind: ToastKind, message: impl Into<String>) -> u64 {
        let id = self
            .next_toast
            .try_update(|next| {
                *next += 1;
                *next
            })
            .unwrap_or_default();
        self.toasts.update(|toasts| {
            toasts.push(Toast {
                id,
                kind,
                message: message.into(),
            })
        });
        self.schedule_dismiss(id);
        id
    }

    pub fn success(&self, message: impl Into<String>) {
        self.toast(ToastKind::Success, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.toast(ToastKind::Info, message);
    }

    /// Report a failed action. An expired session is not reported: the
    /// sign-in redirect already says it.
    pub fn error(&self, err: &ApiError) {
        if err.is_unauthorized() {
            return;
        }
        self.toast(ToastKind::Error, err.to_string());
    }

    /// Report the error of `result`, if any.
    pub fn report<R>(&self, result: Result<R, ApiError>) -> Option<R> {
        result.inspect_err(|err| self.error(err)).ok()
    }

    pub fn dismiss(&self, id: u64) {
        self.toasts.update(|toasts| toasts.retain(|toast| toast.id != id));
    }

    #[cfg(target_arch = "wasm32")]
    fn schedule_dismiss(&self, id: u64) {
        let store = *self;
        gloo_timers::callback::Timeout::new(crate::config::TOAST_DURATION_MS, move || {
            store.dismiss(id)
        })
        .forget();
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn schedule_dismiss(&self, _id: u64) {}
}

impl Default for UiStore {
    fn default() -> Self {
        Self::new()
    }
}
