//! Application router component.
//!
//! Handles URL-based routing with hash history. Uses native hashchange
//! events instead of leptos_router for true hash routing.
//!
//! # Architecture
//!
//! - **URL hash is the source of truth**: navigation state is derived from `#/path`
//! - **Layout never re-renders on navigation**: only the section pane swaps
//! - **Auth guard**: protected routes redirect to `#/login?redirect=<path>`
//!   once the session is known; the login page forwards signed-in users
//! - **hashchange events**: browser back/forward buttons work automatically

use leptos::prelude::*;
use leptos::task::spawn_local;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::Closure;

use crate::app::AppContext;
use crate::components::layout::Layout;
use crate::components::login::LoginPage;
use crate::components::toast::ToastHost;
use crate::config::APP_NAME;
use crate::core::tree::NodeType;
use crate::models::Route;
use crate::utils::dom;

/// Current route, provided by [`AppRouter`].
#[derive(Clone, Copy)]
pub struct RouteContext(pub RwSignal<Route>);

impl RouteContext {
    /// Replace the current history entry. `replaceState` fires no
    /// `hashchange`, so the signal is updated here.
    pub fn redirect(&self, route: Route) {
        route.replace();
        self.0.set(route);
    }

    pub fn section(&self) -> Section {
        self.0.with(Section::of)
    }
}

/// Top-level pane of the signed-in layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Workspace,
    Latest,
    Documents,
    Files,
    Recycle,
    NotFound,
}

impl Section {
    pub fn of(route: &Route) -> Self {
        match route {
            Route::Workspace | Route::Document { .. } | Route::Login { .. } => Self::Workspace,
            Route::Latest => Self::Latest,
            Route::Documents => Self::Documents,
            Route::Files { .. } => Self::Files,
            Route::Recycle => Self::Recycle,
            Route::NotFound { .. } => Self::NotFound,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Workspace => "Workspace",
            Self::Latest => "Latest",
            Self::Documents => "Documents",
            Self::Files => "Files",
            Self::Recycle => "Recycle bin",
            Self::NotFound => "Not found",
        }
    }

    /// Sections that show the directory tree beside them.
    pub fn has_tree(self) -> bool {
        matches!(self, Self::Workspace | Self::Latest | Self::Documents)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Screen {
    Starting,
    Login,
    App,
    Redirecting,
}

// ============================================================================
// Main Router
// ============================================================================

/// Main application router.
///
/// - `#/login` → sign-in form
/// - `#/me`, `#/me/doc/{id}`, `#/me/latest`, `#/me/documents` → workspace
/// - `#/files[/{id}]` → file manager
/// - `#/recycle` → recycle bin
#[component]
pub fn AppRouter() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let route = RwSignal::new(Route::current());
    let route_ctx = RouteContext(route);
    provide_context(route_ctx);

    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;
        let closure = Closure::wrap(Box::new(move || {
            route.set(Route::current());
        }) as Box<dyn Fn()>);

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref());
        }

        // Keep the closure alive for the lifetime of the app
        closure.forget();
    }

    let auth = ctx.auth.state();

    // Auth guard
    Effect::new(move |_| {
        if !auth.initialized.get() {
            return;
        }
        let current = route.get();
        let signed_in = auth.is_authenticated();
        if current.requires_auth() && !signed_in {
            tracing::debug!(path = %current.path(), "redirecting to login");
            route_ctx.redirect(current.login_redirect());
        } else if current.is_login() && signed_in {
            route_ctx.redirect(current.after_login());
        }
    });

    // The document route drives the editor
    let doc = ctx.doc.clone();
    let tree = ctx.tree.clone();
    let ui = ctx.ui;
    Effect::new(move |_| {
        if !auth.initialized.get() || !auth.is_authenticated() {
            return;
        }
        match route.get() {
            Route::Document { id } => {
                let doc = doc.clone();
                let tree = tree.clone();
                spawn_local(async move {
                    if ui.report(doc.open(id).await).is_some() {
                        tree.reveal(id, NodeType::Document);
                    }
                });
            }
            Route::Workspace => doc.close(),
            _ => {}
        }
    });

    Effect::new(move |_| {
        let section = route.with(Section::of);
        let title = if route.with(Route::is_login) {
            "Sign in"
        } else {
            section.title()
        };
        dom::set_title(&format!("{title} · {APP_NAME}"));
    });

    let screen = Memo::new(move |_| {
        if !auth.initialized.get() {
            Screen::Starting
        } else if route.with(Route::is_login) {
            Screen::Login
        } else if auth.is_authenticated() {
            Screen::App
        } else {
            Screen::Redirecting
        }
    });

    view! {
        {move || match screen.get() {
            Screen::Starting => view! { <div class="splash">"Loading…"</div> }.into_any(),
            Screen::Login => view! { <LoginPage /> }.into_any(),
            Screen::App => view! { <Layout /> }.into_any(),
            Screen::Redirecting => ().into_any(),
        }}
        <ToastHost />
    }
}
