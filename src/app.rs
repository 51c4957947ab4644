//! Root application module.
//!
//! Contains the main App component and the AppContext that owns every
//! store, plus the session-level wiring (401 handler, cross-tab sync,
//! startup recovery).

use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::AppRouter;
use crate::config::API_BASE_URL;
use crate::core::{ApiClient, BrowserTransport};
use crate::stores::{
    AuthStore, DocStore, DocumentList, FileStore, LatestDocuments, RecycleBin, TreeStore, UiStore,
};

// ============================================================================
// AppContext
// ============================================================================

/// Application-wide context.
///
/// Provided at the root of the component tree and accessed from any child
/// with `use_context::<AppContext>()`. Every store shares one [`ApiClient`],
/// so they all see the same session token and 401 gate.
#[derive(Clone)]
pub struct AppContext {
    pub client: ApiClient<BrowserTransport>,
    pub auth: AuthStore,
    pub latest: LatestDocuments,
    pub doc: DocStore,
    pub tree: TreeStore,
    pub documents: DocumentList,
    pub files: FileStore,
    pub recycle: RecycleBin,
    pub ui: UiStore,
}

impl AppContext {
    pub fn new() -> Self {
        let client = ApiClient::new(BrowserTransport::default(), API_BASE_URL);
        let auth = AuthStore::new(client.clone());
        let latest = LatestDocuments::new(client.clone(), auth.clone());
        let doc = DocStore::new(client.clone(), auth.clone(), latest.clone());
        let tree = TreeStore::new(client.clone(), auth.clone(), doc.clone(), latest.clone());

        Self {
            documents: DocumentList::new(client.clone(), auth.clone()),
            files: FileStore::new(client.clone(), auth.clone()),
            recycle: RecycleBin::new(client.clone(), auth.clone()),
            ui: UiStore::new(),
            client,
            auth,
            latest,
            doc,
            tree,
        }
    }

    /// Drop everything loaded for the signed-in user.
    pub fn reset_user_state(&self) {
        self.doc.close();
        self.latest.teardown();
        self.tree.reset();
        self.documents.list().reset();
        self.files.reset();
        self.recycle.list().reset();
    }

    /// Sign out on the server and locally.
    pub async fn logout(&self) {
        self.auth.logout().await;
        self.reset_user_state();
    }

    /// First 401 of a burst: forget the session. The router's auth guard
    /// then sends the user to the login page.
    fn install_unauthorized_handler(&self) {
        let ctx = self.clone();
        self.client.set_unauthorized_handler(move || {
            tracing::warn!("session rejected by server");
            ctx.auth.clear();
            ctx.reset_user_state();
        });
    }

    /// Follow sign-in and sign-out in other tabs.
    fn listen_to_other_tabs(&self) {
        let ctx = self.clone();
        let _listener = window_event_listener(ev::storage, move |event| {
            let Some(key) = event.key() else {
                return;
            };
            if ctx.auth.apply_storage_change(&key, event.new_value()) {
                ctx.reset_user_state();
            }
        });
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Root application component with error boundary.
///
/// This component:
/// - Creates and provides the global AppContext
/// - Restores the session from storage or the refresh cookie
/// - Renders the router inside an ErrorBoundary
#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext::new();
    ctx.install_unauthorized_handler();
    ctx.listen_to_other_tabs();
    provide_context(ctx.clone());

    let auth = ctx.auth.clone();
    spawn_local(async move {
        auth.init().await;
    });

    view! {
        <ErrorBoundary
            fallback=|errors| view! {
                <div class="fatal">
                    <h1>"Something went wrong"</h1>
                    <p>"An unexpected error occurred. Please try reloading the page."</p>
                    <details>
                        <summary>"Error details"</summary>
                        <ul>
                            {move || errors.get()
                                .into_iter()
                                .map(|(_, e)| view! { <li>{e.to_string()}</li> })
                                .collect::<Vec<_>>()
                            }
                        </ul>
                    </details>
                    <button
                        class="btn btn-primary"
                        on:click=move |_| {
                            if let Some(window) = web_sys::window() {
                                let _ = window.location().reload();
                            }
                        }
                    >
                        "Reload Page"
                    </button>
                </div>
            }
        >
            <AppRouter />
        </ErrorBoundary>
    }
}
