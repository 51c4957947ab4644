//! Workspace: directory tree plus the document editor.
//!
//! - [`DirectoryTree`] - Sidebar with groups and documents
//! - [`Editor`] - Editor/viewer for the open document

mod editor;
mod tree;

pub use editor::Editor;
pub use tree::DirectoryTree;

use leptos::prelude::*;

use crate::app::AppContext;
use crate::components::router::RouteContext;
use crate::models::Route;
use crate::utils::format::format_datetime;

/// Number of recent documents offered on the empty workspace.
const RECENT_COUNT: usize = 8;

#[component]
pub fn WorkspacePane() -> impl IntoView {
    let route_ctx = use_context::<RouteContext>().expect("RouteContext must be provided");
    let has_document =
        Memo::new(move |_| route_ctx.0.with(|r| matches!(r, Route::Document { .. })));

    view! {
        <Show when=move || has_document.get() fallback=|| view! { <Welcome /> }>
            <Editor />
        </Show>
    }
}

#[component]
fn Welcome() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let latest = ctx.latest.clone();
    let recent = move || {
        latest
            .list()
            .items()
            .into_iter()
            .take(RECENT_COUNT)
            .collect::<Vec<_>>()
    };

    view! {
        <div class="welcome">
            <h2>"Pick a document from the tree"</h2>
            <p class="muted">"Or continue with one of your recent documents."</p>
            <ul class="recent">
                <For
                    each=recent
                    key=|doc| (doc.id, doc.updated_at.clone())
                    children=|doc| view! {
                        <li>
                            <a href=Route::Document { id: doc.id }.to_hash()>
                                {doc.display_title().to_string()}
                            </a>
                            <span class="muted">{format_datetime(doc.updated_at.as_deref())}</span>
                        </li>
                    }
                />
            </ul>
        </div>
    }
}
