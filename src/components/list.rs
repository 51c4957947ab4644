//! Pieces shared by the cursor-paginated lists.

use leptos::prelude::*;
use leptos_icons::Icon;

use crate::components::icons as ic;
use crate::models::{Document, Route};
use crate::utils::format::format_datetime;

/// Footer of a paginated list: load more, loading, end of list, or the
/// refresh offer after the cursor expired.
#[component]
pub fn ListFooter(
    #[prop(into)] has_more: Signal<bool>,
    #[prop(into)] loading: Signal<bool>,
    #[prop(into)] expired: Signal<bool>,
    #[prop(into)] error: Signal<Option<String>>,
    #[prop(into)] empty: Signal<bool>,
    on_more: Callback<()>,
    on_refresh: Callback<()>,
) -> impl IntoView {
    view! {
        <div class="list-footer">
            {move || {
                if loading.get() {
                    view! { <span class="muted">"Loading…"</span> }.into_any()
                } else if expired.get() {
                    view! {
                        <span class="muted">"This list changed on the server."</span>
                        <button class="btn" on:click=move |_| on_refresh.run(())>
                            <Icon icon=ic::REFRESH />
                            "Refresh"
                        </button>
                    }
                    .into_any()
                } else if let Some(message) = error.get() {
                    view! {
                        <span class="error-text">{message}</span>
                        <button class="btn" on:click=move |_| on_refresh.run(())>"Try again"</button>
                    }
                    .into_any()
                } else if has_more.get() {
                    view! {
                        <button class="btn" on:click=move |_| on_more.run(())>"Load more"</button>
                    }
                    .into_any()
                } else if empty.get() {
                    view! { <span class="muted">"Nothing here yet"</span> }.into_any()
                } else {
                    view! { <span class="muted">"End of list"</span> }.into_any()
                }
            }}
        </div>
    }
}

#[component]
pub fn DocumentRow(document: Document) -> impl IntoView {
    let status_class = if document.is_published() {
        "badge badge-safe"
    } else {
        "badge"
    };

    view! {
        <li class="doc-row">
            <a class="doc-title" href=Route::Document { id: document.id }.to_hash()>
                {document.display_title().to_string()}
            </a>
            <span class="badge">{document.doc_type.label()}</span>
            <span class=status_class>{document.status.label()}</span>
            <span class="muted">{format_datetime(document.updated_at.as_deref())}</span>
        </li>
    }
}
