//! Recently modified documents.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::components::list::{DocumentRow, ListFooter};

#[component]
pub fn LatestPage() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let ui = ctx.ui;
    let latest = ctx.latest.clone();
    let list = latest.list().clone();

    let on_more = Callback::new({
        let latest = latest.clone();
        move |()| {
            let latest = latest.clone();
            spawn_local(async move {
                ui.report(latest.load_more().await);
            });
        }
    });
    let on_refresh = Callback::new(move |()| {
        let latest = latest.clone();
        spawn_local(async move {
            ui.report(latest.refresh().await);
        });
    });

    let items = list.clone();
    let has_more = list.clone();
    let loading = list.clone();
    let expired = list.clone();
    let error = list.clone();
    let total = list.clone();

    view! {
        <section class="page">
            <header class="page-header">
                <h2>"Latest"</h2>
                <span class="muted">
                    {move || total.total().map(|n| format!("{n} documents")).unwrap_or_default()}
                </span>
                <button class="icon-btn" title="Refresh" on:click=move |_| on_refresh.run(())>
                    <Icon icon=ic::REFRESH />
                </button>
            </header>
            <ul class="doc-list">
                <For
                    each=move || items.items()
                    key=|doc| (doc.id, doc.title.clone(), doc.status, doc.updated_at.clone())
                    children=|doc| view! { <DocumentRow document=doc /> }
                />
            </ul>
            <ListFooter
                has_more=Signal::derive(move || has_more.has_more())
                loading=Signal::derive(move || loading.is_loading())
                expired=Signal::derive(move || expired.is_cursor_expired())
                error=Signal::derive(move || error.error().map(|e| e.to_string()))
                empty=Signal::derive(move || list.is_empty())
                on_more=on_more
                on_refresh=on_refresh
            />
        </section>
    }
}
