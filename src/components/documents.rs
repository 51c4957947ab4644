//! Searchable, filterable document list.

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::components::list::{DocumentRow, ListFooter};
use crate::core::{ResourceState, SortOrder};
use crate::models::DocSortBy;

#[component]
pub fn DocumentsPage() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let ui = ctx.ui;
    let documents = ctx.documents.clone();
    let list = documents.list().clone();
    let keyword = RwSignal::new(documents.list().source().query().get_untracked().q);

    if list.state() == ResourceState::Idle {
        let documents = documents.clone();
        spawn_local(async move {
            ui.report(documents.load().await);
        });
    }

    let on_search = {
        let documents = documents.clone();
        move |ev: SubmitEvent| {
            ev.prevent_default();
            let documents = documents.clone();
            spawn_local(async move {
                ui.report(documents.search(&keyword.get_untracked()).await);
            });
        }
    };

    let on_group = {
        let documents = documents.clone();
        move |ev| {
            let group = event_target_value(&ev).parse::<i64>().ok();
            let documents = documents.clone();
            spawn_local(async move {
                ui.report(documents.filter_group(group).await);
            });
        }
    };

    let on_sort = {
        let documents = documents.clone();
        move |ev| {
            let sort_by = DocSortBy::parse(&event_target_value(&ev));
            let order = documents.query().order;
            let documents = documents.clone();
            spawn_local(async move {
                ui.report(documents.sort(sort_by, order).await);
            });
        }
    };

    let on_order = {
        let documents = documents.clone();
        move |_| {
            let query = documents.query();
            let documents = documents.clone();
            spawn_local(async move {
                ui.report(documents.sort(query.sort_by, query.order.toggled()).await);
            });
        }
    };

    let on_more = Callback::new({
        let documents = documents.clone();
        move |()| {
            let documents = documents.clone();
            spawn_local(async move {
                ui.report(documents.load_more().await);
            });
        }
    });
    let on_refresh = Callback::new({
        let documents = documents.clone();
        move |()| {
            let documents = documents.clone();
            spawn_local(async move {
                ui.report(documents.refresh().await);
            });
        }
    });

    let tree = ctx.tree.clone();
    let query = documents.clone();
    let group_query = documents.clone();
    let sort_query = documents.clone();
    let order_query = documents.clone();
    let items = list.clone();
    let has_more = list.clone();
    let loading = list.clone();
    let expired = list.clone();
    let error = list.clone();
    let total = list.clone();

    view! {
        <section class="page">
            <header class="page-header">
                <h2>"Documents"</h2>
                <span class="muted">
                    {move || total.total().map(|n| format!("{n} documents")).unwrap_or_default()}
                </span>
            </header>
            <div class="filters">
                <form class="search-box" on:submit=on_search>
                    <Icon icon=ic::SEARCH />
                    <input type="search" placeholder="Search titles" bind:value=keyword />
                </form>
                <select on:change=on_group title="Group">
                    <option value="" selected=move || query.query().group_id.is_none()>
                        "All groups"
                    </option>
                    {move || {
                        let selected = group_query.query().group_id;
                        tree.groups()
                            .into_iter()
                            .map(|(id, name)| view! {
                                <option value=id.to_string() selected=selected == Some(id)>{name}</option>
                            })
                            .collect_view()
                    }}
                </select>
                <select on:change=on_sort title="Sort by">
                    {DocSortBy::ALL
                        .into_iter()
                        .map(|sort| {
                            let documents = sort_query.clone();
                            view! {
                                <option
                                    value=sort.as_str()
                                    selected=move || documents.query().sort_by == sort
                                >
                                    {sort.label()}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
                <button class="btn" on:click=on_order title="Toggle order">
                    {move || match order_query.query().order {
                        SortOrder::Asc => "Ascending",
                        SortOrder::Desc => "Descending",
                    }}
                </button>
            </div>
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
