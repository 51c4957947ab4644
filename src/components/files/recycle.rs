//! Recycle bin: deleted files with their remaining grace period.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::components::list::ListFooter;
use crate::core::ResourceState;
use crate::models::FileItem;
use crate::utils::dom;
use crate::utils::format::{format_datetime, format_size, recycle_badge};

#[component]
pub fn RecycleBinPage() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let ui = ctx.ui;
    let bin = ctx.recycle.clone();
    let list = bin.list().clone();

    {
        let bin = bin.clone();
        spawn_local(async move {
            ui.report(bin.load().await);
        });
    }

    let on_more = Callback::new({
        let bin = bin.clone();
        move |()| {
            let bin = bin.clone();
            spawn_local(async move {
                ui.report(bin.load_more().await);
            });
        }
    });
    let on_refresh = Callback::new(move |()| {
        let bin = bin.clone();
        spawn_local(async move {
            ui.report(bin.refresh().await);
        });
    });

    let items = list.clone();
    let has_more = list.clone();
    let loading = list.clone();
    let expired = list.clone();
    let error = list.clone();
    let total = list.clone();

    view! {
        <section class="page recycle">
            <header class="page-header">
                <h2>"Recycle bin"</h2>
                <span class="muted">
                    {move || total.total().map(|n| format!("{n} files")).unwrap_or_default()}
                </span>
                <button class="icon-btn" title="Refresh" on:click=move |_| on_refresh.run(())>
                    <Icon icon=ic::REFRESH />
                </button>
            </header>
            <p class="muted">"Deleted files are purged permanently when their grace period ends."</p>
            <ul class="recycle-list">
                <For
                    each=move || items.items()
                    key=|file| (file.id, file.days_until_permanent_deletion)
                    children=|file| view! { <RecycleRow file=file /> }
                />
            </ul>
            <ListFooter
                has_more=Signal::derive(move || has_more.has_more())
                loading=Signal::derive(move || loading.state() == ResourceState::Loading)
                expired=Signal::derive(move || expired.is_cursor_expired())
                error=Signal::derive(move || error.error().map(|e| e.to_string()))
                empty=Signal::derive(move || list.is_empty())
                on_more=on_more
                on_refresh=on_refresh
            />
        </section>
    }
}

#[component]
fn RecycleRow(file: FileItem) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let ui = ctx.ui;
    let bin = ctx.recycle.clone();
    let id = file.id;
    let (badge, tone) = recycle_badge(file.days_until_permanent_deletion);

    let on_restore = {
        let bin = bin.clone();
        move |_| {
            let bin = bin.clone();
            spawn_local(async move {
                if ui.report(bin.restore(id).await).is_some() {
                    ui.success("File restored");
                }
            });
        }
    };
    let on_purge = move |_| {
        if !dom::confirm("Delete this file permanently? This cannot be undone.") {
            return;
        }
        let bin = bin.clone();
        spawn_local(async move {
            if ui.report(bin.purge(id).await).is_some() {
                ui.success("File deleted permanently");
            }
        });
    };

    view! {
        <li class="recycle-row">
            <Icon icon=ic::for_file_name(&file.name) />
            <span class="entry-name">{file.name.clone()}</span>
            <span class="muted">{format_size(file.size)}</span>
            <span class="muted">"Deleted " {format_datetime(file.deleted_at.as_deref())}</span>
            <span class=format!("badge badge-{}", tone.as_str())>{badge}</span>
            <span class="row-actions">
                <button class="btn" on:click=on_restore>
                    <Icon icon=ic::RESTORE />
                    "Restore"
                </button>
                <button class="btn btn-danger" on:click=on_purge>
                    <Icon icon=ic::TRASH />
                    "Delete forever"
                </button>
            </span>
        </li>
    }
}
