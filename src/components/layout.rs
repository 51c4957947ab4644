//! Signed-in layout: header, directory tree sidebar and the section pane.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_icons::Icon;
use leptos_use::use_media_query;

use crate::app::AppContext;
use crate::components::documents::DocumentsPage;
use crate::components::files::FileManager;
use crate::components::files::recycle::RecycleBinPage;
use crate::components::icons as ic;
use crate::components::latest::LatestPage;
use crate::components::router::{RouteContext, Section};
use crate::components::workspace::{DirectoryTree, WorkspacePane};
use crate::config::{APP_NAME, NARROW_VIEWPORT_QUERY};
use crate::models::Route;
use crate::stores::Theme;

#[component]
pub fn Layout() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let route_ctx = use_context::<RouteContext>().expect("RouteContext must be provided");
    let section = Memo::new(move |_| route_ctx.section());
    let ui = ctx.ui;

    let narrow = use_media_query(NARROW_VIEWPORT_QUERY);
    Effect::new(move |_| ui.sidebar_collapsed.set(narrow.get()));

    let tree = ctx.tree.clone();
    let latest = ctx.latest.clone();
    spawn_local(async move {
        ui.report(tree.fetch_tree().await);
        ui.report(latest.ensure_initialized().await);
    });

    view! {
        <div class="layout" class=("sidebar-collapsed", move || ui.sidebar_collapsed.get())>
            <Header section=section />
            <div class="layout-body">
                <Show when=move || section.get().has_tree() && !ui.sidebar_collapsed.get()>
                    <aside class="sidebar">
                        <DirectoryTree />
                    </aside>
                </Show>
                <main class="content">
                    {move || match section.get() {
                        Section::Workspace => view! { <WorkspacePane /> }.into_any(),
                        Section::Latest => view! { <LatestPage /> }.into_any(),
                        Section::Documents => view! { <DocumentsPage /> }.into_any(),
                        Section::Files => view! { <FileManager /> }.into_any(),
                        Section::Recycle => view! { <RecycleBinPage /> }.into_any(),
                        Section::NotFound => view! { <NotFound /> }.into_any(),
                    }}
                </main>
            </div>
        </div>
    }
}

#[component]
fn Header(section: Memo<Section>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let route_ctx = use_context::<RouteContext>().expect("RouteContext must be provided");
    let ui = ctx.ui;
    let auth = ctx.auth.state();

    let nav_link = move |target: Route, label: &'static str| {
        let of = Section::of(&target);
        view! {
            <a
                class="nav-link"
                class=("active", move || section.get() == of)
                href=target.to_hash()
            >
                {label}
            </a>
        }
    };

    let on_logout = move |_| {
        let ctx = ctx.clone();
        spawn_local(async move {
            ctx.logout().await;
            route_ctx.redirect(Route::Login { redirect: None });
        });
    };

    view! {
        <header class="header">
            <button
                class="icon-btn"
                aria-label="Toggle sidebar"
                on:click=move |_| ui.toggle_sidebar()
            >
                <Icon icon=ic::SIDEBAR />
            </button>
            <a class="brand" href=Route::Workspace.to_hash()>
                <Icon icon=ic::HOME />
                <span>{APP_NAME}</span>
            </a>
            <nav class="nav">
                {nav_link(Route::Workspace, "Workspace")}
                {nav_link(Route::Latest, "Latest")}
                {nav_link(Route::Documents, "Documents")}
                {nav_link(Route::Files { folder: None }, "Files")}
                {nav_link(Route::Recycle, "Recycle bin")}
            </nav>
            <div class="header-actions">
                <button
                    class="icon-btn"
                    aria-label="Toggle theme"
                    on:click=move |_| ui.toggle_theme()
                >
                    {move || match ui.theme.get() {
                        Theme::Light => view! { <Icon icon=ic::MOON /> },
                        Theme::Dark => view! { <Icon icon=ic::SUN /> },
                    }}
                </button>
                <span class="user">
                    <Icon icon=ic::USER />
                    {move || auth.user.with(|user| {
                        user.as_ref().map(|u| u.display_name().to_string()).unwrap_or_default()
                    })}
                </span>
                <button class="icon-btn" aria-label="Sign out" on:click=on_logout>
                    <Icon icon=ic::LOG_OUT />
                </button>
            </div>
        </header>
    }
}

#[component]
fn NotFound() -> impl IntoView {
    let route_ctx = use_context::<RouteContext>().expect("RouteContext must be provided");

    view! {
        <div class="empty-state">
            <h2>"Page not found"</h2>
            <p class="muted">{move || route_ctx.0.with(Route::path)}</p>
            <a class="btn" href=Route::Workspace.to_hash()>"Back to workspace"</a>
        </div>
    }
}
