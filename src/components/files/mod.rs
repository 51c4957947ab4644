//! File manager: folders, files, selection and the detail panel.
//!
//! - [`FileManager`] - Folder listing driven by `#/files[/{id}]`
//! - [`recycle`] - Recycle bin

pub mod recycle;

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_icons::Icon;
use web_sys::HtmlInputElement;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::components::list::ListFooter;
use crate::components::router::RouteContext;
use crate::core::folder_cache::FolderKey;
use crate::core::{Keyed, ResourceState, SortOrder};
use crate::models::{FileItem, FolderChild, Route, ViewLayout};
use crate::stores::ToastKind;
use crate::utils::dom;
use crate::utils::download::{read_input_files, save_bytes};
use crate::utils::file_types::mime_for_name;
use crate::utils::format::{format_date, format_datetime, format_size};

/// Sort fields offered by the folder listing.
const SORT_FIELDS: [(&str, &str); 4] = [
    ("name", "Name"),
    ("size", "Size"),
    ("uploadTime", "Uploaded"),
    ("updateTime", "Modified"),
];

fn folder_route(key: FolderKey) -> Route {
    Route::Files { folder: key.id() }
}

#[component]
pub fn FileManager() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let route_ctx = use_context::<RouteContext>().expect("RouteContext must be provided");
    let ui = ctx.ui;
    let files = ctx.files.clone();

    // The route drives the folder being shown
    let folder = Memo::new(move |_| {
        route_ctx.0.with(|route| match route {
            Route::Files { folder } => FolderKey::from_id(*folder),
            _ => FolderKey::Root,
        })
    });
    {
        let files = files.clone();
        Effect::new(move |_| {
            let key = folder.get();
            let files = files.clone();
            spawn_local(async move {
                ui.report(files.open_folder(key).await);
            });
        });
    }
    {
        let files = files.clone();
        spawn_local(async move {
            ui.report(files.load_root().await);
        });
    }

    let layout = files.layout;
    let detail = files.detail;
    let footer = files.clone();
    let more = files.clone();
    let refresh = files.clone();

    let on_more = Callback::new(move |()| {
        let files = more.clone();
        spawn_local(async move {
            ui.report(files.load_more().await);
        });
    });
    let on_refresh = Callback::new(move |()| {
        let files = refresh.clone();
        spawn_local(async move {
            ui.report(files.refresh().await);
        });
    });

    let has_more = footer.clone();
    let loading = footer.clone();
    let expired = footer.clone();
    let error = footer.clone();

    view! {
        <section class="page files">
            <Breadcrumb />
            <FileToolbar />
            <SelectionBar />
            <div class="files-body">
                <div
                    class="file-items"
                    class=("grid", move || layout.get() == ViewLayout::Grid)
                    class=("list", move || layout.get() == ViewLayout::List)
                >
                    <FileItems />
                </div>
                <Show when=move || detail.get().is_some()>
                    <DetailPanel />
                </Show>
            </div>
            <ListFooter
                has_more=Signal::derive(move || has_more.has_more())
                loading=Signal::derive(move || loading.state() == ResourceState::Loading)
                expired=Signal::derive(move || expired.error().is_some_and(|e| e.is_cursor_expired()))
                error=Signal::derive(move || error.error().map(|e| e.to_string()))
                empty=Signal::derive(move || footer.items().is_empty())
                on_more=on_more
                on_refresh=on_refresh
            />
        </section>
    }
}

#[component]
fn Breadcrumb() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let files = ctx.files.clone();
    let path = files.path;
    let root = files.root;

    view! {
        <nav class="breadcrumb" aria-label="Folder path">
            <a href=folder_route(FolderKey::Root).to_hash()>
                <Icon icon=ic::HOME />
                {move || root.with(|r| r.as_ref().map(|r| r.name.clone()).unwrap_or_else(|| "Files".to_string()))}
            </a>
            <For
                each=move || path.get()
                key=|segment| (segment.id, segment.name.clone())
                children=|segment| view! {
                    <span class="crumb-sep">
                        <Icon icon=ic::CHEVRON_RIGHT />
                    </span>
                    <a href=folder_route(FolderKey::Folder(segment.id)).to_hash()>{segment.name}</a>
                }
            />
            <span class="muted crumb-stats">
                {move || {
                    let total = files.total();
                    total.map(|n| format!("{n} items")).unwrap_or_default()
                }}
            </span>
        </nav>
    }
}

#[component]
fn FileToolbar() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let ui = ctx.ui;
    let files = ctx.files.clone();
    let keyword = RwSignal::new(files.query.get_untracked().keyword);
    let query = files.query;
    let layout = files.layout;

    // Clear the box when navigation drops the keyword
    Effect::new(move |_| {
        let current = query.with(|q| q.keyword.clone());
        if current.is_empty() {
            keyword.set(current);
        }
    });

    let on_search = {
        let files = files.clone();
        move |ev: SubmitEvent| {
            ev.prevent_default();
            let files = files.clone();
            spawn_local(async move {
                ui.report(files.search(&keyword.get_untracked()).await);
            });
        }
    };
    let on_sort = {
        let files = files.clone();
        move |ev| {
            let field = event_target_value(&ev);
            let order = query.with_untracked(|q| q.order);
            let files = files.clone();
            spawn_local(async move {
                ui.report(files.sort(&field, order).await);
            });
        }
    };
    let on_order = {
        let files = files.clone();
        move |_| {
            let (field, order) =
                query.with_untracked(|q| (q.sort_field.clone(), q.order.toggled()));
            let files = files.clone();
            spawn_local(async move {
                ui.report(files.sort(&field, order).await);
            });
        }
    };
    let on_new_folder = {
        let files = files.clone();
        move |_| {
            let Some(name) = dom::prompt("Folder name", "") else {
                return;
            };
            let files = files.clone();
            spawn_local(async move {
                if ui.report(files.create_folder(&name).await).is_some() {
                    ui.success("Folder created");
                }
            });
        }
    };
    let on_upload = {
        let files = files.clone();
        move |ev| {
            let input = event_target::<HtmlInputElement>(&ev);
            let files = files.clone();
            spawn_local(async move {
                let uploads = read_input_files(&input).await;
                if uploads.is_empty() {
                    return;
                }
                if let Some(count) = ui.report(files.upload(uploads).await) {
                    ui.success(format!("Uploaded {count} files"));
                }
            });
        }
    };
    let on_refresh = {
        let files = files.clone();
        move |_| {
            let files = files.clone();
            spawn_local(async move {
                ui.report(files.refresh().await);
            });
        }
    };
    let on_clear_cache = move |_| {
        let files = files.clone();
        spawn_local(async move {
            if ui.report(files.clear_cache().await).is_some() {
                ui.success("Cache cleared");
            }
        });
    };

    view! {
        <div class="toolbar">
            <form class="search-box" on:submit=on_search>
                <Icon icon=ic::SEARCH />
                <input type="search" placeholder="Search this folder" bind:value=keyword />
            </form>
            <select on:change=on_sort title="Sort by">
                {SORT_FIELDS
                    .into_iter()
                    .map(|(field, label)| view! {
                        <option
                            value=field
                            selected=move || query.with(|q| q.sort_field == field)
                        >
                            {label}
                        </option>
                    })
                    .collect_view()}
            </select>
            <button class="btn" title="Toggle order" on:click=on_order>
                {move || match query.with(|q| q.order) {
                    SortOrder::Asc => "Ascending",
                    SortOrder::Desc => "Descending",
                }}
            </button>
            <button
                class="icon-btn"
                title="Toggle layout"
                on:click=move |_| layout.update(|l| {
                    *l = match l {
                        ViewLayout::Grid => ViewLayout::List,
                        ViewLayout::List => ViewLayout::Grid,
                    }
                })
            >
                {move || match layout.get() {
                    ViewLayout::Grid => view! { <Icon icon=ic::LIST /> },
                    ViewLayout::List => view! { <Icon icon=ic::GRID /> },
                }}
            </button>
            <button class="icon-btn" title="New folder" on:click=on_new_folder>
                <Icon icon=ic::FOLDER_PLUS />
            </button>
            <label class="icon-btn" title="Upload files">
                <Icon icon=ic::UPLOAD />
                <input type="file" class="hidden" multiple=true on:change=on_upload />
            </label>
            <button class="icon-btn" title="Refresh" on:click=on_refresh>
                <Icon icon=ic::REFRESH />
            </button>
            <button class="btn" title="Clear cached listings" on:click=on_clear_cache>
                "Clear cache"
            </button>
        </div>
    }
}

/// Batch actions over the selected files.
#[component]
fn SelectionBar() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let ui = ctx.ui;
    let files = ctx.files.clone();
    let selection = files.selection;
    let target = RwSignal::new(String::new());

    // Parent folders from the breadcrumb plus the subfolders shown here
    let targets = {
        let files = files.clone();
        move || {
            let mut options = vec![(String::new(), "Root".to_string())];
            let current = files.current.get();
            files.path.with(|path| {
                options.extend(
                    path.iter()
                        .filter(|s| FolderKey::Folder(s.id) != current)
                        .map(|s| (s.id.to_string(), s.name.clone())),
                );
            });
            options.extend(
                files
                    .items()
                    .iter()
                    .filter_map(FolderChild::as_folder)
                    .map(|f| (f.id.to_string(), f.name.clone())),
            );
            options
        }
    };

    let on_move = {
        let files = files.clone();
        move |_| {
            let ids = files.selected_file_ids();
            if ids.is_empty() {
                ui.info("Select files to move");
                return;
            }
            let destination = target.get_untracked().parse::<i64>().ok();
            let files = files.clone();
            spawn_local(async move {
                if ui.report(files.move_files(&ids, destination).await).is_some() {
                    ui.success(format!("Moved {} files", ids.len()));
                }
            });
        }
    };
    let on_delete = {
        let files = files.clone();
        move |_| {
            let ids = files.selected_file_ids();
            if ids.is_empty() {
                ui.info("Select files to delete");
                return;
            }
            if !dom::confirm(&format!("Move {} files to the recycle bin?", ids.len())) {
                return;
            }
            let files = files.clone();
            spawn_local(async move {
                if ui.report(files.delete_files(&ids).await).is_some() {
                    ui.success("Moved to the recycle bin");
                }
            });
        }
    };
    let select_all = files.clone();
    let clear = files.clone();

    view! {
        <Show when=move || selection.with(|s| !s.is_empty())>
            <div class="selection-bar">
                <span>{move || format!("{} selected", selection.with(|s| s.len()))}</span>
                <button class="btn" on:click={
                    let files = select_all.clone();
                    move |_| files.select_all()
                }>"Select all"</button>
                <button class="btn" on:click={
                    let files = clear.clone();
                    move |_| files.clear_selection()
                }>"Clear"</button>
                <select
                    title="Move to"
                    on:change=move |ev| target.set(event_target_value(&ev))
                >
                    {
                        let targets = targets.clone();
                        move || targets()
                            .into_iter()
                            .map(|(value, label)| {
                                let selected = target.get_untracked() == value;
                                view! { <option value=value selected=selected>{label}</option> }
                            })
                            .collect_view()
                    }
                </select>
                <button class="btn" on:click=on_move.clone()>
                    <Icon icon=ic::MOVE />
                    "Move"
                </button>
                <button class="btn btn-danger" on:click=on_delete.clone()>
                    <Icon icon=ic::TRASH />
                    "Delete"
                </button>
            </div>
        </Show>
    }
}

#[component]
fn FileItems() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let files = ctx.files.clone();

    view! {
        <For
            each=move || files.items()
            key=|item| (item.key(), item.name().to_string(), item.as_file().map(|f| f.update_time.clone()))
            children=|item| view! { <FileEntry item=item /> }
        />
    }
}

#[component]
fn FileEntry(item: FolderChild) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let ui = ctx.ui;
    let files = ctx.files.clone();
    let key = item.key();
    let detail = files.detail;

    let selected = {
        let files = files.clone();
        Signal::derive(move || files.is_selected(key))
    };
    let on_check = {
        let files = files.clone();
        move |_| files.toggle_select(key)
    };

    match item {
        FolderChild::Folder(folder) => {
            let id = folder.id;
            let name = folder.name.clone();
            let on_rename = {
                let files = files.clone();
                let current = name.clone();
                move |ev: leptos::ev::MouseEvent| {
                    ev.prevent_default();
                    ev.stop_propagation();
                    let Some(name) = dom::prompt("Rename folder", &current) else {
                        return;
                    };
                    let files = files.clone();
                    spawn_local(async move {
                        ui.report(files.rename_folder(id, &name).await);
                    });
                }
            };
            let shift = {
                let files = files.clone();
                move |offset: isize| {
                    let files = files.clone();
                    move |_| {
                        let files = files.clone();
                        spawn_local(async move {
                            ui.report(files.shift_folder(id, offset).await);
                        });
                    }
                }
            };
            let on_delete = move |ev: leptos::ev::MouseEvent| {
                ev.prevent_default();
                ev.stop_propagation();
                if !dom::confirm("Delete this folder and everything in it?") {
                    return;
                }
                let files = files.clone();
                spawn_local(async move {
                    match files.delete_folder(id, true).await {
                        Ok(Some(parent)) => folder_route(parent).push(),
                        Ok(None) => ui.success("Folder deleted"),
                        Err(err) => ui.error(&err),
                    }
                });
            };
            let counts = format!(
                "{} folders · {} files",
                folder.sub_folder_count.unwrap_or_default(),
                folder.file_count.unwrap_or_default()
            );

            view! {
                <div class="file-entry folder" class=("selected", selected)>
                    <input type="checkbox" prop:checked=selected on:change=on_check />
                    <a class="entry-main" href=folder_route(FolderKey::Folder(id)).to_hash()>
                        <Icon icon=ic::FOLDER />
                        <span class="entry-name">{name}</span>
                        <span class="entry-meta muted">{counts}</span>
                    </a>
                    <span class="row-actions">
                        <button class="icon-btn" title="Move up" on:click=shift(-1)>
                            <Icon icon=ic::ARROW_UP />
                        </button>
                        <button class="icon-btn" title="Move down" on:click=shift(1)>
                            <Icon icon=ic::ARROW_DOWN />
                        </button>
                        <button class="icon-btn" title="Rename" on:click=on_rename>
                            <Icon icon=ic::EDIT />
                        </button>
                        <button class="icon-btn" title="Delete" on:click=on_delete>
                            <Icon icon=ic::TRASH />
                        </button>
                    </span>
                </div>
            }
            .into_any()
        }
        FolderChild::File(file) => {
            let icon = ic::for_file_name(&file.name);
            let meta = format!(
                "{} · {}",
                format_size(file.size),
                format_date(file.update_time.as_deref().or(file.upload_time.as_deref()))
            );
            view! {
                <div
                    class="file-entry file"
                    class=("selected", selected)
                    class=("active", move || detail.get() == Some(key))
                >
                    <input type="checkbox" prop:checked=selected on:change=on_check />
                    <button class="entry-main" on:click=move |_| detail.set(Some(key))>
                        <Icon icon=icon />
                        <span class="entry-name">{file.name.clone()}</span>
                        <span class="entry-meta muted">{meta}</span>
                    </button>
                </div>
            }
            .into_any()
        }
    }
}

#[component]
fn DetailPanel() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let files = ctx.files.clone();
    let detail = files.detail;

    let file = Memo::new(move |_| {
        detail
            .get()
            .and_then(|key| files.find(key))
            .and_then(|item| item.as_file().cloned())
    });

    view! {
        <aside class="detail-panel">
            <button class="icon-btn detail-close" title="Close" on:click=move |_| detail.set(None)>
                <Icon icon=ic::CLOSE />
            </button>
            {move || file.get().map(|file| view! { <FileDetail file=file /> })}
        </aside>
    }
}

#[component]
fn FileDetail(file: FileItem) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let ui = ctx.ui;
    let files = ctx.files.clone();
    let id = file.id;

    let on_download = {
        let files = files.clone();
        let name = file.name.clone();
        move |_| {
            let files = files.clone();
            let name = name.clone();
            spawn_local(async move {
                if let Some(bytes) = ui.report(files.download(id).await)
                    && let Err(err) = save_bytes(&name, &bytes, mime_for_name(&name))
                {
                    tracing::error!(error = ?err, "failed to hand file to the browser");
                    ui.toast(ToastKind::Error, "The download could not be started");
                }
            });
        }
    };
    let on_rename = {
        let files = files.clone();
        let current = file.name.clone();
        move |_| {
            let Some(name) = dom::prompt("Rename file", &current) else {
                return;
            };
            let files = files.clone();
            spawn_local(async move {
                ui.report(files.rename_file(id, &name).await);
            });
        }
    };
    let on_describe = {
        let files = files.clone();
        let current = file.description.clone().unwrap_or_default();
        move |_| {
            let Some(description) = dom::prompt("Description", &current) else {
                return;
            };
            let files = files.clone();
            spawn_local(async move {
                ui.report(files.describe_file(id, &description).await);
            });
        }
    };
    let on_delete = move |_| {
        if !dom::confirm("Move this file to the recycle bin?") {
            return;
        }
        let files = files.clone();
        spawn_local(async move {
            if ui.report(files.delete_file(id).await).is_some() {
                ui.success("Moved to the recycle bin");
            }
        });
    };

    let rows = [
        ("Size", format_size(file.size)),
        ("Type", file.mime_type.clone().unwrap_or_else(|| mime_for_name(&file.name).to_string())),
        ("Folder", file.folder_name.clone().unwrap_or_else(|| "Root".to_string())),
        ("Uploaded", format_datetime(file.upload_time.as_deref())),
        ("Modified", format_datetime(file.update_time.as_deref())),
        ("Downloads", file.download_count.unwrap_or_default().to_string()),
    ];

    view! {
        <div class="file-detail">
            <div class="detail-icon">
                <Icon icon=ic::for_file_name(&file.name) />
            </div>
            <h3 class="detail-name">{file.name.clone()}</h3>
            <p class="detail-description muted">
                {file.description.clone().filter(|d| !d.is_empty()).unwrap_or_else(|| "No description".to_string())}
            </p>
            <dl class="detail-rows">
                {rows
                    .into_iter()
                    .map(|(label, value)| view! { <dt>{label}</dt><dd>{value}</dd> })
                    .collect_view()}
            </dl>
            <div class="detail-actions">
                <button class="btn btn-primary" on:click=on_download>
                    <Icon icon=ic::DOWNLOAD />
                    "Download"
                </button>
                <button class="btn" on:click=on_rename>
                    <Icon icon=ic::EDIT />
                    "Rename"
                </button>
                <button class="btn" on:click=on_describe>"Edit description"</button>
                <button class="btn btn-danger" on:click=on_delete>
                    <Icon icon=ic::TRASH />
                    "Delete"
                </button>
            </div>
        </div>
    }
}
