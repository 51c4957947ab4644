//! Directory tree sidebar: groups and documents.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_icons::Icon;
use web_sys::HtmlInputElement;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::core::tree::{DirectoryNode, NodeType};
use crate::models::{DocType, Route};
use crate::stores::ToastKind;
use crate::utils::dom;
use crate::utils::download::read_input_files;

/// Group that new documents land in: the selected group, or the group of
/// the selected document.
fn target_group(ctx: &AppContext) -> Option<i64> {
    match ctx.tree.selected.get_untracked()? {
        (id, NodeType::Group) => Some(id),
        (id, NodeType::Document) => ctx.doc.current.with_untracked(|doc| {
            doc.as_ref().filter(|d| d.id == id).and_then(|d| d.group_id)
        }),
    }
}

#[component]
pub fn DirectoryTree() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let ui = ctx.ui;
    let keyword = RwSignal::new(String::new());
    let new_type = RwSignal::new(DocType::Md);

    let tree = ctx.tree.clone();
    let shown = Memo::new(move |_| {
        let keyword = keyword.get();
        if keyword.trim().is_empty() {
            (tree.nodes.get(), false)
        } else {
            (tree.filtered(&keyword).nodes, true)
        }
    });

    let on_new_group = {
        let ctx = ctx.clone();
        move |_| {
            let Some(name) = dom::prompt("Group name", "") else {
                return;
            };
            let parent = ctx
                .tree
                .selected
                .get_untracked()
                .and_then(|(id, kind)| (kind == NodeType::Group).then_some(id));
            let tree = ctx.tree.clone();
            spawn_local(async move {
                if ui.report(tree.create_group(&name, parent).await).is_some() {
                    ui.success("Group created");
                }
            });
        }
    };

    let on_new_document = {
        let ctx = ctx.clone();
        move |_| {
            let doc_type = new_type.get_untracked();
            let Some(title) = dom::prompt("Document title", "") else {
                return;
            };
            let group = target_group(&ctx);
            let tree = ctx.tree.clone();
            spawn_local(async move {
                let created = tree.create_document(&title, doc_type, group).await;
                if let Some(document) = ui.report(created) {
                    Route::Document { id: document.id }.push();
                }
            });
        }
    };

    let on_upload = {
        let ctx = ctx.clone();
        move |ev| {
            let input = event_target::<HtmlInputElement>(&ev);
            let group = target_group(&ctx);
            let tree = ctx.tree.clone();
            spawn_local(async move {
                for upload in read_input_files(&input).await {
                    let name = upload.file_name.clone();
                    if ui.report(tree.upload_document(upload, group).await).is_some() {
                        ui.success(format!("Uploaded {name}"));
                    }
                }
            });
        }
    };

    let on_import = {
        let ctx = ctx.clone();
        move |ev| {
            let input = event_target::<HtmlInputElement>(&ev);
            let group = target_group(&ctx);
            let tree = ctx.tree.clone();
            spawn_local(async move {
                for archive in read_input_files(&input).await {
                    if let Some(report) = ui.report(tree.batch_upload(archive, group).await) {
                        ui.info(format!(
                            "Imported {} documents, {} failed",
                            report.created, report.failed
                        ));
                    }
                }
            });
        }
    };

    let refresh_tree = ctx.tree.clone();
    let collapse_tree = ctx.tree.clone();
    let loading_tree = ctx.tree.clone();

    view! {
        <div class="tree-panel">
            <div class="tree-toolbar">
                <div class="search-box">
                    <Icon icon=ic::SEARCH />
                    <input
                        type="search"
                        placeholder="Filter"
                        bind:value=keyword
                    />
                </div>
                <div class="tree-actions">
                    <button class="icon-btn" title="New group" on:click=on_new_group>
                        <Icon icon=ic::FOLDER_PLUS />
                    </button>
                    <select
                        class="type-select"
                        title="Type of new documents"
                        on:change=move |ev| {
                            let value = event_target_value(&ev);
                            if let Some(doc_type) = DocType::ALL.into_iter().find(|t| t.as_str() == value) {
                                new_type.set(doc_type);
                            }
                        }
                    >
                        {DocType::ALL
                            .into_iter()
                            .filter(|t| t.is_text())
                            .map(|t| view! {
                                <option value=t.as_str() selected=move || new_type.get() == t>
                                    {t.label()}
                                </option>
                            })
                            .collect_view()}
                    </select>
                    <button class="icon-btn" title="New document" on:click=on_new_document>
                        <Icon icon=ic::FILE_PLUS />
                    </button>
                    <label class="icon-btn" title="Upload documents">
                        <Icon icon=ic::UPLOAD />
                        <input
                            type="file"
                            class="hidden"
                            multiple=true
                            accept=DocType::accept()
                            on:change=on_upload
                        />
                    </label>
                    <label class="icon-btn" title="Import a zip archive">
                        <Icon icon=ic::ARCHIVE />
                        <input type="file" class="hidden" accept=".zip" on:change=on_import />
                    </label>
                    <button
                        class="icon-btn"
                        title="Collapse all"
                        on:click=move |_| collapse_tree.collapse_all()
                    >
                        <Icon icon=ic::CHEVRON_RIGHT />
                    </button>
                    <button
                        class="icon-btn"
                        title="Reload"
                        on:click=move |_| {
                            let tree = refresh_tree.clone();
                            spawn_local(async move {
                                ui.report(tree.fetch_tree().await);
                            });
                        }
                    >
                        <Icon icon=ic::REFRESH />
                    </button>
                </div>
            </div>
            {move || loading_tree.cached.get().then(|| view! {
                <p class="tree-note muted">"Showing a cached tree"</p>
            })}
            <ul class="tree" role="tree">
                {move || {
                    let (nodes, searching) = shown.get();
                    if nodes.is_empty() {
                        let message = if searching { "No matches" } else { "No documents yet" };
                        view! { <li class="tree-empty muted">{message}</li> }.into_any()
                    } else {
                        render_nodes(nodes, 0, searching)
                    }
                }}
            </ul>
        </div>
    }
}

/// Up/down buttons that reorder a node among its siblings.
fn shift_buttons(ctx: &AppContext, id: i64, node_type: NodeType) -> impl IntoView {
    let ui = ctx.ui;
    let shift = move |tree: crate::stores::TreeStore, offset: isize| {
        move |ev: leptos::ev::MouseEvent| {
            ev.prevent_default();
            ev.stop_propagation();
            let tree = tree.clone();
            spawn_local(async move {
                ui.report(tree.shift(id, node_type, offset).await);
            });
        }
    };

    view! {
        <button class="icon-btn" title="Move up" on:click=shift(ctx.tree.clone(), -1)>
            <Icon icon=ic::ARROW_UP />
        </button>
        <button class="icon-btn" title="Move down" on:click=shift(ctx.tree.clone(), 1)>
            <Icon icon=ic::ARROW_DOWN />
        </button>
    }
}

fn render_nodes(nodes: Vec<DirectoryNode>, depth: usize, searching: bool) -> AnyView {
    nodes
        .into_iter()
        .map(|node| view! { <TreeRow node=node depth=depth searching=searching /> })
        .collect_view()
        .into_any()
}

#[component]
fn TreeRow(node: DirectoryNode, depth: usize, searching: bool) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let ui = ctx.ui;
    let id = node.id;
    let indent = format!("padding-left: {:.2}rem", 0.5 + depth as f32 * 0.9);

    if node.is_group() {
        let tree = ctx.tree.clone();
        let expanded = {
            let tree = tree.clone();
            move || searching || tree.is_expanded(id)
        };
        let is_open = expanded.clone();
        let selected = {
            let tree = tree.clone();
            move || tree.is_selected(id, NodeType::Group)
        };
        let children = node.children;
        let name = node.name;

        let on_click = {
            let tree = tree.clone();
            move |_| {
                tree.select(id, NodeType::Group);
                tree.toggle(id);
            }
        };
        let on_rename = {
            let tree = tree.clone();
            let current = name.clone();
            move |ev: leptos::ev::MouseEvent| {
                ev.stop_propagation();
                let Some(name) = dom::prompt("Rename group", &current) else {
                    return;
                };
                let tree = tree.clone();
                spawn_local(async move {
                    ui.report(tree.rename_group(id, &name).await);
                });
            }
        };
        let on_delete = {
            let tree = tree.clone();
            let name = name.clone();
            move |ev: leptos::ev::MouseEvent| {
                ev.stop_propagation();
                if !dom::confirm(&format!("Delete group \"{name}\" and everything in it?")) {
                    return;
                }
                let tree = tree.clone();
                spawn_local(async move {
                    if ui.report(tree.delete_group(id).await).is_some() {
                        ui.success("Group deleted");
                    }
                });
            }
        };

        view! {
            <li class="tree-node" role="treeitem" aria-expanded=move || is_open().to_string()>
                <div
                    class="tree-row group"
                    class=("selected", selected)
                    style=indent
                    on:click=on_click
                >
                    {
                        let expanded = expanded.clone();
                        move || if expanded() {
                            view! { <Icon icon=ic::CHEVRON_DOWN /> }
                        } else {
                            view! { <Icon icon=ic::CHEVRON_RIGHT /> }
                        }
                    }
                    {
                        let expanded = expanded.clone();
                        move || if expanded() {
                            view! { <Icon icon=ic::FOLDER_OPEN /> }
                        } else {
                            view! { <Icon icon=ic::FOLDER /> }
                        }
                    }
                    <span class="tree-label">{name.clone()}</span>
                    <span class="row-actions">
                        {shift_buttons(&ctx, id, NodeType::Group)}
                        <button class="icon-btn" title="Rename" on:click=on_rename>
                            <Icon icon=ic::EDIT />
                        </button>
                        <button class="icon-btn" title="Delete" on:click=on_delete>
                            <Icon icon=ic::TRASH />
                        </button>
                    </span>
                </div>
                {move || expanded().then(|| view! {
                    <ul role="group">{render_nodes(children.clone(), depth + 1, searching)}</ul>
                })}
            </li>
        }
        .into_any()
    } else {
        let tree = ctx.tree.clone();
        let selected = {
            let tree = tree.clone();
            move || tree.is_selected(id, NodeType::Document)
        };
        let icon = node
            .doc_type
            .as_deref()
            .and_then(|t| DocType::ALL.into_iter().find(|d| d.as_str() == t))
            .map_or(ic::FILE_TEXT, |t| {
                if t == DocType::Pdf { ic::FILE_PDF } else { ic::FILE_TEXT }
            });
        let name = node.name;

        let on_move = {
            let tree = tree.clone();
            move |ev: leptos::ev::MouseEvent| {
                ev.prevent_default();
                ev.stop_propagation();
                let Some(target) =
                    dom::prompt("Move to group (leave empty for the top level)", "")
                else {
                    return;
                };
                let target = target.trim().to_string();
                let group = if target.is_empty() {
                    None
                } else {
                    let found = tree
                        .groups()
                        .into_iter()
                        .find(|(_, name)| name.eq_ignore_ascii_case(&target));
                    match found {
                        Some((group, _)) => Some(group),
                        None => {
                            ui.toast(ToastKind::Error, format!("No group named \"{target}\""));
                            return;
                        }
                    }
                };
                let tree = tree.clone();
                spawn_local(async move {
                    if ui.report(tree.move_document(id, group).await).is_some() {
                        ui.success("Document moved");
                    }
                });
            }
        };

        let on_delete = move |ev: leptos::ev::MouseEvent| {
            ev.prevent_default();
            ev.stop_propagation();
            if !dom::confirm("Delete this document?") {
                return;
            }
            let tree = tree.clone();
            spawn_local(async move {
                if ui.report(tree.delete_document(id).await).is_some() {
                    if Route::current() == (Route::Document { id }) {
                        Route::Workspace.push();
                    }
                    ui.success("Document deleted");
                }
            });
        };

        view! {
            <li class="tree-node" role="treeitem">
                <a
                    class="tree-row document"
                    class=("selected", selected)
                    style=indent
                    href=Route::Document { id }.to_hash()
                >
                    <Icon icon=icon />
                    <span class="tree-label">{name}</span>
                    <span class="row-actions">
                        {shift_buttons(&ctx, id, NodeType::Document)}
                        <button class="icon-btn" title="Move to group" on:click=on_move>
                            <Icon icon=ic::MOVE />
                        </button>
                        <button class="icon-btn" title="Delete" on:click=on_delete>
                            <Icon icon=ic::TRASH />
                        </button>
                    </span>
                </a>
            </li>
        }
        .into_any()
    }
}
