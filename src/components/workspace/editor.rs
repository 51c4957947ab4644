//! Document editor and viewer.
//!
//! Text documents are edited in a plain textarea with autosave; markdown and
//! HTML can be previewed through the sanitizing renderer. PDFs are handed to
//! the browser's built-in viewer.

use std::time::Duration;

use leptos::ev::KeyboardEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::config::MAX_EDITABLE_SIZE;
use crate::core::autosave::SyncStatus;
use crate::core::tree::NodeType;
use crate::models::{DocType, Document};
use crate::utils::format::{count_words, format_datetime, format_size};
use crate::utils::time::now_ms;
use crate::utils::{markdown_to_html, sanitize_html, text_to_html};

/// How often the relative "saved N min ago" text is refreshed.
const STATUS_TICK: Duration = Duration::from_secs(20);

fn render_preview(doc_type: DocType, content: &str) -> String {
    match doc_type {
        DocType::Md => markdown_to_html(content),
        DocType::Html => sanitize_html(content),
        DocType::Txt | DocType::Pdf => text_to_html(content),
    }
}

#[component]
pub fn Editor() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let doc = ctx.doc.clone();
    let preview = RwSignal::new(false);

    let now = RwSignal::new(now_ms());
    if let Ok(handle) = set_interval_with_handle(move || now.set(now_ms()), STATUS_TICK) {
        on_cleanup(move || handle.clear());
    }

    // A title change reaches the tree only through a refetch.
    let tree = ctx.tree.clone();
    let saved = {
        let doc = doc.clone();
        Memo::new(move |_| doc.current.with(|d| d.as_ref().map(|d| (d.id, d.title.clone()))))
    };
    Effect::new(move |previous: Option<Option<(i64, String)>>| {
        let current = saved.get();
        if let (Some(Some((old_id, old_title))), Some((id, title))) = (&previous, &current)
            && old_id == id
            && old_title != title
        {
            let tree = tree.clone();
            spawn_local(async move {
                let _ = tree.fetch_tree().await;
            });
        }
        current
    });

    // Re-render only when another document opens, so saving keeps the caret.
    let opened = {
        let doc = doc.clone();
        Memo::new(move |_| doc.current.with(|d| d.as_ref().map(|d| d.id)))
    };
    let body_doc = doc.clone();
    let loading = doc.loading;

    view! {
        <section class="editor">
            {move || {
                if loading.get() {
                    return view! { <div class="editor-empty muted">"Loading…"</div> }.into_any();
                }
                opened.track();
                match body_doc.current.get_untracked() {
                    None => view! {
                        <div class="editor-empty muted">"This document could not be opened."</div>
                    }
                    .into_any(),
                    Some(document) => view! {
                        <EditorToolbar document=document.clone() preview=preview now=now />
                        <EditorBody document=document preview=preview />
                    }
                    .into_any(),
                }
            }}
        </section>
    }
}

#[component]
fn EditorToolbar(document: Document, preview: RwSignal<bool>, now: RwSignal<f64>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let doc = ctx.doc.clone();
    let ui = ctx.ui;
    let previewable = matches!(document.doc_type, DocType::Md | DocType::Html);
    let editable = doc.is_editable();
    let tree = ctx.tree.clone();
    let id = document.id;

    let status = {
        let doc = doc.clone();
        move || doc.status()
    };
    let status_text = {
        let doc = doc.clone();
        move || doc.status_text(now.get())
    };

    let on_title_input = {
        let doc = doc.clone();
        move |ev| doc.edit_title(event_target_value(&ev))
    };

    let on_save = {
        let doc = doc.clone();
        move |_| {
            let doc = doc.clone();
            spawn_local(async move {
                if ui.report(doc.save_now().await).is_some() && doc.status() == SyncStatus::Synced {
                    ui.success("Saved");
                }
            });
        }
    };
    let on_retry = {
        let doc = doc.clone();
        move |_| {
            let doc = doc.clone();
            spawn_local(async move {
                ui.report(doc.retry().await);
            });
        }
    };
    let published = {
        let doc = doc.clone();
        move || doc.current.with(|d| d.as_ref().is_some_and(Document::is_published))
    };
    let on_publish = {
        let doc = doc.clone();
        let published = published.clone();
        move |_| {
            let next = !published();
            let doc = doc.clone();
            spawn_local(async move {
                if ui.report(doc.set_published(next).await).is_some() {
                    ui.success(if next { "Published" } else { "Moved back to drafts" });
                }
            });
        }
    };

    let title = doc.title;
    let content = doc.content;
    let current = doc.current;
    let retry_status = status.clone();

    view! {
        <div class="editor-toolbar">
            <input
                class="editor-title"
                type="text"
                placeholder="Untitled"
                prop:value=move || title.get()
                on:input=on_title_input
            />
            <span class=move || format!("sync-status sync-{}", status().as_str())>
                <Icon icon=ic::CLOCK />
                {status_text}
            </span>
            <Show when=move || retry_status() == SyncStatus::Error>
                <button class="btn" on:click=on_retry.clone()>
                    <Icon icon=ic::REFRESH />
                    "Retry"
                </button>
            </Show>
            <button class="icon-btn" title="Save (Ctrl+S)" on:click=on_save>
                <Icon icon=ic::SAVE />
            </button>
            {previewable.then(|| view! {
                <button
                    class="icon-btn"
                    class=("active", move || preview.get())
                    title="Toggle preview"
                    on:click=move |_| preview.update(|p| *p = !*p)
                >
                    {move || if preview.get() {
                        view! { <Icon icon=ic::EDIT /> }
                    } else {
                        view! { <Icon icon=ic::EYE /> }
                    }}
                </button>
            })}
            <button class="btn" on:click=on_publish>
                {move || if published() { "Unpublish" } else { "Publish" }}
            </button>
        </div>
        <div class="editor-meta muted">
            {move || {
                let mut path = tree.path_names(id, NodeType::Document);
                path.pop();
                (!path.is_empty()).then(|| view! { <span class="doc-path">{path.join(" / ")}</span> })
            }}
            <span>{document.doc_type.label()}</span>
            {editable.then(|| view! {
                <span>{move || format!("{} words", content.with(|c| count_words(c)))}</span>
            })}
            {move || current.with(|d| {
                d.as_ref().and_then(|d| d.file_size).map(|size| view! { <span>{format_size(size)}</span> })
            })}
            <span>
                "Updated "
                {move || current.with(|d| format_datetime(d.as_ref().and_then(|d| d.updated_at.as_deref())))}
            </span>
        </div>
    }
}

#[component]
fn EditorBody(document: Document, preview: RwSignal<bool>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let doc = ctx.doc.clone();
    let ui = ctx.ui;
    let doc_type = document.doc_type;
    let content = doc.content;

    if doc_type == DocType::Pdf {
        let src = document
            .file_url
            .as_deref()
            .map(|url| ctx.client.url_for(url))
            .unwrap_or_default();
        return view! {
            <iframe class="pdf-frame" title=document.display_title().to_string() src=src></iframe>
        }
        .into_any();
    }

    if !doc.is_editable() {
        let note = format!(
            "This document is larger than {} and opens read-only.",
            format_size(MAX_EDITABLE_SIZE)
        );
        return view! {
            <p class="editor-note muted">{note}</p>
            <article
                class="preview"
                inner_html=move || content.with(|c| render_preview(doc_type, c))
            ></article>
        }
        .into_any();
    }

    let on_input = {
        let doc = doc.clone();
        move |ev| doc.edit_content(event_target_value(&ev))
    };
    let on_keydown = move |ev: KeyboardEvent| {
        if (ev.ctrl_key() || ev.meta_key()) && ev.key().eq_ignore_ascii_case("s") {
            ev.prevent_default();
            let doc = doc.clone();
            spawn_local(async move {
                ui.report(doc.save_now().await);
            });
        }
    };

    view! {
        <Show
            when=move || preview.get()
            fallback=move || view! {
                <textarea
                    class="editor-text"
                    spellcheck="false"
                    prop:value=move || content.get()
                    on:input=on_input.clone()
                    on:keydown=on_keydown.clone()
                ></textarea>
            }
        >
            <article
                class="preview"
                inner_html=move || content.with(|c| render_preview(doc_type, c))
            ></article>
        </Show>
    }
    .into_any()
}
