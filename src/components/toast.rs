//! Toast notifications.

use leptos::prelude::*;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;

#[component]
pub fn ToastHost() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let ui = ctx.ui;

    view! {
        <div class="toasts" aria-live="polite">
            <For
                each=move || ui.toasts.get()
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    view! {
                        <div class=format!("toast toast-{}", toast.kind.as_str()) role="status">
                            <span class="toast-message">{toast.message}</span>
                            <button
                                class="icon-btn"
                                aria-label="Dismiss"
                                on:click=move |_| ui.dismiss(id)
                            >
                                <Icon icon=ic::CLOSE />
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}
