//! Sign-in form.

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::app::AppContext;
use crate::components::router::RouteContext;
use crate::config::{APP_NAME, APP_VERSION};

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let route_ctx = use_context::<RouteContext>().expect("RouteContext must be provided");

    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let submitting = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        submitting.set(true);
        error.set(None);

        let auth = ctx.auth.clone();
        spawn_local(async move {
            let result = auth
                .login(&username.get_untracked(), &password.get_untracked())
                .await;
            submitting.set(false);
            match result {
                Ok(()) => {
                    password.set(String::new());
                    route_ctx.redirect(route_ctx.0.get_untracked().after_login());
                }
                Err(err) => error.set(Some(err.to_string())),
            }
        });
    };

    view! {
        <main class="login">
            <form class="login-card" on:submit=on_submit>
                <h1 class="login-title">{APP_NAME}</h1>
                <label class="field">
                    <span>"Username"</span>
                    <input
                        type="text"
                        name="username"
                        autocomplete="username"
                        autofocus=true
                        bind:value=username
                    />
                </label>
                <label class="field">
                    <span>"Password"</span>
                    <input
                        type="password"
                        name="password"
                        autocomplete="current-password"
                        bind:value=password
                    />
                </label>
                {move || error.get().map(|message| view! {
                    <p class="login-error" role="alert">{message}</p>
                })}
                <button class="btn btn-primary" type="submit" disabled=move || submitting.get()>
                    {move || if submitting.get() { "Signing in…" } else { "Sign in" }}
                </button>
                <p class="login-version">"v" {APP_VERSION}</p>
            </form>
        </main>
    }
}
