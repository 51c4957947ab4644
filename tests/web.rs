//! Browser checks, run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use folio::config::ACCESS_TOKEN_KEY;
use folio::core::storage;
use folio::models::{Route, User};
use folio::utils::markdown_to_html;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_replace_keeps_route_in_location() {
    Route::Files { folder: Some(12) }.replace();
    assert_eq!(Route::current(), Route::Files { folder: Some(12) });

    Route::Workspace.replace();
    assert_eq!(Route::current(), Route::Workspace);
}

#[wasm_bindgen_test]
fn test_storage_json_roundtrip() {
    let user = User {
        id: 4,
        username: "lin".to_string(),
        nickname: Some("Lin".to_string()),
        email: None,
        avatar: None,
        role: None,
    };
    storage::set_json("folio-test-user", &user).unwrap();

    let back: Option<User> = storage::get_json("folio-test-user");
    assert_eq!(back.map(|u| u.id), Some(4));

    storage::remove("folio-test-user").unwrap();
    assert!(storage::get("folio-test-user").is_none());
}

#[wasm_bindgen_test]
fn test_empty_token_clears_key() {
    storage::set_or_remove(ACCESS_TOKEN_KEY, Some("tok")).unwrap();
    assert_eq!(storage::get(ACCESS_TOKEN_KEY).as_deref(), Some("tok"));

    storage::set_or_remove(ACCESS_TOKEN_KEY, None).unwrap();
    assert!(storage::get(ACCESS_TOKEN_KEY).is_none());
}

#[wasm_bindgen_test]
fn test_preview_is_sanitized() {
    let html = markdown_to_html("# Title\n\n<img src=x onerror=alert(1)>");
    assert!(html.contains("<h1>"));
    assert!(!html.contains("onerror"));
}
