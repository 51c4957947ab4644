//! End-to-end store flows over the in-memory transport.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use folio::core::ApiError;
use folio::core::http::mock::MockTransport;
use folio::core::http::{ApiClient, Method, RawResponse};
use folio::stores::{AuthStore, DocStore, DocumentList, LatestDocuments};
use leptos::prelude::*;
use serde_json::json;

fn client() -> (ApiClient<MockTransport>, MockTransport) {
    let transport = MockTransport::default();
    (ApiClient::new(transport.clone(), "http://api.test"), transport)
}

async fn signed_in() -> (ApiClient<MockTransport>, MockTransport, AuthStore<MockTransport>) {
    let (client, transport) = client();
    let auth = AuthStore::new(client.clone());
    transport.push_ok(json!({
        "accessToken": "tok-1",
        "user": { "id": 3, "username": "grace" }
    }));
    auth.login("grace", "hunter2").await.unwrap();
    (client, transport, auth)
}

fn doc(id: i64, title: &str) -> serde_json::Value {
    json!({ "id": id, "title": title, "type": "md" })
}

#[tokio::test]
async fn test_init_without_stored_session_stays_signed_out() {
    let (client, transport) = client();
    let auth = AuthStore::new(client);

    auth.init().await;

    assert!(auth.is_initialized());
    assert!(!auth.is_authenticated());
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_signed_out_list_sends_nothing() {
    let (client, transport) = client();
    let auth = AuthStore::new(client.clone());
    let documents = DocumentList::new(client, auth);

    let err = documents.load().await.unwrap_err();

    assert_eq!(err, ApiError::SignedOut);
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_list_requests_are_scoped_to_user() {
    let (client, transport, auth) = signed_in().await;
    let documents = DocumentList::new(client, auth);
    transport.push_ok(json!({ "items": [doc(1, "a")], "pagination": { "hasMore": false } }));

    documents.load().await.unwrap();

    let sent = transport.last_request().unwrap();
    assert_eq!(sent.query_value("userId"), Some("3"));
    assert_eq!(sent.header("authorization"), Some("Bearer tok-1"));
    assert_eq!(documents.list().len(), 1);
}

#[tokio::test]
async fn test_rotated_token_reaches_auth_state() {
    let (client, transport, auth) = signed_in().await;
    let latest = LatestDocuments::new(client.clone(), auth.clone());
    let body = json!({ "code": 200, "message": "success", "data": { "items": [] } });
    transport.push_response(RawResponse {
        status: 200,
        headers: vec![
            ("content-type".into(), "application/json".into()),
            ("x-new-token".into(), "tok-2".into()),
        ],
        body: body.to_string().into_bytes(),
    });

    latest.ensure_initialized().await.unwrap();

    assert_eq!(client.session().get().as_deref(), Some("tok-2"));
    assert_eq!(auth.state().token.get_untracked().as_deref(), Some("tok-2"));
}

#[tokio::test]
async fn test_burst_of_401s_signs_out_once() {
    let (client, transport, auth) = signed_in().await;
    let calls = Arc::new(AtomicUsize::new(0));
    {
        let calls = calls.clone();
        let auth = auth.clone();
        client.set_unauthorized_handler(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            auth.clear();
        });
    }
    let documents = DocumentList::new(client.clone(), auth.clone());
    let latest = LatestDocuments::new(client.clone(), auth.clone());
    transport.push_envelope(401, "Unauthorized", json!(null));
    transport.push_envelope(401, "Unauthorized", json!(null));

    let first = documents.load().await;
    let _ = latest.refresh().await;

    assert_eq!(first.unwrap_err(), ApiError::Unauthorized);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!auth.is_authenticated());
    assert_eq!(client.session().get(), None);
}

#[tokio::test]
async fn test_saved_document_moves_to_top_of_latest() {
    let (client, transport, auth) = signed_in().await;
    let latest = LatestDocuments::new(client.clone(), auth.clone());
    let editor = DocStore::new(client, auth, latest.clone());

    transport.push_ok(json!({
        "items": [doc(1, "a"), doc(2, "b")],
        "pagination": { "nextCursor": "c1", "hasMore": true }
    }));
    latest.ensure_initialized().await.unwrap();

    transport.push_ok(json!({ "id": 2, "title": "b", "type": "md", "content": "old" }));
    editor.open(2).await.unwrap();

    editor.edit_content("new".to_string());
    assert!(editor.is_dirty());

    transport.push_ok(json!({ "id": 2, "title": "b", "type": "md", "updatedAt": "2026-10-17T09:00:00" }));
    editor.save_now().await.unwrap();

    let put = transport.last_request().unwrap();
    assert_eq!(put.method, Method::Put);
    assert!(put.url.ends_with("/api/documents/2/file"));
    assert!(!editor.is_dirty());
    let ids: Vec<i64> = latest.list().items().iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[tokio::test]
async fn test_close_discards_pending_edits() {
    let (client, transport, auth) = signed_in().await;
    let latest = LatestDocuments::new(client.clone(), auth.clone());
    let editor = DocStore::new(client, auth, latest);
    transport.push_ok(json!({ "id": 5, "title": "draft", "type": "txt", "content": "x" }));
    editor.open(5).await.unwrap();

    editor.edit_content("xy".to_string());
    editor.close();
    editor.save_now().await.unwrap();

    assert_eq!(editor.current_id(), None);
    assert_eq!(transport.request_count(), 2);
}
