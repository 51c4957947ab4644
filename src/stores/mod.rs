//! Reactive stores.
//!
//! Each store pairs Leptos signals (read by the views) with async actions
//! that call [`crate::api`] and write the normalized result back. Stores
//! are generic over the [`Transport`](crate::core::http::Transport) so the
//! same actions run against an in-memory mock in tests; the default type
//! parameter is the browser transport.

pub mod auth;
pub mod doc;
pub mod document_list;
pub mod files;
pub mod latest;
pub mod paged;
pub mod recycle;
pub mod tree;
pub mod ui;

pub use auth::{AuthState, AuthStore};
pub use doc::DocStore;
pub use document_list::DocumentList;
pub use files::FileStore;
pub use latest::LatestDocuments;
pub use paged::{PageSource, PagedList};
pub use recycle::RecycleBin;
pub use tree::TreeStore;
pub use ui::{Theme, Toast, ToastKind, UiStore};

#[cfg(test)]
pub(crate) mod testing {
    use leptos::prelude::*;

    use crate::core::http::ApiClient;
    use crate::core::http::mock::MockTransport;
    use crate::models::User;
    use crate::stores::auth::AuthStore;

    /// A client over a fresh mock with user 1 signed in.
    pub(crate) fn signed_in()
    -> (ApiClient<MockTransport>, MockTransport, AuthStore<MockTransport>) {
        let transport = MockTransport::default();
        let client = ApiClient::new(transport.clone(), "http://api.test");
        client.session().set_quiet(Some("tok".to_string()));
        let auth = AuthStore::new(client.clone());
        auth.state().token.set(Some("tok".to_string()));
        auth.state().user.set(Some(User {
            id: 1,
            username: "ada".to_string(),
            nickname: None,
            email: None,
            avatar: None,
            role: None,
        }));
        (client, transport, auth)
    }
}
