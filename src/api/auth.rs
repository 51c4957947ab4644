//! Authentication endpoints. None of them trip the 401 gate: a rejected
//! login or session check is an expected answer, not an expired session.

use crate::core::error::ApiError;
use crate::core::http::{ApiClient, ApiRequest, Transport};
use crate::models::{Credentials, TokenGrant, User};

pub async fn login<T: Transport>(
    client: &ApiClient<T>,
    credentials: &Credentials,
) -> Result<TokenGrant, ApiError> {
    let request = ApiRequest::post("/api/auth/login")
        .json(credentials)?
        .silent_auth();
    client.send(request).await
}

/// Exchange the refresh cookie for a new access token.
pub async fn refresh<T: Transport>(client: &ApiClient<T>) -> Result<TokenGrant, ApiError> {
    client
        .send(ApiRequest::post("/api/auth/refresh").silent_auth())
        .await
}

/// Who the current token belongs to.
pub async fn me<T: Transport>(client: &ApiClient<T>) -> Result<User, ApiError> {
    client
        .send(ApiRequest::get("/api/auth/me").silent_auth())
        .await
}

pub async fn logout<T: Transport>(client: &ApiClient<T>) -> Result<(), ApiError> {
    client
        .send(ApiRequest::post("/api/auth/logout").silent_auth())
        .await
}
