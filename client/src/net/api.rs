//! Typed resource clients over the request gateway.
//!
//! Every function here is a thin description of one endpoint: path, method,
//! payload, and the expected response type. Token handling, URL resolution,
//! and error classification all happen in [`Gateway`].
//!
//! ERROR HANDLING
//! ==============
//! All calls return `Result<_, ApiError>`; nothing is swallowed here. Auth
//! calls are wrapped with user-facing messages one layer up in
//! `state::auth`.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::error::ApiError;
use super::gateway::{CONTENT_TYPE, FORM_CONTENT_TYPE, Gateway, RequestBody, RequestOptions};
use super::transport::Method;
use super::types::{
    AuthToken, Credentials, ListParams, Prompt, PromptCollaborator, PromptCreate, PromptImplementationCreate,
    PromptImplementationRecord, PromptShare, PromptTagCreate, PromptTagListResponse, PromptTagStats, PromptTagUpdate,
    PromptUpdate, PromptVersion, User, UserAdminUpdate,
};

fn prompt_endpoint(prompt_id: i64) -> String {
    format!("/prompts/{prompt_id}")
}

fn prompt_share_endpoint(prompt_id: i64, user_id: i64) -> String {
    format!("/prompts/{prompt_id}/share/{user_id}")
}

fn prompt_tag_endpoint(tag_id: i64) -> String {
    format!("/prompt-tags/{tag_id}")
}

fn user_endpoint(user_id: i64) -> String {
    format!("/users/{user_id}")
}

fn list_endpoint(base: &str, params: &ListParams) -> String {
    format!("{base}{}", params.query_string())
}

// =============================================================
// Auth
// =============================================================

/// Register a new account via `POST /auth/signup`. Does not log in.
pub async fn signup(gateway: &Gateway, credentials: &Credentials) -> Result<User, ApiError> {
    gateway.send_json(Method::Post, "/auth/signup", credentials).await
}

/// Exchange credentials for a token via `POST /auth/login`.
///
/// The only form-encoded call in the API.
pub async fn login(gateway: &Gateway, credentials: &Credentials) -> Result<AuthToken, ApiError> {
    let form = vec![
        ("username".to_owned(), credentials.username.clone()),
        ("password".to_owned(), credentials.password.clone()),
    ];
    let options = RequestOptions::new(Method::Post)
        .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
        .body(RequestBody::Form(form));
    gateway.request_as("/auth/login", options).await
}

/// Fetch the user behind the stored token from `GET /auth/me`.
pub async fn fetch_current_user(gateway: &Gateway) -> Result<User, ApiError> {
    gateway.get("/auth/me").await
}

/// Same as [`fetch_current_user`], authenticating with `token` instead of the store.
pub async fn fetch_current_user_with_token(gateway: &Gateway, token: &str) -> Result<User, ApiError> {
    gateway.request_as("/auth/me", RequestOptions::new(Method::Get).bearer(token)).await
}

// =============================================================
// Prompts
// =============================================================

pub async fn list_prompts(gateway: &Gateway, params: &ListParams) -> Result<Vec<Prompt>, ApiError> {
    gateway.get(&list_endpoint("/prompts", params)).await
}

pub async fn get_prompt(gateway: &Gateway, prompt_id: i64) -> Result<Prompt, ApiError> {
    gateway.get(&prompt_endpoint(prompt_id)).await
}

pub async fn create_prompt(gateway: &Gateway, payload: &PromptCreate) -> Result<Prompt, ApiError> {
    gateway.send_json(Method::Post, "/prompts/", payload).await
}

pub async fn update_prompt(gateway: &Gateway, prompt_id: i64, payload: &PromptUpdate) -> Result<Prompt, ApiError> {
    gateway.send_json(Method::Put, &prompt_endpoint(prompt_id), payload).await
}

pub async fn delete_prompt(gateway: &Gateway, prompt_id: i64) -> Result<(), ApiError> {
    gateway.delete(&prompt_endpoint(prompt_id)).await
}

/// Add a version; the service makes it current.
pub async fn create_prompt_version(
    gateway: &Gateway,
    prompt_id: i64,
    version: &str,
    content: &str,
) -> Result<Prompt, ApiError> {
    let payload = PromptUpdate {
        version: Some(version.to_owned()),
        content: Some(content.to_owned()),
        ..PromptUpdate::default()
    };
    update_prompt(gateway, prompt_id, &payload).await
}

pub async fn switch_prompt_version(
    gateway: &Gateway,
    prompt_id: i64,
    version: &PromptVersion,
) -> Result<Prompt, ApiError> {
    let payload = PromptUpdate { activate_version_id: Some(version.id), ..PromptUpdate::default() };
    update_prompt(gateway, prompt_id, &payload).await
}

pub async fn list_prompt_collaborators(gateway: &Gateway, prompt_id: i64) -> Result<Vec<PromptCollaborator>, ApiError> {
    gateway.get(&format!("/prompts/{prompt_id}/collaborators")).await
}

pub async fn share_prompt(
    gateway: &Gateway,
    prompt_id: i64,
    payload: &PromptShare,
) -> Result<PromptCollaborator, ApiError> {
    gateway.send_json(Method::Post, &format!("/prompts/{prompt_id}/share"), payload).await
}

pub async fn revoke_prompt_share(gateway: &Gateway, prompt_id: i64, user_id: i64) -> Result<(), ApiError> {
    gateway.delete(&prompt_share_endpoint(prompt_id, user_id)).await
}

pub async fn list_prompt_implementations(
    gateway: &Gateway,
    prompt_id: i64,
) -> Result<Vec<PromptImplementationRecord>, ApiError> {
    gateway.get(&format!("/prompts/{prompt_id}/implementations")).await
}

pub async fn create_prompt_implementation(
    gateway: &Gateway,
    prompt_id: i64,
    payload: &PromptImplementationCreate,
) -> Result<PromptImplementationRecord, ApiError> {
    gateway.send_json(Method::Post, &format!("/prompts/{prompt_id}/implementations"), payload).await
}

// =============================================================
// Prompt tags
// =============================================================

pub async fn list_prompt_tags(gateway: &Gateway) -> Result<PromptTagListResponse, ApiError> {
    gateway.get("/prompt-tags").await
}

pub async fn create_prompt_tag(gateway: &Gateway, payload: &PromptTagCreate) -> Result<PromptTagStats, ApiError> {
    gateway.send_json(Method::Post, "/prompt-tags", payload).await
}

pub async fn update_prompt_tag(
    gateway: &Gateway,
    tag_id: i64,
    payload: &PromptTagUpdate,
) -> Result<PromptTagStats, ApiError> {
    gateway.send_json(Method::Patch, &prompt_tag_endpoint(tag_id), payload).await
}

pub async fn delete_prompt_tag(gateway: &Gateway, tag_id: i64) -> Result<(), ApiError> {
    gateway.delete(&prompt_tag_endpoint(tag_id)).await
}

// =============================================================
// Users (admin)
// =============================================================

pub async fn list_users(gateway: &Gateway, params: &ListParams) -> Result<Vec<User>, ApiError> {
    gateway.get(&list_endpoint("/users", params)).await
}

pub async fn get_user(gateway: &Gateway, user_id: i64) -> Result<User, ApiError> {
    gateway.get(&user_endpoint(user_id)).await
}

pub async fn update_user(gateway: &Gateway, user_id: i64, payload: &UserAdminUpdate) -> Result<User, ApiError> {
    gateway.send_json(Method::Patch, &user_endpoint(user_id), payload).await
}
