use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{error::AppError, state::AppState};
use crate::store::Post;

/// Credentials every mutating request carries in its query string.
///
/// Every field is optional so that extraction never fails before the gate runs.
#[derive(Deserialize)]
pub struct AdminCredentials {
    password: Option<String>,
    user_id: Option<String>,
}

#[derive(Deserialize)]
pub struct AuthPayload {
    password: Option<String>,
    user_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct AddCategoryParams {
    category: Option<String>,
}

#[derive(Deserialize)]
pub struct RenameParams {
    new_name: Option<String>,
}

async fn require_admin(state: &AppState, credentials: &AdminCredentials) -> Result<(), AppError> {
    let user_id = credentials
        .user_id
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i64>().ok());
    let (Some(password), Some(user_id)) = (&credentials.password, user_id) else {
        return Err(AppError::Unauthorized("Missing password or user_id".to_owned()));
    };

    state.gate.verify(password, user_id).await?;
    Ok(())
}

fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::InvalidInput(format!("Missing query parameter '{name}'")))
}

fn post_body(body: Result<Json<Post>, JsonRejection>) -> Result<Post, AppError> {
    body.map(|Json(post)| post)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}

/// Negative, non-numeric or out-of-range indices address nothing.
fn post_index(raw: &str) -> Result<usize, AppError> {
    raw.parse::<usize>()
        .map_err(|_| AppError::NotFound(format!("Post {raw} not found")))
}

pub async fn categories_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.store.get_all().await)
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "categories_count": state.store.category_count().await,
        "posts_count": state.store.post_count().await,
        "bot_connected": false,
        "started_at": state.started_at,
    }))
}

pub async fn auth_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AuthPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Ok(Json(AuthPayload {
        password: Some(password),
        user_id: Some(user_id),
    })) = payload
    else {
        return Err(AppError::Unauthorized("Missing password or user_id".to_owned()));
    };

    state.gate.verify(&password, user_id).await?;
    Ok(Json(json!({ "status": "success" })))
}

pub async fn add_category_handler(
    State(state): State<Arc<AppState>>,
    Query(credentials): Query<AdminCredentials>,
    Query(params): Query<AddCategoryParams>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&state, &credentials).await?;
    let category = required(params.category, "category")?;
    state.store.add_category(&category).await?;

    Ok(Json(json!({
        "status": "success",
        "category": category,
    })))
}

pub async fn delete_category_handler(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(credentials): Query<AdminCredentials>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&state, &credentials).await?;
    state.store.delete_category(&category).await?;

    Ok(Json(json!({ "status": "success" })))
}

pub async fn rename_category_handler(
    State(state): State<Arc<AppState>>,
    Path(old_name): Path<String>,
    Query(credentials): Query<AdminCredentials>,
    Query(params): Query<RenameParams>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&state, &credentials).await?;
    let new_name = required(params.new_name, "new_name")?;
    state.store.rename_category(&old_name, &new_name).await?;

    Ok(Json(json!({ "status": "success" })))
}

pub async fn add_post_handler(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(credentials): Query<AdminCredentials>,
    body: Result<Json<Post>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&state, &credentials).await?;
    let post = state.store.add_post(&category, post_body(body)?).await?;

    Ok(Json(json!({
        "status": "success",
        "post": post,
    })))
}

pub async fn update_post_handler(
    State(state): State<Arc<AppState>>,
    Path((category, index)): Path<(String, String)>,
    Query(credentials): Query<AdminCredentials>,
    body: Result<Json<Post>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&state, &credentials).await?;
    let post = post_body(body)?;
    let previous = state
        .store
        .update_post(&category, post_index(&index)?, post)
        .await?;
    debug!("Replaced '{}' at {}/{}", previous.title, category, index);

    Ok(Json(json!({ "status": "success" })))
}

pub async fn delete_post_handler(
    State(state): State<Arc<AppState>>,
    Path((category, index)): Path<(String, String)>,
    Query(credentials): Query<AdminCredentials>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&state, &credentials).await?;
    state
        .store
        .delete_post(&category, post_index(&index)?)
        .await?;

    Ok(Json(json!({ "status": "success" })))
}
