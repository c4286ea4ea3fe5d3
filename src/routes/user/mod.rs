//! User endpoints.

use axum::extract::State;

use tracing::instrument;

use user_directory_model::{ApiMessage, User, request::user::UserRequest};

use crate::app::{AppError, AppGarde, AppJson, AppPath, AppState, Payload};

pub mod auth;

/// Creates a user.
///
/// `money` and `admin` default to `0` and `false`.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    AppGarde(Payload(request)): AppGarde<Payload<UserRequest>>,
) -> Result<AppJson<ApiMessage>, AppError> {
    let id = state.directory.create(request).await?;

    Ok(AppJson(ApiMessage::ok(format!("created: {}", id))))
}

/// Shows a single user.
#[instrument(skip(state))]
pub async fn show(
    AppPath(user_id): AppPath<String>,
    State(state): State<AppState>,
) -> Result<AppJson<User>, AppError> {
    state
        .directory
        .get(&user_id)
        .await
        .map(AppJson)
        .map_err(AppError::from)
}

/// Replaces a user's fields.
#[instrument(skip(state, request))]
pub async fn update(
    AppPath(user_id): AppPath<String>,
    State(state): State<AppState>,
    AppGarde(Payload(request)): AppGarde<Payload<UserRequest>>,
) -> Result<AppJson<ApiMessage>, AppError> {
    let id = state.directory.update(&user_id, request).await?;

    Ok(AppJson(ApiMessage::ok(format!("updated: {}", id))))
}

/// Deletes a user.
#[instrument(skip(state))]
pub async fn delete(
    AppPath(user_id): AppPath<String>,
    State(state): State<AppState>,
) -> Result<AppJson<ApiMessage>, AppError> {
    let id = state.directory.delete(&user_id).await?;

    Ok(AppJson(ApiMessage::ok(format!("deleted: {}", id))))
}

/// Lists every user.
pub async fn list(State(state): State<AppState>) -> Result<AppJson<Vec<User>>, AppError> {
    state
        .directory
        .list_all()
        .await
        .map(AppJson)
        .map_err(AppError::from)
}
