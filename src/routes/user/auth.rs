//! Login and registration.
//!
//! Passwords are compared and stored as given. Nothing here issues a token or
//! session; a successful login only returns the user's id and name.

use axum::extract::State;

use tracing::instrument;

use user_directory_model::{
    ApiMessage, LoginUser,
    request::user::{LoginRequest, RegisterRequest},
};

use crate::app::{AppError, AppGarde, AppJson, AppState, Payload, QueryOrPayload};

/// Checks a user's credentials.
///
/// Takes `name` and `password` from the query string, or from the body.
#[instrument(skip_all, fields(name = %credentials.name))]
pub async fn login(
    State(state): State<AppState>,
    QueryOrPayload(credentials): QueryOrPayload<LoginRequest>,
) -> Result<AppJson<LoginUser>, AppError> {
    state
        .directory
        .login(&credentials.name, &credentials.password)
        .await
        .map(AppJson)
        .map_err(AppError::from)
}

/// Registers a new user.
#[instrument(skip_all, fields(name = %request.name))]
pub async fn register(
    State(state): State<AppState>,
    AppGarde(Payload(request)): AppGarde<Payload<RegisterRequest>>,
) -> Result<AppJson<ApiMessage>, AppError> {
    let id = state
        .directory
        .register(&request.name, &request.password)
        .await?;

    Ok(AppJson(ApiMessage::ok(format!("created: {}", id))))
}
