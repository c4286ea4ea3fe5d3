//! HTTP routes.

pub mod user;

use axum::{
    Router,
    response::IntoResponse,
    routing::{get, post},
};

use http::header;

use crate::app::AppState;

const OPENAPI_FILE: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/openapi/openapi.yaml"));

/// The directory API routes.
pub fn router() -> Router<AppState> {
    Router::<AppState>::new()
        .route("/user", post(user::create))
        .route(
            "/user/{user_id}",
            get(user::show).put(user::update).delete(user::delete),
        )
        .route("/users", get(user::list))
        .route("/login", post(user::auth::login))
        .route("/register", post(user::auth::register))
}

/// Serves the OpenAPI document.
pub fn openapi_router() -> Router {
    Router::new().route("/openapi.yaml", get(serve_openapi))
}

async fn serve_openapi() -> impl IntoResponse {
    (
        [(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"openapi.yaml\"",
        )],
        OPENAPI_FILE,
    )
}
