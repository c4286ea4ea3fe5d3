//! Application interface and state.

pub mod error;
pub mod middleware;

use std::time::Duration;

pub use error::AppError;

use axum_valid::{Garde, GardeRejection, HasValidate};

use axum::{
    Form, Json, RequestExt as _, Router,
    extract::{FromRef, FromRequest, FromRequestParts, MatchedPath, Path, Query, Request},
    middleware::from_fn,
    response::{IntoResponse, Response},
};

use derive_more::Deref;

use garde::Validate;
use http::{HeaderValue, StatusCode, header};

use serde::de::DeserializeOwned;

use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{app::error::AppErrorKind, config::Config, directory::UserDirectory, routes};

/// Shared app state.
///
/// Cheaply cloneable.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The user directory, holding the database connection pool.
    pub directory: UserDirectory,
}

// garde validators without a custom context use `()`.
impl FromRef<AppState> for () {
    fn from_ref(_: &AppState) -> Self {}
}

/// Builds the full HTTP application, with every route and layer.
pub fn router(state: AppState, config: &Config) -> Router {
    Router::new()
        .merge(routes::router().with_state(state))
        .merge(routes::openapi_router())
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(middleware::log_app_errors))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|req: &Request| {
                            let method = req.method();
                            let uri = req.uri();

                            // axum automatically adds this extension.
                            let matched_path = req
                                .extensions()
                                .get::<MatchedPath>()
                                .map(|matched_path| matched_path.as_str());

                            tracing::debug_span!("request", %method, %uri, matched_path)
                        })
                        // By default `TraceLayer` will log 5xx responses but we're doing our specific
                        // logging of errors so disable that
                        .on_failure(()),
                )
                .layer(cors_layer(&config.cors.allow_origins))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    config.server.request_timeout,
                ))
                .layer(from_fn(middleware::security_headers)),
        )
}

/// Builds the CORS layer.
///
/// An origin of `*` allows any origin.
pub fn cors_layer(allow_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    if allow_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins = allow_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();

    layer.allow_origin(AllowOrigin::list(origins))
}

/// Selective body extractor.
///
/// The directory API can accept both JSON and urlencoded bodies.
#[derive(Deref)]
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // switch on content type
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppErrorKind::MissingContentType)?;

        // ignore parameters like `; charset=utf-8`
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();

        match mime {
            "application/x-www-form-urlencoded" => {
                let AppForm(form) = req.extract_with_state::<AppForm<T>, _, _>(state).await?;
                Ok(Payload(form))
            }
            "application/json" => {
                let AppJson(json) = req.extract_with_state::<AppJson<T>, _, _>(state).await?;
                Ok(Payload(json))
            }
            mime => Err(AppErrorKind::UnsupportedContentType(mime.to_owned()).into()),
        }
    }
}

impl<T> HasValidate for Payload<T> {
    type Validate = T;

    fn get_validate(&self) -> &Self::Validate {
        &self.0
    }
}

/// Extractor that reads from the query string, falling back to the body.
///
/// The query string is used only if it deserializes to `T` on its own.
#[derive(Deref)]
pub struct QueryOrPayload<T>(pub T);

impl<S, T> FromRequest<S> for QueryOrPayload<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if req.uri().query().is_some() {
            match Query::<T>::try_from_uri(req.uri()) {
                Ok(Query(query)) => return Ok(QueryOrPayload(query)),
                // with no body to fall back on, the query was the payload
                Err(rejection) if !req.headers().contains_key(header::CONTENT_TYPE) => {
                    return Err(rejection.into());
                }
                Err(_) => (),
            }
        }

        let Payload(body) = req.extract_with_state::<Payload<T>, _, _>(state).await?;
        Ok(QueryOrPayload(body))
    }
}

/// App Garde extractor.
#[derive(Deref)]
pub struct AppGarde<T>(pub T);

impl<S, T> FromRequest<S> for AppGarde<T>
where
    S: Send + Sync,
    T: FromRequest<S> + HasValidate + 'static,
    AppError: From<<T as FromRequest<S>>::Rejection>,
    <T as HasValidate>::Validate: Validate,
    <<T as HasValidate>::Validate as Validate>::Context: Send + Sync + FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let valid = request.extract_with_state::<Garde<T>, S, _>(state).await;

        match valid {
            Ok(Garde(valid)) => Ok(AppGarde(valid)),
            Err(GardeRejection::Valid(garde)) => Err(AppErrorKind::Garde(garde).into()),
            Err(GardeRejection::Inner(err)) => Err(err.into()),
        }
    }
}

/// App Form extractor.
#[derive(Deref, FromRequest)]
#[from_request(via(Form), rejection(AppError))]
pub struct AppForm<T>(pub T);

/// App path extractor.
#[derive(Deref, FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// App JSON extractor and responder.
#[derive(Deref, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl<T> IntoResponse for AppJson<T>
where
    Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}
