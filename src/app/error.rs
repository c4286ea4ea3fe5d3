//! Application error that may occur during the processing of a request.
//!
//! See [`AppError`].

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    sync::Arc,
};

use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
    response::{IntoResponse, Response},
};

use derive_more::{Display, From};

use http::StatusCode;

use user_directory_model::ApiError;

use crate::{app::AppJson, directory::DirectoryError};

/// Application error that may occur during the processing of a request.
///
/// This includes both internal errors and user errors.
#[derive(Debug)]
pub struct AppError {
    kind: AppErrorKind,
}

impl AppError {
    /// The inner [`AppErrorKind`] of the error.
    pub fn kind(&self) -> &AppErrorKind {
        &self.kind
    }

    /// Unwraps the inner error.
    pub fn into_kind(self) -> AppErrorKind {
        self.kind
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.kind, f)
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            AppErrorKind::Json(err) => Some(err),
            AppErrorKind::Form(err) => Some(err),
            AppErrorKind::Query(err) => Some(err),
            AppErrorKind::Path(err) => Some(err),
            AppErrorKind::Garde(err) => Some(err),
            AppErrorKind::Directory(err) => Some(err),
            AppErrorKind::MissingContentType | AppErrorKind::UnsupportedContentType(_) => None,
        }
    }
}

impl<T> From<T> for AppError
where
    T: Into<AppErrorKind>,
{
    fn from(value: T) -> Self {
        AppError { kind: value.into() }
    }
}

/// The specific kind of error that happened.
#[derive(Debug, Display, From)]
#[non_exhaustive]
pub enum AppErrorKind {
    /// The request's JSON payload was malformed or invalid.
    #[display("{_0}")]
    Json(JsonRejection),
    /// The request's form payload was malformed or invalid.
    #[display("{_0}")]
    Form(FormRejection),
    /// The request's query string was malformed or invalid.
    #[display("{_0}")]
    Query(QueryRejection),
    /// A path parameter was malformed.
    #[display("{_0}")]
    Path(PathRejection),
    /// The payload failed validation.
    #[display("{_0}")]
    Garde(garde::Report),
    /// The request has a body but no `Content-Type`.
    #[display("missing content type")]
    #[from(ignore)]
    MissingContentType,
    /// The request body is in a format the API does not accept.
    #[display("unsupported content type {_0:?}")]
    #[from(ignore)]
    UnsupportedContentType(String),
    /// A directory operation failed.
    #[display("{_0}")]
    Directory(DirectoryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut internal_error = None;

        let (status, message) = match self.kind {
            AppErrorKind::Json(error) => (StatusCode::BAD_REQUEST, error.to_string()),
            AppErrorKind::Form(error) => (StatusCode::BAD_REQUEST, error.to_string()),
            AppErrorKind::Query(error) => (StatusCode::BAD_REQUEST, error.to_string()),
            AppErrorKind::Path(error) => (StatusCode::BAD_REQUEST, error.to_string()),
            AppErrorKind::Garde(report) => (StatusCode::BAD_REQUEST, report.to_string()),
            error @ (AppErrorKind::MissingContentType
            | AppErrorKind::UnsupportedContentType(_)) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, error.to_string())
            }
            AppErrorKind::Directory(
                error @ (DirectoryError::NotFound
                | DirectoryError::Empty
                | DirectoryError::InvalidCredentials),
            ) => (StatusCode::NOT_FOUND, error.to_string()),
            AppErrorKind::Directory(error @ DirectoryError::Conflict) => {
                (StatusCode::BAD_REQUEST, error.to_string())
            }
            // fallthrough for internal server errors not turned into user
            // errors here
            error => {
                internal_error = Some(error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occured.".to_owned(),
                )
            }
        };

        let error = ApiError {
            message,
            status: status.as_u16(),
        };

        let mut response = (status, AppJson(error)).into_response();
        if let Some(error) = internal_error {
            response.extensions_mut().insert(Arc::new(error));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: DirectoryError) -> StatusCode {
        AppError::from(error).into_response().status()
    }

    #[test]
    pub fn test_directory_status_codes() {
        assert_eq!(status_of(DirectoryError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(DirectoryError::Empty), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(DirectoryError::InvalidCredentials),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_of(DirectoryError::Conflict), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(DirectoryError::Store(sqlx::Error::PoolClosed)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    pub fn test_internal_error_is_attached() {
        let response = AppError::from(DirectoryError::Store(sqlx::Error::PoolTimedOut))
            .into_response();

        assert!(response.extensions().get::<Arc<AppErrorKind>>().is_some());

        let response = AppError::from(DirectoryError::NotFound).into_response();
        assert!(response.extensions().get::<Arc<AppErrorKind>>().is_none());
    }
}
