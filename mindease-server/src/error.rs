//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a `{"error": "..."}` JSON body with an appropriate status code.
//!
//! Store failures are reported with the store's own error text; callers get
//! no further classification.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{debug, error};

use crate::db::StoreError;
use crate::schemas::common::ErrorResponse;

/// All errors that can occur in the mindease-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The request body is missing a field, has a mistyped field, or breaks
    /// a field rule.
    #[error("{0}")]
    Validation(String),

    /// Propagated from the document store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No route matches the request.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            ServerError::Validation(m) => debug!(error = %m, "request validation failed"),
            ServerError::Store(e) => error!(error = %e, "document store error"),
            ServerError::NotFound(_) => {}
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
