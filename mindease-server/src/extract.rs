//! Request extractors.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ServerError;

/// JSON body that has been decoded and passed its [`Validate`] rules.
///
/// Any decoding failure (bad syntax, missing or mistyped field, wrong content
/// type) and any rule violation becomes [`ServerError::Validation`] whose text
/// names the offending field.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ServerError::Validation(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| ServerError::Validation(errors.to_string()))?;
        Ok(Self(value))
    }
}
