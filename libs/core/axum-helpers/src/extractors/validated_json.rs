//! `Json` followed by `Validate`, rejecting with the shared error body

use crate::errors::AppError;
use axum::{
    extract::{FromRequest, Json, Request},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Request body that has already passed its `#[validate]` rules.
///
/// A body that is not JSON, or does not fit `T`, is answered with
/// `JSON_EXTRACTION`; one that parses but breaks a rule gets 400
/// `VALIDATION_ERROR` whose `details` are keyed by field name.
///
/// ```ignore
/// async fn register(ValidatedJson(input): ValidatedJson<RegisterRequest>) -> Result<..> {
///     // input.email is a syntactically valid address here
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let reject = |e: AppError| e.into_response();
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| reject(e.into()))?;
        value.validate().map_err(|e| reject(e.into()))?;
        Ok(Self(value))
    }
}
