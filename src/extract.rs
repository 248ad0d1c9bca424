use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};

use crate::errors::AppError;

/// Request-body JSON extractor. The stock extractor rejects undeserializable
/// bodies with a plain-text 422; this one answers with the same
/// `{success, message}` envelope as every other error.
pub struct AppJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(AppError::Validation(rejection.body_text())),
        }
    }
}
