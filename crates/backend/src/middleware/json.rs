use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use shared::errors::HttpError;
use tracing::warn;

/// JSON body whose parse failures are reported as `ErrorResponse` 400s.
/// Field-level checks are left to the services.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                warn!("⚠️ Rejected request body: {}", rejection.body_text());
                HttpError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
            })?;

        Ok(Self(value))
    }
}
