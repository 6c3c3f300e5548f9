use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::{StatusCode, request::Parts};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::SurveyError;

/// `Json<T>` whose rejection is reported with the usual message body:
/// 413 past the body limit, 400 for anything else.
pub struct SurveyJson<T>(pub T);

impl<S, T> FromRequest<S> for SurveyJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = SurveyError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(SurveyJson(value)),
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                Err(SurveyError::PayloadTooLarge)
            }
            Err(rejection) => {
                debug!(reason = %rejection.body_text(), "rejected request body");
                Err(SurveyError::MalformedBody(rejection.body_text()))
            }
        }
    }
}

/// `Query<T>` whose rejection is a 400 with the usual message body.
pub struct SurveyQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for SurveyQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = SurveyError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(SurveyQuery(value)),
            Err(rejection) => {
                debug!(reason = %rejection.body_text(), "rejected query string");
                Err(SurveyError::MalformedQuery(rejection.body_text()))
            }
        }
    }
}
