use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum SurveyError {
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("Invalid setting {name}: {value:?}")]
    InvalidSetting { name: &'static str, value: String },

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Malformed query string: {0}")]
    MalformedQuery(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Duplicate mobile number")]
    DuplicateMobile,

    #[error("User not found")]
    UserNotFound,

    #[error("Error inserting user: {0}")]
    InsertFailed(#[source] SqlxError),

    #[error("Error querying replica: {0}")]
    SearchFailed(#[source] SqlxError),
}

impl IntoResponse for SurveyError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            SurveyError::MissingFields => {
                (StatusCode::BAD_REQUEST, "All fields are required.".to_string())
            }
            SurveyError::InvalidField { field, reason } => {
                (StatusCode::BAD_REQUEST, format!("Field `{field}` {reason}."))
            }
            SurveyError::MalformedBody(_) => {
                (StatusCode::BAD_REQUEST, "Malformed request body.".to_string())
            }
            SurveyError::MalformedQuery(_) => {
                (StatusCode::BAD_REQUEST, "Malformed query string.".to_string())
            }
            SurveyError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large.".to_string(),
            ),
            SurveyError::DuplicateMobile => (
                StatusCode::CONFLICT,
                "A user with this mobile number already exists.".to_string(),
            ),
            SurveyError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            SurveyError::InsertFailed(e) => {
                error!(error = %e, "error inserting data");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error inserting data.".to_string(),
                )
            }
            SurveyError::SearchFailed(e) => {
                error!(error = %e, "error executing query on read replica");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            SurveyError::Config(_)
            | SurveyError::MissingSetting(_)
            | SurveyError::InvalidSetting { .. }
            | SurveyError::DatabaseError(_) => {
                error!(error = %self, "unexpected error");
                (StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED_MESSAGE.to_string())
            }
        };
        (status, Json(MessageBody { message })).into_response()
    }
}

pub(crate) const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred.";

/// Every JSON response other than a found row uses this shape.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: SurveyError) -> (StatusCode, String) {
        let resp = err.into_response();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn duplicate_mobile_is_conflict() {
        let (status, body) = render(SurveyError::DuplicateMobile).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("already exists"));
    }

    #[tokio::test]
    async fn database_failures_hide_details() {
        let (status, body) = render(SurveyError::InsertFailed(SqlxError::PoolTimedOut)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"message":"Error inserting data."}"#);

        let (status, body) = render(SurveyError::SearchFailed(SqlxError::PoolClosed)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"message":"Internal Server Error"}"#);
    }

    #[tokio::test]
    async fn invalid_field_names_the_field() {
        let (status, body) = render(SurveyError::InvalidField {
            field: "age",
            reason: "must be an integer".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("`age` must be an integer"));
    }
}
