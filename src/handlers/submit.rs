use axum::{Json, extract::State};
use tracing::info;

use crate::error::{MessageBody, SurveyError};
use crate::middleware::SurveyJson;
use crate::router::SurveyState;
use crate::types::SubmitRequest;

/// POST /submit -> validates the six survey fields and inserts one row on the primary.
pub async fn submit_handler(
    State(state): State<SurveyState>,
    SurveyJson(body): SurveyJson<SubmitRequest>,
) -> Result<Json<MessageBody>, SurveyError> {
    let user = body.validate()?;
    state.writer.insert_user(&user).await?;

    info!(mobile = %user.mobile, "user information submitted");
    Ok(Json(MessageBody::new(
        "User information submitted successfully!",
    )))
}
