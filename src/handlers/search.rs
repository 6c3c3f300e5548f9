use axum::{Json, extract::State};
use serde::Deserialize;

use crate::db::models::UserRecord;
use crate::error::SurveyError;
use crate::middleware::SurveyQuery;
use crate::router::SurveyState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

/// GET /search?query=... -> first user whose name or mobile equals `query`, from the replica.
pub async fn search_handler(
    State(state): State<SurveyState>,
    SurveyQuery(params): SurveyQuery<SearchQuery>,
) -> Result<Json<UserRecord>, SurveyError> {
    let Some(term) = params.query else {
        return Err(SurveyError::UserNotFound);
    };

    state
        .reader
        .find_first(&term)
        .await?
        .map(Json)
        .ok_or(SurveyError::UserNotFound)
}
