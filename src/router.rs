use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::db::postgres::{PgPool, UsersStorage};
use crate::db::store::{UserReader, UserWriter};
use crate::handlers::{health_handler, search_handler, submit_handler};
use crate::middleware::catch_all::{handle_panic, method_not_allowed, not_found};

/// Request bodies above this size are rejected before parsing.
pub const BODY_LIMIT: usize = 100 * 1024;

/// Handler state: one store per endpoint. Writes never reach the replica.
#[derive(Clone)]
pub struct SurveyState {
    pub writer: Arc<dyn UserWriter>,
    pub reader: Arc<dyn UserReader>,
}

impl SurveyState {
    pub fn new(primary: PgPool, replica: PgPool) -> Self {
        Self::with_stores(
            Arc::new(UsersStorage::new(primary)),
            Arc::new(UsersStorage::new(replica)),
        )
    }

    pub fn with_stores(writer: Arc<dyn UserWriter>, reader: Arc<dyn UserReader>) -> Self {
        Self { writer, reader }
    }
}

pub fn survey_router(state: SurveyState) -> Router {
    Router::new()
        .route("/submit", post(submit_handler))
        .route("/search", get(search_handler))
        .route("/health", get(health_handler))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        // Outermost, so panic responses still carry CORS headers.
        .layer(CorsLayer::permissive())
}
