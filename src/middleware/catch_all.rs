//! Last-resort responses: panics inside handlers, unmatched routes and methods.

use std::any::Any;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::error::{MessageBody, UNEXPECTED_MESSAGE};

/// Panic handler for `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!(panic = %detail, "unexpected error");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(MessageBody::new(UNEXPECTED_MESSAGE)),
    )
        .into_response()
}

pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(MessageBody::new("Not found."))).into_response()
}

pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(MessageBody::new("Method not allowed.")),
    )
        .into_response()
}
