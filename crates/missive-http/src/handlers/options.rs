//! OPTIONS handler — CORS preflight. Touches nothing.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;

use crate::cors;

pub fn handler() -> Response {
  (
    StatusCode::OK,
    cors::headers(),
    Json(json!({ "message": "CORS preflight successful" })),
  )
    .into_response()
}
