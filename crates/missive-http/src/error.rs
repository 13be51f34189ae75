//! Error types and axum `IntoResponse` implementation.
//!
//! Every failure the handler can hit ends up here and leaves as a JSON body
//! with the CORS header set. 500-class variants carry their detail for the
//! operational log only; the response body is always the same generic text.

use axum::{
  Json,
  http::{Method, StatusCode},
  response::{IntoResponse, Response},
};
use missive_core::{
  InvalidSubmission,
  store::{ClassifyWrite, WriteFailure},
};
use serde_json::json;
use thiserror::Error;

use crate::cors;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("method not allowed: {0}")]
  MethodNotAllowed(Method),

  #[error("invalid submission: {0}")]
  Invalid(#[from] InvalidSubmission),

  #[error("duplicate submission: {0}")]
  Duplicate(#[source] BoxError),

  #[error("store rejected record: {0}")]
  Rejected(#[source] BoxError),

  #[error("unreadable body: {0}")]
  Body(String),

  /// Malformed JSON, or a bare `null`.
  #[error("undecodable body: {0}")]
  Decode(#[from] missive_core::Error),

  #[error("store error: {0}")]
  Store(#[source] BoxError),
}

impl Error {
  /// Sort a store failure by its classified kind.
  pub fn from_store<E>(e: E) -> Self
  where
    E: ClassifyWrite + std::error::Error + Send + Sync + 'static,
  {
    let kind = e.classify();
    let boxed: BoxError = Box::new(e);
    match kind {
      WriteFailure::Conflict => Error::Duplicate(boxed),
      WriteFailure::ValidationRejected => Error::Rejected(boxed),
      WriteFailure::Other => Error::Store(boxed),
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Error::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
      Error::Invalid(InvalidSubmission::UnsupportedValue(_))
      | Error::Body(_)
      | Error::Decode(_)
      | Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
      Error::Invalid(_) | Error::Rejected(_) => StatusCode::BAD_REQUEST,
      Error::Duplicate(_) => StatusCode::CONFLICT,
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let body = match &self {
      Error::MethodNotAllowed(_) => json!({ "error": "Method not allowed" }),
      Error::Invalid(InvalidSubmission::MissingFields) => json!({
        "error": "Missing required fields: name, email, and message are required"
      }),
      Error::Invalid(InvalidSubmission::InvalidEmail) => {
        json!({ "error": "Invalid email format" })
      }
      Error::Duplicate(_) => json!({ "error": "Duplicate submission detected" }),
      Error::Rejected(_) => json!({ "error": "Invalid data format" }),
      Error::Invalid(InvalidSubmission::UnsupportedValue(_))
      | Error::Body(_)
      | Error::Decode(_)
      | Error::Store(_) => json!({
        "error": "Internal server error",
        "message": "Failed to process contact form submission"
      }),
    };
    (self.status(), cors::headers(), Json(body)).into_response()
  }
}
