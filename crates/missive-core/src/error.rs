//! Error types for `missive-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed submission id: {0:?}")]
  InvalidId(String),

  #[error("unknown submission status: {0:?}")]
  UnknownStatus(String),

  #[error("malformed json: {0}")]
  Serialization(#[from] serde_json::Error),

  /// The body decoded to JSON `null`, which has no fields to read.
  #[error("request body is null")]
  NullBody,

  #[error("invalid timestamp {value:?}: {reason}")]
  InvalidTimestamp { value: String, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
