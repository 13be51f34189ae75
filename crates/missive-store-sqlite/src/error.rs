//! Error type for `missive-store-sqlite`.

use missive_core::{
  SubmissionId,
  store::{ClassifyWrite, WriteFailure},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] missive_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("invalid table name: {0:?}")]
  InvalidTableName(String),

  /// The conditional write found a record already stored under this id.
  #[error("submission {0} already exists")]
  Conflict(SubmissionId),

  /// A table constraint refused the record.
  #[error("record rejected by table {table}: {reason}")]
  Rejected { table: String, reason: String },
}

impl ClassifyWrite for Error {
  fn classify(&self) -> WriteFailure {
    match self {
      Error::Conflict(_) => WriteFailure::Conflict,
      Error::Rejected { .. } => WriteFailure::ValidationRejected,
      Error::Core(_) | Error::Database(_) | Error::InvalidTableName(_) => WriteFailure::Other,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
