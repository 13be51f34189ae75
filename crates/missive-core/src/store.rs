//! The `SubmissionStore` trait and write-failure classification.
//!
//! The trait is implemented by storage backends (e.g. `missive-store-sqlite`).
//! The HTTP handler depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{id::SubmissionId, submission::Submission};

/// What went wrong with a conditional write, as far as the caller needs to
/// know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailure {
  /// A record already exists under the submission's id.
  Conflict,
  /// The store refused the record's shape or size.
  ValidationRejected,
  /// Anything else: connectivity, I/O, internal faults.
  Other,
}

/// Implemented by store error types so callers can branch on the failure kind
/// without inspecting messages.
pub trait ClassifyWrite {
  fn classify(&self) -> WriteFailure;
}

/// Abstraction over a key-value store holding submissions keyed by id.
///
/// There is deliberately no update or delete operation. Records are written
/// once and handed to downstream consumers.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SubmissionStore: Send + Sync {
  type Error: std::error::Error + ClassifyWrite + Send + Sync + 'static;

  /// The logical table (collection) this store writes to.
  fn table(&self) -> &str;

  /// Insert `submission` under its id and return the stored record, failing
  /// with a [`WriteFailure::Conflict`] error if a record already occupies
  /// that key.
  ///
  /// The existence check and the insert are one atomic operation.
  fn insert_if_absent(
    &self,
    submission: Submission,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  /// Retrieve a submission by id. Returns `None` if not found.
  fn get(
    &self,
    id: SubmissionId,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;
}
