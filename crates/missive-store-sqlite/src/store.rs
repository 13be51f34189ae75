//! [`SqliteStore`] — the SQLite implementation of [`SubmissionStore`].

use std::{path::Path, sync::Arc};

use missive_core::{Submission, SubmissionId, store::SubmissionStore};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::RawSubmission,
  schema::{check_table_name, insert_sql, schema, select_sql},
};

/// Outcome of the conditional insert, decided inside the database thread.
enum Insert {
  Written,
  Occupied,
  Refused(String),
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A submission store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Open it once
/// per process and share it between requests.
#[derive(Clone)]
pub struct SqliteStore {
  conn:       tokio_rusqlite::Connection,
  table:      Arc<str>,
  insert_sql: Arc<str>,
  select_sql: Arc<str>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` writing to `table`, and run schema
  /// initialisation.
  pub async fn open(path: impl AsRef<Path>, table: &str) -> Result<Self> {
    check(table)?;
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn, table).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory(table: &str) -> Result<Self> {
    check(table)?;
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn, table).await
  }

  async fn init(conn: tokio_rusqlite::Connection, table: &str) -> Result<Self> {
    let ddl = schema(table);
    conn
      .call(move |conn| {
        conn.execute_batch(&ddl)?;
        Ok(())
      })
      .await?;

    tracing::debug!(table, "submission table ready");

    Ok(Self {
      conn,
      table: table.into(),
      insert_sql: insert_sql(table).into(),
      select_sql: select_sql(table).into(),
    })
  }
}

fn check(table: &str) -> Result<()> {
  if check_table_name(table) {
    Ok(())
  } else {
    Err(Error::InvalidTableName(table.to_owned()))
  }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _) if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

// ─── SubmissionStore impl ────────────────────────────────────────────────────

impl SubmissionStore for SqliteStore {
  type Error = Error;

  fn table(&self) -> &str { &self.table }

  async fn insert_if_absent(&self, submission: Submission) -> Result<Submission> {
    let raw = RawSubmission::from_submission(&submission);
    let sql = Arc::clone(&self.insert_sql);

    let outcome = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          &sql,
          rusqlite::params![
            raw.id,
            raw.name,
            raw.email,
            raw.subject,
            raw.message,
            raw.timestamp,
            raw.created_at,
            raw.status,
            raw.source,
          ],
        );
        match result {
          Ok(0) => Ok(Insert::Occupied),
          Ok(_) => Ok(Insert::Written),
          Err(e) if is_constraint_violation(&e) => Ok(Insert::Refused(e.to_string())),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    match outcome {
      Insert::Written => Ok(submission),
      Insert::Occupied => Err(Error::Conflict(submission.id)),
      Insert::Refused(reason) => Err(Error::Rejected {
        table: self.table.to_string(),
        reason,
      }),
    }
  }

  async fn get(&self, id: SubmissionId) -> Result<Option<Submission>> {
    let id_str = id.to_string();
    let sql = Arc::clone(&self.select_sql);

    let raw: Option<RawSubmission> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawSubmission::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubmission::into_submission).transpose()
  }
}
