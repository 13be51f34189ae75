//! SQL schema for the Missive SQLite store.
//!
//! The table name is configurable, so the DDL is rendered per store rather
//! than held in a constant. Callers must pass a name that has been through
//! [`check_table_name`].

/// Table written to when no override is configured.
pub const DEFAULT_TABLE: &str = "ContactFormSubmissions";

/// Upper bound on the combined byte size of a record's text attributes.
pub const MAX_ITEM_BYTES: usize = 400 * 1024;

/// Accept names of 3 to 255 characters drawn from `[A-Za-z0-9_.-]`.
///
/// Names are interpolated into SQL as quoted identifiers, so nothing outside
/// this set may get through.
pub fn check_table_name(name: &str) -> bool {
  (3..=255).contains(&name.len())
    && name
      .bytes()
      .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-'))
}

/// Connection pragmas plus the submissions table; idempotent thanks to
/// `CREATE TABLE IF NOT EXISTS`.
pub fn schema(table: &str) -> String {
  format!(
    "
PRAGMA journal_mode = WAL;

-- Submissions are write-once.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS \"{table}\" (
    id          TEXT PRIMARY KEY NOT NULL CHECK (length(id) > 0),
    name        TEXT NOT NULL CHECK (length(name) > 0),
    email       TEXT NOT NULL CHECK (length(email) > 0),
    subject     TEXT NOT NULL,
    message     TEXT NOT NULL CHECK (length(message) > 0),
    timestamp   TEXT NOT NULL,   -- ISO 8601 UTC, millisecond precision
    created_at  INTEGER NOT NULL,
    status      TEXT NOT NULL CHECK (status IN ('new')),
    source      TEXT NOT NULL CHECK (source = 'contact-form'),
    CHECK (
        length(CAST(id AS BLOB)) + length(CAST(name AS BLOB))
      + length(CAST(email AS BLOB)) + length(CAST(subject AS BLOB))
      + length(CAST(message AS BLOB)) + length(CAST(timestamp AS BLOB))
      + length(CAST(status AS BLOB)) + length(CAST(source AS BLOB))
      <= {MAX_ITEM_BYTES}
    )
);

CREATE INDEX IF NOT EXISTS \"{table}_created_idx\" ON \"{table}\"(created_at);
"
  )
}

/// Conditional insert: a row already holding the id makes this a no-op that
/// reports zero changes.
pub fn insert_sql(table: &str) -> String {
  format!(
    "INSERT INTO \"{table}\" (
       id, name, email, subject, message, timestamp, created_at, status, source
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
     ON CONFLICT (id) DO NOTHING"
  )
}

pub fn select_sql(table: &str) -> String {
  format!(
    "SELECT id, name, email, subject, message, timestamp, created_at, status, source
     FROM \"{table}\" WHERE id = ?1"
  )
}
