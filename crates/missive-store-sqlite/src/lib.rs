//! SQLite backend for Missive submissions.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The conditional write maps onto a
//! single `INSERT ... ON CONFLICT DO NOTHING` statement.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use schema::DEFAULT_TABLE;
pub use store::SqliteStore;
