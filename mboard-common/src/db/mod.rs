//! SQLite store
//!
//! One module per table group. Every write validates its input first, so a
//! rejected request never touches the database.

pub mod boards;
pub mod init;
pub mod lists;
pub mod listen_later;
pub mod profiles;
pub mod ratings;
pub mod reviews;

pub use init::{init_database, init_memory_database};

use sqlx::{Sqlite, SqlitePool, Transaction};

/// Begin a transaction that takes the write lock up front
///
/// Read-then-write transactions must use this. A deferred one fails with
/// `SQLITE_BUSY_SNAPSHOT` if another connection commits between its read and
/// its write; `BEGIN IMMEDIATE` waits up to the busy timeout instead.
pub(crate) async fn begin_write(
    pool: &SqlitePool,
) -> crate::Result<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}
