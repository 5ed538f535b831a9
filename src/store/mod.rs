//! SQLite-backed Schema Store.
//!
//! The store is the sole persisted state: every model maps 1:1 to a table
//! row. Beyond bulk load/save it exposes the collaborator surfaces:
//!
//! - **Query surface** ([`Store::query`]): read-only SQL returning JSON rows.
//! - **Shift edits** ([`Store::upsert_employee_shift`],
//!   [`Store::delete_employee_shift`]).
//! - **Viewer projections** ([`Store::assignment_view`],
//!   [`Store::shift_view`], [`Store::gantt_view`],
//!   [`Store::resource_capacity`]).
//!
//! Collaborator surfaces never return `Err`; failures are reported inside
//! their outcome payloads. Bulk writes and temporal-order enforcement
//! return [`StoreError`].
//!
//! # Concurrency
//! A `Store` owns one connection and is meant for a single writer. Viewer
//! reads are side-effect free but see no isolation beyond SQLite's own.

mod edit;
mod query;
mod schema;
mod views;
mod write;

pub use edit::EditOutcome;
pub use query::QueryOutcome;
pub use views::{
    AssignmentView, GanttEmployee, GanttMilestone, GanttNetwork, GanttOperation, GanttProject,
    ShiftView,
};

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::OperationId;

/// Store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage engine error.
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A dependency or window change would put a predecessor's end on or
    /// after its successor's start.
    #[error("operation {predecessor} must end before operation {successor} starts")]
    DependencyOrder {
        /// Operation that must finish first.
        predecessor: OperationId,
        /// Operation that depends on it.
        successor: OperationId,
    },
    /// The edge would close a dependency cycle.
    #[error("operation {operation} already precedes operation {depends_on}")]
    CyclicDependency {
        /// Successor of the rejected edge.
        operation: OperationId,
        /// Predecessor of the rejected edge.
        depends_on: OperationId,
    },
    /// Referenced operation does not exist.
    #[error("unknown operation {0}")]
    UnknownOperation(OperationId),
    /// A date window ends before it starts.
    #[error("invalid date window {start}..{end}")]
    InvalidDate {
        /// Requested first day.
        start: String,
        /// Requested last day.
        end: String,
    },
}

/// Handle to a Schema Store database.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens (or creates) a database file and ensures the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(path = %path.as_ref().display(), journal_mode = %mode, "store opened");
        Self::init(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(schema::SCHEMA)?;
        Ok(Self { conn })
    }

    /// Drops and recreates every table.
    pub fn reset(&self) -> Result<(), StoreError> {
        for table in schema::TABLES.iter().rev() {
            self.conn
                .execute_batch(&format!("DROP TABLE IF EXISTS {table};"))?;
        }
        self.conn.execute_batch(schema::SCHEMA)?;
        info!(tables = schema::TABLES.len(), "store reset");
        Ok(())
    }

    /// Row count of a table.
    pub fn count(&self, table: &str) -> Result<u64, StoreError> {
        if !schema::TABLES.contains(&table) {
            return Err(StoreError::Sqlite(rusqlite::Error::InvalidParameterName(
                table.to_string(),
            )));
        }
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(n.max(0) as u64)
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}
