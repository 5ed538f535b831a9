//! Post-generation shift edits.
//!
//! The only supported mutations of the shift side of the ledger. Upsert is
//! a delete followed by an insert: two statements, last writer wins.

use chrono::NaiveDate;
use rusqlite::params;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::Store;
use crate::models::{EmployeeId, ShiftId};

/// Result of a shift edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditOutcome {
    /// Whether the edit was applied.
    pub success: bool,
    /// Status or error message.
    pub message: String,
}

impl EditOutcome {
    fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }

    fn failed(error: rusqlite::Error) -> Self {
        warn!(error = %error, "shift edit failed");
        Self {
            success: false,
            message: format!("Error: {error}"),
        }
    }
}

impl Store {
    /// Sets the shift of `employee_id` on `date`, replacing any existing one.
    pub fn upsert_employee_shift(
        &self,
        employee_id: EmployeeId,
        shift_id: ShiftId,
        date: NaiveDate,
    ) -> EditOutcome {
        let result = self
            .conn()
            .execute(
                "DELETE FROM employee_shift WHERE employee_id = ?1 AND date = ?2",
                params![employee_id, date],
            )
            .and_then(|_| {
                self.conn().execute(
                    "INSERT INTO employee_shift (employee_id, shift_id, date) VALUES (?1, ?2, ?3)",
                    params![employee_id, shift_id, date],
                )
            });
        match result {
            Ok(_) => {
                info!(employee_id, shift_id, %date, "shift upserted");
                EditOutcome::ok("Upsert successful.")
            }
            Err(e) => EditOutcome::failed(e),
        }
    }

    /// Removes the shift of `employee_id` on `date`.
    ///
    /// Succeeds even when no record existed.
    pub fn delete_employee_shift(&self, employee_id: EmployeeId, date: NaiveDate) -> EditOutcome {
        match self.conn().execute(
            "DELETE FROM employee_shift WHERE employee_id = ?1 AND date = ?2",
            params![employee_id, date],
        ) {
            Ok(removed) => {
                info!(employee_id, %date, removed, "shift deleted");
                EditOutcome::ok("Delete successful.")
            }
            Err(e) => EditOutcome::failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store
            .conn()
            .execute_batch(
                "INSERT INTO employee (id, name) VALUES (1, 'Lea Koch');
                 INSERT INTO shift (id, name, daily_capacity) VALUES (1, 'Früh', 8), (4, 'Abwesend', 0);",
            )
            .unwrap();
        store
    }

    fn shift_on(store: &Store, date: NaiveDate) -> Option<i64> {
        store
            .conn()
            .query_row(
                "SELECT shift_id FROM employee_shift WHERE employee_id = 1 AND date = ?1",
                params![date],
                |r| r.get(0),
            )
            .ok()
    }

    #[test]
    fn test_upsert_inserts_then_replaces() {
        let store = store();
        let outcome = store.upsert_employee_shift(1, 1, d(6));
        assert_eq!(outcome, EditOutcome::ok("Upsert successful."));
        assert_eq!(shift_on(&store, d(6)), Some(1));

        assert!(store.upsert_employee_shift(1, 4, d(6)).success);
        assert_eq!(shift_on(&store, d(6)), Some(4));
        assert_eq!(store.count("employee_shift").unwrap(), 1);
    }

    #[test]
    fn test_upsert_unknown_shift_fails() {
        let store = store();
        store.upsert_employee_shift(1, 1, d(6));
        let outcome = store.upsert_employee_shift(1, 99, d(6));
        assert!(!outcome.success);
        assert!(outcome.message.starts_with("Error: "), "{}", outcome.message);
        // the delete already ran
        assert_eq!(shift_on(&store, d(6)), None);
    }

    #[test]
    fn test_delete() {
        let store = store();
        store.upsert_employee_shift(1, 1, d(7));
        assert_eq!(
            store.delete_employee_shift(1, d(7)),
            EditOutcome::ok("Delete successful.")
        );
        assert_eq!(shift_on(&store, d(7)), None);
        // idempotent
        assert!(store.delete_employee_shift(1, d(7)).success);
    }
}
