//! Read-only query surface.
//!
//! Accepts arbitrary `SELECT` statements and returns rows as JSON objects
//! keyed by column name. Anything else is refused before execution, and
//! only the first statement of the text is ever prepared.

use rusqlite::types::ValueRef;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

use super::Store;

const READ_ONLY_MESSAGE: &str = "Only SELECT queries are allowed for security reasons.";

/// Result of a query-surface call.
///
/// `result` holds an array of row objects when `valid`, otherwise the
/// rejection or error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// Statement as submitted.
    pub query: String,
    /// Rows or message.
    pub result: Value,
    /// Whether the statement ran.
    pub valid: bool,
}

impl QueryOutcome {
    fn rejected(query: &str, message: impl Into<String>) -> Self {
        Self {
            query: query.to_string(),
            result: Value::String(message.into()),
            valid: false,
        }
    }

    /// Rows of a valid outcome; empty otherwise.
    pub fn rows(&self) -> &[Value] {
        match &self.result {
            Value::Array(rows) if self.valid => rows,
            _ => &[],
        }
    }
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Array(b.iter().map(|byte| Value::from(*byte)).collect()),
    }
}

fn is_select(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("select"))
}

impl Store {
    /// Runs a read-only statement.
    ///
    /// Never fails: rejections and engine errors come back as
    /// `valid = false` with the message in `result`.
    pub fn query(&self, sql: &str) -> QueryOutcome {
        if !is_select(sql) {
            warn!(query = sql, "non-select query rejected");
            return QueryOutcome::rejected(sql, READ_ONLY_MESSAGE);
        }

        match self.run_select(sql) {
            Ok(rows) => {
                debug!(rows = rows.len(), "query executed");
                QueryOutcome {
                    query: sql.to_string(),
                    result: Value::Array(rows),
                    valid: true,
                }
            }
            Err(e) => {
                warn!(query = sql, error = %e, "query failed");
                QueryOutcome::rejected(sql, format!("Error executing SQL query: {e}"))
            }
        }
    }

    fn run_select(&self, sql: &str) -> rusqlite::Result<Vec<Value>> {
        let mut stmt = self.conn().prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut object = Map::with_capacity(columns.len());
            for (i, name) in columns.iter().enumerate() {
                object.insert(name.clone(), json_value(row.get_ref(i)?));
            }
            out.push(Value::Object(object));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store
            .conn()
            .execute_batch(
                "INSERT INTO resource (name) VALUES ('CNC'), ('Roboter');
                 INSERT INTO shift (name, daily_capacity, color_code) VALUES ('Früh', 8, NULL);",
            )
            .unwrap();
        store
    }

    #[test]
    fn test_select_returns_rows() {
        let outcome = store().query("SELECT id, name FROM resource ORDER BY id");
        assert!(outcome.valid);
        assert_eq!(
            outcome.result,
            json!([{"id": 1, "name": "CNC"}, {"id": 2, "name": "Roboter"}])
        );
        assert_eq!(outcome.rows().len(), 2);
    }

    #[test]
    fn test_select_case_and_whitespace() {
        let outcome = store().query("  sElEcT name, color_code, 0.5 AS ratio FROM shift");
        assert!(outcome.valid);
        assert_eq!(outcome.rows()[0]["color_code"], Value::Null);
        assert_eq!(outcome.rows()[0]["ratio"], json!(0.5));
    }

    #[test]
    fn test_non_select_rejected() {
        let store = store();
        let outcome = store.query("DELETE FROM resource");
        assert!(!outcome.valid);
        assert_eq!(outcome.result, json!(READ_ONLY_MESSAGE));
        assert_eq!(outcome.query, "DELETE FROM resource");
        assert_eq!(store.count("resource").unwrap(), 2);
    }

    #[test]
    fn test_trailing_statement_never_runs() {
        let store = store();
        let outcome = store.query("SELECT id FROM resource; DELETE FROM resource");
        assert!(outcome.rows().len() <= 2);
        assert_eq!(store.count("resource").unwrap(), 2);
    }

    #[test]
    fn test_engine_error_reported() {
        let outcome = store().query("SELECT * FROM nowhere");
        assert!(!outcome.valid);
        let message = outcome.result.as_str().unwrap();
        assert!(message.starts_with("Error executing SQL query:"), "{message}");
        assert!(outcome.rows().is_empty());
    }

    #[test]
    fn test_is_select() {
        assert!(is_select("select 1"));
        assert!(is_select("\n\tSELECT 1"));
        assert!(!is_select("sel"));
        assert!(!is_select("update x set y = 1"));
        assert!(!is_select(""));
    }
}
