//! Schema Store DDL.
//!
//! Dates are stored as `YYYY-MM-DD` text so lexical comparison matches
//! chronological order.

/// Tables in creation order. Dropping walks this list backwards.
pub(crate) const TABLES: &[&str] = &[
    "project",
    "network",
    "milestone",
    "resource",
    "operation",
    "operation_dependency",
    "employee",
    "shift",
    "employee_qualification",
    "operation_assignment",
    "employee_shift",
];

pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS project (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL,
  color_code TEXT
);

CREATE TABLE IF NOT EXISTS network (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  project_id INTEGER NOT NULL REFERENCES project(id),
  parent_network_id INTEGER REFERENCES network(id) DEFERRABLE INITIALLY DEFERRED,
  name TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_network_project ON network(project_id);

CREATE TABLE IF NOT EXISTS milestone (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  project_id INTEGER NOT NULL REFERENCES project(id),
  name TEXT NOT NULL,
  due_date TEXT
);

CREATE TABLE IF NOT EXISTS resource (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS operation (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  network_id INTEGER NOT NULL REFERENCES network(id),
  name TEXT NOT NULL,
  resource_id INTEGER NOT NULL REFERENCES resource(id),
  start_date TEXT,
  end_date TEXT,
  time_capacity_demand INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_operation_network ON operation(network_id);
CREATE INDEX IF NOT EXISTS idx_operation_resource ON operation(resource_id);

CREATE TABLE IF NOT EXISTS operation_dependency (
  operation_id INTEGER NOT NULL REFERENCES operation(id),
  depends_on_operation_id INTEGER NOT NULL REFERENCES operation(id),
  PRIMARY KEY (operation_id, depends_on_operation_id)
);

CREATE TABLE IF NOT EXISTS employee (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS shift (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL,
  daily_capacity INTEGER NOT NULL,
  color_code TEXT
);

CREATE TABLE IF NOT EXISTS employee_qualification (
  employee_id INTEGER NOT NULL REFERENCES employee(id),
  resource_id INTEGER NOT NULL REFERENCES resource(id),
  PRIMARY KEY (employee_id, resource_id)
);

CREATE TABLE IF NOT EXISTS operation_assignment (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  operation_id INTEGER NOT NULL REFERENCES operation(id),
  employee_id INTEGER NOT NULL REFERENCES employee(id),
  date TEXT NOT NULL,
  assigned_capacity INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_assignment_operation ON operation_assignment(operation_id, date);
CREATE INDEX IF NOT EXISTS idx_assignment_employee ON operation_assignment(employee_id, date);

CREATE TABLE IF NOT EXISTS employee_shift (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  employee_id INTEGER NOT NULL REFERENCES employee(id),
  shift_id INTEGER NOT NULL REFERENCES shift(id),
  date TEXT NOT NULL,
  UNIQUE (employee_id, date)
);
"#;
