//! Bulk persistence and ordered edits of the planning tables.
//!
//! Each table is written in its own transaction. A failing table aborts
//! only its own batch; tables written before it stay committed.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row, Statement};
use tracing::{debug, info, warn};

use super::{Store, StoreError};
use crate::models::{
    respects_order, AssignmentSet, Employee, EmployeeShift, Milestone, Network, Operation,
    OperationAssignment, OperationDependency, OperationId, PlanningData, Project, Qualification,
    Resource, Shift,
};

fn operation_from_row(row: &Row<'_>) -> rusqlite::Result<Operation> {
    Ok(Operation {
        id: row.get(0)?,
        network_id: row.get(1)?,
        name: row.get(2)?,
        resource_id: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        capacity_demand: row.get(6)?,
    })
}

const OPERATION_COLUMNS: &str =
    "id, network_id, name, resource_id, start_date, end_date, time_capacity_demand";

impl Store {
    fn write_table<T>(
        &self,
        table: &str,
        sql: &str,
        rows: &[T],
        bind: impl Fn(&mut Statement<'_>, &T) -> rusqlite::Result<usize>,
    ) -> Result<usize, StoreError> {
        let tx = self.conn().unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(sql)?;
            for row in rows {
                bind(&mut stmt, row)?;
            }
        }
        tx.commit()?;
        debug!(table, rows = rows.len(), "table written");
        Ok(rows.len())
    }

    /// Inserts every record of `data`, parents before children.
    ///
    /// Ids are written as given. Returns the number of rows written.
    pub fn write_dataset(&self, data: &PlanningData) -> Result<usize, StoreError> {
        let mut total = 0;
        total += self.write_table(
            "resource",
            "INSERT INTO resource (id, name) VALUES (?1, ?2)",
            &data.resources,
            |stmt, r: &Resource| stmt.execute(params![r.id, r.name]),
        )?;
        total += self.write_table(
            "employee",
            "INSERT INTO employee (id, name) VALUES (?1, ?2)",
            &data.employees,
            |stmt, e: &Employee| stmt.execute(params![e.id, e.name]),
        )?;
        total += self.write_table(
            "shift",
            "INSERT INTO shift (id, name, daily_capacity, color_code) VALUES (?1, ?2, ?3, ?4)",
            &data.shifts,
            |stmt, s: &Shift| stmt.execute(params![s.id, s.name, s.daily_capacity, s.color_code]),
        )?;
        total += self.write_table(
            "project",
            "INSERT INTO project (id, name, color_code) VALUES (?1, ?2, ?3)",
            &data.projects,
            |stmt, p: &Project| stmt.execute(params![p.id, p.name, p.color_code]),
        )?;
        total += self.write_table(
            "network",
            "INSERT INTO network (id, project_id, parent_network_id, name) VALUES (?1, ?2, ?3, ?4)",
            &data.networks,
            |stmt, n: &Network| {
                stmt.execute(params![n.id, n.project_id, n.parent_network_id, n.name])
            },
        )?;
        total += self.write_table(
            "milestone",
            "INSERT INTO milestone (id, project_id, name, due_date) VALUES (?1, ?2, ?3, ?4)",
            &data.milestones,
            |stmt, m: &Milestone| stmt.execute(params![m.id, m.project_id, m.name, m.due_date]),
        )?;
        total += self.write_table(
            "operation",
            "INSERT INTO operation (id, network_id, name, resource_id, start_date, end_date, \
             time_capacity_demand) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            &data.operations,
            |stmt, o: &Operation| {
                stmt.execute(params![
                    o.id,
                    o.network_id,
                    o.name,
                    o.resource_id,
                    o.start_date,
                    o.end_date,
                    o.capacity_demand
                ])
            },
        )?;
        total += self.write_table(
            "operation_dependency",
            "INSERT INTO operation_dependency (operation_id, depends_on_operation_id) \
             VALUES (?1, ?2)",
            &data.dependencies,
            |stmt, d: &OperationDependency| {
                stmt.execute(params![d.operation_id, d.depends_on_operation_id])
            },
        )?;
        total += self.write_table(
            "employee_qualification",
            "INSERT INTO employee_qualification (employee_id, resource_id) VALUES (?1, ?2)",
            &data.qualifications,
            |stmt, q: &Qualification| stmt.execute(params![q.employee_id, q.resource_id]),
        )?;
        total += self.write_table(
            "employee_shift",
            "INSERT INTO employee_shift (employee_id, shift_id, date) VALUES (?1, ?2, ?3)",
            &data.employee_shifts,
            |stmt, es: &EmployeeShift| stmt.execute(params![es.employee_id, es.shift_id, es.date]),
        )?;
        total += self.write_table(
            "operation_assignment",
            "INSERT INTO operation_assignment (operation_id, employee_id, date, assigned_capacity) \
             VALUES (?1, ?2, ?3, ?4)",
            &data.assignments.assignments,
            |stmt, a: &OperationAssignment| {
                stmt.execute(params![a.operation_id, a.employee_id, a.date, a.hours])
            },
        )?;

        info!(rows = total, "dataset written");
        Ok(total)
    }

    /// Reads every table back into a dataset, each ordered by id.
    pub fn load_dataset(&self) -> Result<PlanningData, StoreError> {
        let conn = self.conn();
        let mut data = PlanningData::new();

        data.projects = conn
            .prepare("SELECT id, name, color_code FROM project ORDER BY id")?
            .query_map([], |row| {
                Ok(Project {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    color_code: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<_, _>>()?;

        data.networks = conn
            .prepare("SELECT id, project_id, parent_network_id, name FROM network ORDER BY id")?
            .query_map([], |row| {
                Ok(Network {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    parent_network_id: row.get(2)?,
                    name: row.get(3)?,
                })
            })?
            .collect::<Result<_, _>>()?;

        data.milestones = conn
            .prepare("SELECT id, project_id, name, due_date FROM milestone ORDER BY id")?
            .query_map([], |row| {
                Ok(Milestone {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    name: row.get(2)?,
                    due_date: row.get(3)?,
                })
            })?
            .collect::<Result<_, _>>()?;

        data.operations = conn
            .prepare(&format!("SELECT {OPERATION_COLUMNS} FROM operation ORDER BY id"))?
            .query_map([], operation_from_row)?
            .collect::<Result<_, _>>()?;

        data.dependencies = conn
            .prepare(
                "SELECT operation_id, depends_on_operation_id FROM operation_dependency \
                 ORDER BY operation_id, depends_on_operation_id",
            )?
            .query_map([], |row| Ok(OperationDependency::new(row.get(0)?, row.get(1)?)))?
            .collect::<Result<_, _>>()?;

        data.resources = conn
            .prepare("SELECT id, name FROM resource ORDER BY id")?
            .query_map([], |row| Ok(Resource::new(row.get(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<_, _>>()?;

        data.employees = conn
            .prepare("SELECT id, name FROM employee ORDER BY id")?
            .query_map([], |row| Ok(Employee::new(row.get(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<_, _>>()?;

        data.qualifications = conn
            .prepare(
                "SELECT employee_id, resource_id FROM employee_qualification \
                 ORDER BY employee_id, resource_id",
            )?
            .query_map([], |row| Ok(Qualification::new(row.get(0)?, row.get(1)?)))?
            .collect::<Result<_, _>>()?;

        data.shifts = conn
            .prepare("SELECT id, name, daily_capacity, color_code FROM shift ORDER BY id")?
            .query_map([], |row| {
                Ok(Shift {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    daily_capacity: row.get(2)?,
                    color_code: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<_, _>>()?;

        data.employee_shifts = conn
            .prepare("SELECT employee_id, shift_id, date FROM employee_shift ORDER BY id")?
            .query_map([], |row| {
                Ok(EmployeeShift::new(row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<Result<_, _>>()?;

        let assignments: Vec<OperationAssignment> = conn
            .prepare(
                "SELECT operation_id, employee_id, date, assigned_capacity \
                 FROM operation_assignment ORDER BY id",
            )?
            .query_map([], |row| {
                Ok(OperationAssignment::new(row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<Result<_, _>>()?;
        data.assignments = AssignmentSet::from(assignments);

        Ok(data)
    }

    fn fetch_operation(&self, id: OperationId) -> Result<Operation, StoreError> {
        self.conn()
            .query_row(
                &format!("SELECT {OPERATION_COLUMNS} FROM operation WHERE id = ?1"),
                params![id],
                operation_from_row,
            )
            .optional()?
            .ok_or(StoreError::UnknownOperation(id))
    }

    fn linked_operations(&self, sql: &str, id: OperationId) -> Result<Vec<OperationId>, StoreError> {
        let ids = self
            .conn()
            .prepare(sql)?
            .query_map(params![id], |row| row.get(0))?
            .collect::<Result<_, _>>()?;
        Ok(ids)
    }

    /// Whether `from` already depends on `target`, directly or through a
    /// chain of stored edges.
    fn depends_transitively(
        &self,
        from: OperationId,
        target: OperationId,
    ) -> Result<bool, StoreError> {
        let reached = self.conn().query_row(
            "WITH RECURSIVE upstream(id) AS ( \
                 SELECT depends_on_operation_id FROM operation_dependency WHERE operation_id = ?1 \
                 UNION \
                 SELECT d.depends_on_operation_id FROM operation_dependency d \
                 JOIN upstream u ON d.operation_id = u.id \
             ) \
             SELECT EXISTS (SELECT 1 FROM upstream WHERE id = ?2)",
            params![from, target],
            |row| row.get(0),
        )?;
        Ok(reached)
    }

    /// Adds a dependency edge: `operation_id` depends on `depends_on`.
    ///
    /// Rejected with [`StoreError::CyclicDependency`] for a self-edge or
    /// when `depends_on` already depends on `operation_id`, and with
    /// [`StoreError::DependencyOrder`] unless the predecessor ends strictly
    /// before the successor starts (undated ends pass the order check).
    pub fn add_dependency(
        &self,
        operation_id: OperationId,
        depends_on: OperationId,
    ) -> Result<(), StoreError> {
        let successor = self.fetch_operation(operation_id)?;
        let predecessor = self.fetch_operation(depends_on)?;
        if operation_id == depends_on || self.depends_transitively(depends_on, operation_id)? {
            warn!(
                predecessor = depends_on,
                successor = operation_id,
                "cyclic dependency rejected"
            );
            return Err(StoreError::CyclicDependency {
                operation: operation_id,
                depends_on,
            });
        }
        if !respects_order(&predecessor, &successor) {
            warn!(
                predecessor = depends_on,
                successor = operation_id,
                "dependency rejected"
            );
            return Err(StoreError::DependencyOrder {
                predecessor: depends_on,
                successor: operation_id,
            });
        }
        self.conn().execute(
            "INSERT INTO operation_dependency (operation_id, depends_on_operation_id) \
             VALUES (?1, ?2)",
            params![operation_id, depends_on],
        )?;
        Ok(())
    }

    /// Moves an operation's window.
    ///
    /// Rejected when the window is reversed or when any existing
    /// dependency, in either direction, would lose its temporal order.
    pub fn set_operation_window(
        &self,
        operation_id: OperationId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<(), StoreError> {
        if let (Some(s), Some(e)) = (start, end) {
            if e < s {
                return Err(StoreError::InvalidDate {
                    start: s.to_string(),
                    end: e.to_string(),
                });
            }
        }

        let mut moved = self.fetch_operation(operation_id)?;
        moved.start_date = start;
        moved.end_date = end;

        let predecessors = self.linked_operations(
            "SELECT depends_on_operation_id FROM operation_dependency WHERE operation_id = ?1",
            operation_id,
        )?;
        for pred_id in predecessors {
            let pred = self.fetch_operation(pred_id)?;
            if !respects_order(&pred, &moved) {
                warn!(predecessor = pred_id, successor = operation_id, "window change rejected");
                return Err(StoreError::DependencyOrder {
                    predecessor: pred_id,
                    successor: operation_id,
                });
            }
        }

        let successors = self.linked_operations(
            "SELECT operation_id FROM operation_dependency WHERE depends_on_operation_id = ?1",
            operation_id,
        )?;
        for succ_id in successors {
            let succ = self.fetch_operation(succ_id)?;
            if !respects_order(&moved, &succ) {
                warn!(predecessor = operation_id, successor = succ_id, "window change rejected");
                return Err(StoreError::DependencyOrder {
                    predecessor: operation_id,
                    successor: succ_id,
                });
            }
        }

        self.conn().execute(
            "UPDATE operation SET start_date = ?1, end_date = ?2 WHERE id = ?3",
            params![start, end, operation_id],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::generate;
    use crate::config::{GeneratorConfig, SeedConfig};
    use crate::seed::generate_dataset;
    use crate::validation::validate_dataset;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn sample() -> PlanningData {
        PlanningData {
            projects: vec![Project::new(1, "P1").with_color("#E57373")],
            networks: vec![Network::new(1, 1, "N1"), Network::new(2, 1, "N1.1").with_parent(1)],
            milestones: vec![Milestone::new(1, 1, "Endabnahme").with_due_date(d(31))],
            resources: vec![Resource::new(1, "CNC")],
            employees: vec![Employee::new(1, "Anna Weber")],
            qualifications: vec![Qualification::new(1, 1)],
            shifts: vec![Shift::new(1, "Früh", 8, "#B0BEC5"), Shift::new(2, "Abw", 0, "#CFD8DC")],
            operations: vec![
                Operation::new(1, 1, "Bohren", 1).with_window(d(6), d(7)).with_demand(8),
                Operation::new(2, 2, "Fräsen", 1).with_window(d(9), d(10)).with_demand(6),
                Operation::new(3, 2, "Prüfen", 1),
            ],
            dependencies: vec![OperationDependency::new(2, 1)],
            employee_shifts: vec![EmployeeShift::new(1, 1, d(6)), EmployeeShift::new(1, 2, d(7))],
            assignments: AssignmentSet::from(vec![OperationAssignment::new(1, 1, d(6), 8)]),
        }
    }

    #[test]
    fn test_write_then_load() {
        let store = Store::open_in_memory().unwrap();
        let data = sample();
        assert_eq!(store.write_dataset(&data).unwrap(), 16);

        let loaded = store.load_dataset().unwrap();
        assert_eq!(loaded.projects, data.projects);
        assert_eq!(loaded.networks, data.networks);
        assert_eq!(loaded.operations, data.operations);
        assert_eq!(loaded.dependencies, data.dependencies);
        assert_eq!(loaded.employee_shifts, data.employee_shifts);
        assert_eq!(loaded.assignments.assignments, data.assignments.assignments);
        assert_eq!(loaded.milestones[0].due_date, Some(d(31)));
    }

    #[test]
    fn test_dates_stored_as_iso_text() {
        let store = Store::open_in_memory().unwrap();
        store.write_dataset(&sample()).unwrap();
        let date: String = store
            .conn()
            .query_row("SELECT date FROM operation_assignment", [], |r| r.get(0))
            .unwrap();
        assert_eq!(date, "2025-01-06");
    }

    #[test]
    fn test_failed_table_keeps_earlier_tables() {
        let store = Store::open_in_memory().unwrap();
        let mut data = sample();
        // duplicate primary key in the operation table
        data.operations.push(data.operations[0].clone());
        assert!(store.write_dataset(&data).is_err());
        assert_eq!(store.count("network").unwrap(), 2);
        assert_eq!(store.count("operation").unwrap(), 0);
    }

    #[test]
    fn test_add_dependency_order() {
        let store = Store::open_in_memory().unwrap();
        store.write_dataset(&sample()).unwrap();

        // O2 (9..10) cannot precede O1 (6..7)
        let err = store.add_dependency(1, 2).unwrap_err();
        assert!(matches!(
            err,
            StoreError::DependencyOrder { predecessor: 2, successor: 1 }
        ));
        // undated operation imposes no order
        store.add_dependency(3, 2).unwrap();
        assert!(matches!(
            store.add_dependency(1, 99),
            Err(StoreError::UnknownOperation(99))
        ));
        assert_eq!(store.count("operation_dependency").unwrap(), 2);
    }

    #[test]
    fn test_add_dependency_rejects_cycles() {
        let store = Store::open_in_memory().unwrap();
        let mut data = sample();
        data.operations.push(Operation::new(4, 2, "Entgraten", 1));
        store.write_dataset(&data).unwrap();

        assert!(matches!(
            store.add_dependency(3, 3),
            Err(StoreError::CyclicDependency { operation: 3, depends_on: 3 })
        ));

        // two undated operations
        store.add_dependency(3, 4).unwrap();
        assert!(matches!(
            store.add_dependency(4, 3),
            Err(StoreError::CyclicDependency { operation: 4, depends_on: 3 })
        ));

        // 3 → 2 → 1 already stored, so 1 may not depend on 3
        store.add_dependency(3, 2).unwrap();
        assert!(matches!(
            store.add_dependency(1, 3),
            Err(StoreError::CyclicDependency { operation: 1, depends_on: 3 })
        ));

        assert_eq!(store.count("operation_dependency").unwrap(), 3);
        let loaded = store.load_dataset().unwrap();
        assert!(validate_dataset(&loaded).is_ok());
    }

    #[test]
    fn test_set_operation_window() {
        let store = Store::open_in_memory().unwrap();
        store.write_dataset(&sample()).unwrap();

        // moving O1 onto O2's start breaks 2 → 1
        assert!(matches!(
            store.set_operation_window(1, Some(d(8)), Some(d(9))),
            Err(StoreError::DependencyOrder { predecessor: 1, successor: 2 })
        ));
        // moving O2 before O1's end breaks it from the other side
        assert!(matches!(
            store.set_operation_window(2, Some(d(7)), Some(d(8))),
            Err(StoreError::DependencyOrder { predecessor: 1, successor: 2 })
        ));
        assert!(matches!(
            store.set_operation_window(2, Some(d(12)), Some(d(10))),
            Err(StoreError::InvalidDate { .. })
        ));

        store.set_operation_window(2, Some(d(8)), Some(d(14))).unwrap();
        let loaded = store.load_dataset().unwrap();
        let op = loaded.operation(2).unwrap();
        assert_eq!(op.start_date, Some(d(8)));
        assert_eq!(op.end_date, Some(d(14)));
    }

    #[test]
    fn test_generated_pass_round_trips() {
        let config = GeneratorConfig::default().with_seed(3).with_data(SeedConfig {
            projects: 3,
            employees: 6,
            ..SeedConfig::default()
        });
        let mut rng = config.rng();
        let mut data = generate_dataset(&config, &mut rng).unwrap();
        generate(&mut data, &config, &mut rng).unwrap();

        let store = Store::open_in_memory().unwrap();
        store.write_dataset(&data).unwrap();
        let loaded = store.load_dataset().unwrap();
        assert_eq!(loaded.employee_shifts.len(), data.employee_shifts.len());
        assert_eq!(loaded.assignments.total_hours(), data.assignments.total_hours());
        assert_eq!(loaded.dependencies.len(), data.dependencies.len());
    }
}
