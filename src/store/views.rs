//! Denormalized projections for the viewer collaborators.
//!
//! Field names follow what the viewers consume, hence the serde renames.

use chrono::NaiveDate;
use rusqlite::params_from_iter;
use rusqlite::types::Value as SqlValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Store, StoreError};
use crate::capacity::{fold_series, zero_series, CapacityPoint};
use crate::models::{
    format_date, DateRange, EmployeeId, MilestoneId, NetworkId, OperationId, ProjectId,
    ResourceId,
};

/// One assignment row joined with its employee, operation and project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentView {
    pub employee_id: String,
    pub employee_name: String,
    pub operation_id: String,
    pub operation_name: String,
    #[serde(rename = "operation_startDate")]
    pub operation_start_date: Option<NaiveDate>,
    #[serde(rename = "operation_endDate")]
    pub operation_end_date: Option<NaiveDate>,
    /// Display color of the owning project.
    #[serde(rename = "operation_colorCode")]
    pub operation_color_code: Option<String>,
    /// Assigned hours.
    pub duration: u32,
    pub date: NaiveDate,
    #[serde(rename = "operation_capacityDemand")]
    pub operation_capacity_demand: u32,
}

/// One shift calendar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftView {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub shift_name: String,
    pub date: NaiveDate,
    pub color_code: Option<String>,
    /// Shift daily capacity.
    pub duration: u32,
}

/// Gantt tree root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttProject {
    pub id: ProjectId,
    pub name: String,
    pub color_code: Option<String>,
    pub milestones: Vec<GanttMilestone>,
    pub networks: Vec<GanttNetwork>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttMilestone {
    pub id: MilestoneId,
    pub name: String,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttNetwork {
    pub id: NetworkId,
    pub name: String,
    pub operations: Vec<GanttOperation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttOperation {
    pub id: OperationId,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub time_capacity_demand: u32,
    pub resource_id: ResourceId,
    /// Employees with their summed hours on this operation.
    pub employees: Vec<GanttEmployee>,
    /// Predecessor operation ids.
    pub dependencies: Vec<OperationId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttEmployee {
    pub id: EmployeeId,
    pub name: String,
    pub assigned_capacity: u64,
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

fn id_args(ids: &[i64]) -> Vec<SqlValue> {
    ids.iter().map(|&id| SqlValue::Integer(id)).collect()
}

impl Store {
    /// Assignments of the given operations, ordered by employee then date.
    pub fn assignment_view(
        &self,
        operation_ids: &[OperationId],
    ) -> Result<Vec<AssignmentView>, StoreError> {
        if operation_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT oa.employee_id, e.name, oa.operation_id, o.name, o.start_date, o.end_date,
                    p.color_code, oa.assigned_capacity, oa.date, o.time_capacity_demand
             FROM operation_assignment oa
             JOIN employee e ON oa.employee_id = e.id
             JOIN operation o ON oa.operation_id = o.id
             JOIN network n ON o.network_id = n.id
             JOIN project p ON n.project_id = p.id
             WHERE oa.operation_id IN ({})
             ORDER BY oa.employee_id, oa.date, oa.id",
            placeholders(operation_ids.len())
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(id_args(operation_ids)), |row| {
                Ok(AssignmentView {
                    employee_id: row.get::<_, i64>(0)?.to_string(),
                    employee_name: row.get(1)?,
                    operation_id: row.get::<_, i64>(2)?.to_string(),
                    operation_name: row.get(3)?,
                    operation_start_date: row.get(4)?,
                    operation_end_date: row.get(5)?,
                    operation_color_code: row.get(6)?,
                    duration: row.get(7)?,
                    date: row.get(8)?,
                    operation_capacity_demand: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Shift calendar of the given employees over [start, end].
    pub fn shift_view(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        employee_ids: &[EmployeeId],
    ) -> Result<Vec<ShiftView>, StoreError> {
        if employee_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT es.employee_id, e.name, s.name, es.date, s.color_code, s.daily_capacity
             FROM employee_shift es
             JOIN shift s ON es.shift_id = s.id
             JOIN employee e ON es.employee_id = e.id
             WHERE es.employee_id IN ({})
               AND es.date >= ? AND es.date <= ?
             ORDER BY es.employee_id, es.date",
            placeholders(employee_ids.len())
        );
        let mut args = id_args(employee_ids);
        args.push(SqlValue::Text(format_date(start)));
        args.push(SqlValue::Text(format_date(end)));

        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(args), |row| {
                Ok(ShiftView {
                    employee_id: row.get(0)?,
                    employee_name: row.get(1)?,
                    shift_name: row.get(2)?,
                    date: row.get(3)?,
                    color_code: row.get(4)?,
                    duration: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Project → network → operation tree for the given projects.
    pub fn gantt_view(&self, project_ids: &[ProjectId]) -> Result<Vec<GanttProject>, StoreError> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn();
        let project_in = placeholders(project_ids.len());

        let mut projects: Vec<GanttProject> = conn
            .prepare(&format!(
                "SELECT id, name, color_code FROM project WHERE id IN ({project_in}) ORDER BY id"
            ))?
            .query_map(params_from_iter(id_args(project_ids)), |row| {
                Ok(GanttProject {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    color_code: row.get(2)?,
                    milestones: Vec::new(),
                    networks: Vec::new(),
                })
            })?
            .collect::<Result<_, _>>()?;

        let milestones: Vec<(ProjectId, GanttMilestone)> = conn
            .prepare(&format!(
                "SELECT project_id, id, name, due_date FROM milestone \
                 WHERE project_id IN ({project_in}) ORDER BY id"
            ))?
            .query_map(params_from_iter(id_args(project_ids)), |row| {
                Ok((
                    row.get(0)?,
                    GanttMilestone {
                        id: row.get(1)?,
                        name: row.get(2)?,
                        due_date: row.get(3)?,
                    },
                ))
            })?
            .collect::<Result<_, _>>()?;

        let networks: Vec<(ProjectId, GanttNetwork)> = conn
            .prepare(&format!(
                "SELECT project_id, id, name FROM network \
                 WHERE project_id IN ({project_in}) ORDER BY id"
            ))?
            .query_map(params_from_iter(id_args(project_ids)), |row| {
                Ok((
                    row.get(0)?,
                    GanttNetwork {
                        id: row.get(1)?,
                        name: row.get(2)?,
                        operations: Vec::new(),
                    },
                ))
            })?
            .collect::<Result<_, _>>()?;

        let network_ids: Vec<NetworkId> = networks.iter().map(|(_, n)| n.id).collect();
        let mut operations: Vec<(NetworkId, GanttOperation)> = Vec::new();
        if !network_ids.is_empty() {
            operations = conn
                .prepare(&format!(
                    "SELECT network_id, id, name, start_date, end_date, time_capacity_demand, \
                     resource_id FROM operation WHERE network_id IN ({}) ORDER BY id",
                    placeholders(network_ids.len())
                ))?
                .query_map(params_from_iter(id_args(&network_ids)), |row| {
                    Ok((
                        row.get(0)?,
                        GanttOperation {
                            id: row.get(1)?,
                            name: row.get(2)?,
                            start_date: row.get(3)?,
                            end_date: row.get(4)?,
                            time_capacity_demand: row.get(5)?,
                            resource_id: row.get(6)?,
                            employees: Vec::new(),
                            dependencies: Vec::new(),
                        },
                    ))
                })?
                .collect::<Result<_, _>>()?;
        }

        let operation_ids: Vec<OperationId> = operations.iter().map(|(_, o)| o.id).collect();
        let mut employees_by_op: HashMap<OperationId, Vec<GanttEmployee>> = HashMap::new();
        let mut deps_by_op: HashMap<OperationId, Vec<OperationId>> = HashMap::new();
        if !operation_ids.is_empty() {
            let op_in = placeholders(operation_ids.len());

            let staffed: Vec<(OperationId, GanttEmployee)> = conn
                .prepare(&format!(
                    "SELECT oa.operation_id, e.id, e.name, SUM(oa.assigned_capacity)
                     FROM operation_assignment oa
                     JOIN employee e ON oa.employee_id = e.id
                     WHERE oa.operation_id IN ({op_in})
                     GROUP BY oa.operation_id, e.id
                     ORDER BY oa.operation_id, e.id"
                ))?
                .query_map(params_from_iter(id_args(&operation_ids)), |row| {
                    Ok((
                        row.get(0)?,
                        GanttEmployee {
                            id: row.get(1)?,
                            name: row.get(2)?,
                            assigned_capacity: row.get::<_, i64>(3)?.max(0) as u64,
                        },
                    ))
                })?
                .collect::<Result<_, _>>()?;
            for (op_id, employee) in staffed {
                employees_by_op.entry(op_id).or_default().push(employee);
            }

            let edges: Vec<(OperationId, OperationId)> = conn
                .prepare(&format!(
                    "SELECT operation_id, depends_on_operation_id FROM operation_dependency \
                     WHERE operation_id IN ({op_in}) ORDER BY operation_id, depends_on_operation_id"
                ))?
                .query_map(params_from_iter(id_args(&operation_ids)), |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })?
                .collect::<Result<_, _>>()?;
            for (op_id, pred) in edges {
                deps_by_op.entry(op_id).or_default().push(pred);
            }
        }

        let mut ops_by_network: HashMap<NetworkId, Vec<GanttOperation>> = HashMap::new();
        for (network_id, mut op) in operations {
            op.employees = employees_by_op.remove(&op.id).unwrap_or_default();
            op.dependencies = deps_by_op.remove(&op.id).unwrap_or_default();
            ops_by_network.entry(network_id).or_default().push(op);
        }
        let mut networks_by_project: HashMap<ProjectId, Vec<GanttNetwork>> = HashMap::new();
        for (project_id, mut network) in networks {
            network.operations = ops_by_network.remove(&network.id).unwrap_or_default();
            networks_by_project.entry(project_id).or_default().push(network);
        }
        let mut milestones_by_project: HashMap<ProjectId, Vec<GanttMilestone>> = HashMap::new();
        for (project_id, milestone) in milestones {
            milestones_by_project.entry(project_id).or_default().push(milestone);
        }
        for project in &mut projects {
            project.networks = networks_by_project.remove(&project.id).unwrap_or_default();
            project.milestones = milestones_by_project.remove(&project.id).unwrap_or_default();
        }

        Ok(projects)
    }

    /// Daily capacity series of a resource over stored rows.
    ///
    /// Same semantics as [`crate::capacity::resource_capacity`]: every
    /// calendar day of `range`, zeros when nobody is qualified.
    pub fn resource_capacity(
        &self,
        resource_id: ResourceId,
        range: DateRange,
    ) -> Result<Vec<CapacityPoint>, StoreError> {
        let conn = self.conn();
        let qualified: Vec<EmployeeId> = conn
            .prepare("SELECT employee_id FROM employee_qualification WHERE resource_id = ?1")?
            .query_map([resource_id], |row| row.get(0))?
            .collect::<Result<_, _>>()?;
        if qualified.is_empty() {
            return Ok(zero_series(range));
        }

        let start = SqlValue::Text(format_date(range.start));
        let end = SqlValue::Text(format_date(range.end));

        let mut shift_args = id_args(&qualified);
        shift_args.push(start.clone());
        shift_args.push(end.clone());
        let capacity_rows: Vec<(NaiveDate, u64)> = conn
            .prepare(&format!(
                "SELECT es.date, s.daily_capacity
                 FROM employee_shift es
                 JOIN shift s ON es.shift_id = s.id
                 WHERE es.employee_id IN ({})
                   AND es.date >= ? AND es.date <= ?",
                placeholders(qualified.len())
            ))?
            .query_map(params_from_iter(shift_args), |row| {
                Ok((row.get(0)?, row.get::<_, i64>(1)?.max(0) as u64))
            })?
            .collect::<Result<_, _>>()?;

        let assigned_rows: Vec<(NaiveDate, u64)> = conn
            .prepare(
                "SELECT oa.date, SUM(oa.assigned_capacity)
                 FROM operation_assignment oa
                 JOIN operation o ON oa.operation_id = o.id
                 WHERE o.resource_id = ?1 AND oa.date >= ?2 AND oa.date <= ?3
                 GROUP BY oa.date",
            )?
            .query_map(
                params_from_iter([SqlValue::Integer(resource_id), start, end]),
                |row| Ok((row.get(0)?, row.get::<_, i64>(1)?.max(0) as u64)),
            )?
            .collect::<Result<_, _>>()?;

        Ok(fold_series(range, capacity_rows, assigned_rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AssignmentSet, Employee, EmployeeShift, Milestone, Network, Operation,
        OperationAssignment, OperationDependency, PlanningData, Project, Qualification, Resource,
        Shift,
    };
    use serde_json::json;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn store() -> Store {
        let data = PlanningData {
            projects: vec![
                Project::new(1, "Hydraulikpresse 1").with_color("#E57373"),
                Project::new(2, "Montagelinie 2").with_color("#64B5F6"),
            ],
            networks: vec![Network::new(1, 1, "Vormontage 1"), Network::new(2, 2, "Endmontage 1")],
            milestones: vec![Milestone::new(1, 1, "Endabnahme 1").with_due_date(d(31))],
            resources: vec![Resource::new(1, "CNC-Fräse"), Resource::new(2, "Prüfstand")],
            employees: vec![Employee::new(1, "Anna Weber"), Employee::new(2, "Tim Braun")],
            qualifications: vec![Qualification::new(1, 1), Qualification::new(2, 1)],
            shifts: vec![
                Shift::new(1, "Frühschicht", 8, "#B0BEC5"),
                Shift::new(4, "Abwesend", 0, "#CFD8DC"),
            ],
            operations: vec![
                Operation::new(1, 1, "Bohren 1", 1).with_window(d(6), d(7)).with_demand(10),
                Operation::new(2, 1, "Fräsen 2", 1).with_window(d(8), d(9)).with_demand(6),
                Operation::new(3, 2, "Prüfen 1", 2).with_window(d(6), d(6)).with_demand(4),
            ],
            dependencies: vec![OperationDependency::new(2, 1)],
            employee_shifts: vec![
                EmployeeShift::new(1, 1, d(6)),
                EmployeeShift::new(1, 1, d(7)),
                EmployeeShift::new(2, 1, d(6)),
                EmployeeShift::new(2, 4, d(7)),
            ],
            assignments: AssignmentSet::from(vec![
                OperationAssignment::new(1, 2, d(6), 2),
                OperationAssignment::new(1, 1, d(7), 8),
                OperationAssignment::new(1, 1, d(6), 4),
                OperationAssignment::new(3, 1, d(6), 3),
            ]),
        };
        let store = Store::open_in_memory().unwrap();
        store.write_dataset(&data).unwrap();
        store
    }

    #[test]
    fn test_assignment_view_order_and_fields() {
        let rows = store().assignment_view(&[1]).unwrap();
        let keys: Vec<_> = rows.iter().map(|r| (r.employee_id.as_str(), r.date)).collect();
        assert_eq!(keys, vec![("1", d(6)), ("1", d(7)), ("2", d(6))]);

        let first = &rows[0];
        assert_eq!(first.operation_name, "Bohren 1");
        assert_eq!(first.operation_color_code.as_deref(), Some("#E57373"));
        assert_eq!(first.duration, 4);
        assert_eq!(first.operation_capacity_demand, 10);

        let json = serde_json::to_value(first).unwrap();
        assert_eq!(json["employeeId"], "1");
        assert_eq!(json["operation_startDate"], "2025-01-06");
        assert_eq!(json["operation_capacityDemand"], 10);
    }

    #[test]
    fn test_assignment_view_empty_input() {
        assert!(store().assignment_view(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_shift_view() {
        let rows = store().shift_view(d(7), d(31), &[2, 1]).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].employee_id, 1);
        assert_eq!(rows[1].shift_name, "Abwesend");
        assert_eq!(rows[1].duration, 0);
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(
            json,
            json!({
                "employeeId": 1,
                "employeeName": "Anna Weber",
                "shiftName": "Frühschicht",
                "date": "2025-01-07",
                "colorCode": "#B0BEC5",
                "duration": 8
            })
        );
    }

    #[test]
    fn test_gantt_view_tree() {
        let projects = store().gantt_view(&[1]).unwrap();
        assert_eq!(projects.len(), 1);
        let p = &projects[0];
        assert_eq!(p.color_code.as_deref(), Some("#E57373"));
        assert_eq!(p.milestones.len(), 1);
        assert_eq!(p.networks.len(), 1);

        let ops = &p.networks[0].operations;
        assert_eq!(ops.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(ops[0].employees.len(), 2);
        // 4h + 8h summed for Anna on Bohren
        assert_eq!(ops[0].employees[0].assigned_capacity, 12);
        assert_eq!(ops[1].dependencies, vec![1]);
        assert!(ops[1].employees.is_empty());

        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json["networks"][0]["operations"][0]["timeCapacityDemand"], 10);
        assert_eq!(json["milestones"][0]["dueDate"], "2025-01-31");
    }

    #[test]
    fn test_gantt_view_unknown_project() {
        assert!(store().gantt_view(&[42]).unwrap().is_empty());
    }

    #[test]
    fn test_resource_capacity_matches_in_memory() {
        let store = store();
        let range = DateRange::new(d(5), d(8));
        let stored = store.resource_capacity(1, range).unwrap();
        let data = store.load_dataset().unwrap();
        assert_eq!(stored, crate::capacity::resource_capacity(&data, 1, range));

        assert_eq!(stored.len(), 4);
        assert_eq!(stored[1], CapacityPoint { date: d(6), capacity: 16, assigned: 6 });
        assert_eq!(stored[2], CapacityPoint { date: d(7), capacity: 8, assigned: 8 });
    }

    #[test]
    fn test_resource_capacity_without_qualified_employees() {
        // resource 2 has an assignment but nobody qualified
        let series = store().resource_capacity(2, DateRange::new(d(6), d(12))).unwrap();
        assert_eq!(series.len(), 7);
        assert!(series.iter().all(|p| p.capacity == 0 && p.assigned == 0));
    }
}
