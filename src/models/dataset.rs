//! The full planning dataset.
//!
//! Mirrors the Schema Store table by table so the allocator, the audit and
//! the store exchange the same records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{
    AssignmentSet, Employee, EmployeeId, EmployeeShift, Milestone, Network, Operation,
    OperationDependency, OperationId, Project, Qualification, Resource, ResourceId, Shift,
    ShiftId,
};

/// Every entity of a planning scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanningData {
    pub projects: Vec<Project>,
    pub networks: Vec<Network>,
    pub milestones: Vec<Milestone>,
    pub operations: Vec<Operation>,
    pub dependencies: Vec<OperationDependency>,
    pub resources: Vec<Resource>,
    pub employees: Vec<Employee>,
    pub qualifications: Vec<Qualification>,
    pub shifts: Vec<Shift>,
    pub employee_shifts: Vec<EmployeeShift>,
    pub assignments: AssignmentSet,
}

impl PlanningData {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an operation.
    pub fn operation(&self, id: OperationId) -> Option<&Operation> {
        self.operations.iter().find(|o| o.id == id)
    }

    /// Employees sorted by id.
    pub fn employees_by_id(&self) -> Vec<&Employee> {
        let mut employees: Vec<&Employee> = self.employees.iter().collect();
        employees.sort_by_key(|e| e.id);
        employees
    }

    /// Operations sorted by id.
    pub fn operations_by_id(&self) -> Vec<&Operation> {
        let mut ops: Vec<&Operation> = self.operations.iter().collect();
        ops.sort_by_key(|o| o.id);
        ops
    }

    /// Qualification lookup as a set of (employee, resource).
    pub fn qualification_set(&self) -> HashSet<(EmployeeId, ResourceId)> {
        self.qualifications
            .iter()
            .map(|q| (q.employee_id, q.resource_id))
            .collect()
    }

    /// Whether the employee holds a qualification for the resource.
    pub fn is_qualified(&self, employee_id: EmployeeId, resource_id: ResourceId) -> bool {
        self.qualifications
            .iter()
            .any(|q| q.employee_id == employee_id && q.resource_id == resource_id)
    }

    /// Employees qualified for a resource, ascending by id, deduplicated.
    pub fn qualified_employees(&self, resource_id: ResourceId) -> Vec<EmployeeId> {
        let mut ids: Vec<EmployeeId> = self
            .qualifications
            .iter()
            .filter(|q| q.resource_id == resource_id)
            .map(|q| q.employee_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Daily capacity per (employee, date) from the shift records.
    ///
    /// Records pointing at unknown shifts count as zero capacity.
    pub fn shift_capacity_map(&self) -> HashMap<(EmployeeId, NaiveDate), u32> {
        let capacity_by_shift: HashMap<ShiftId, u32> = self
            .shifts
            .iter()
            .map(|s| (s.id, s.daily_capacity))
            .collect();

        self.employee_shifts
            .iter()
            .map(|es| {
                let cap = capacity_by_shift.get(&es.shift_id).copied().unwrap_or(0);
                ((es.employee_id, es.date), cap)
            })
            .collect()
    }

    /// Predecessor ids per successor operation.
    pub fn dependencies_by_operation(&self) -> HashMap<OperationId, Vec<OperationId>> {
        let mut out: HashMap<OperationId, Vec<OperationId>> = HashMap::new();
        for dep in &self.dependencies {
            out.entry(dep.operation_id)
                .or_default()
                .push(dep.depends_on_operation_id);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn sample() -> PlanningData {
        PlanningData {
            resources: vec![Resource::new(1, "CNC"), Resource::new(2, "Roboter")],
            employees: vec![Employee::new(3, "C"), Employee::new(1, "A"), Employee::new(2, "B")],
            qualifications: vec![
                Qualification::new(3, 1),
                Qualification::new(1, 1),
                Qualification::new(1, 1),
                Qualification::new(2, 2),
            ],
            shifts: vec![Shift::new(1, "Früh", 8, "#fff"), Shift::new(2, "Abw", 0, "#eee")],
            employee_shifts: vec![
                EmployeeShift::new(1, 1, d(6)),
                EmployeeShift::new(2, 2, d(6)),
                EmployeeShift::new(3, 99, d(6)),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_qualified_employees_sorted_unique() {
        let data = sample();
        assert_eq!(data.qualified_employees(1), vec![1, 3]);
        assert_eq!(data.qualified_employees(2), vec![2]);
        assert!(data.qualified_employees(7).is_empty());
        assert!(data.is_qualified(3, 1));
        assert!(!data.is_qualified(3, 2));
    }

    #[test]
    fn test_shift_capacity_map() {
        let data = sample();
        let caps = data.shift_capacity_map();
        assert_eq!(caps[&(1, d(6))], 8);
        assert_eq!(caps[&(2, d(6))], 0);
        assert_eq!(caps[&(3, d(6))], 0); // unknown shift
        assert!(!caps.contains_key(&(1, d(7))));
    }

    #[test]
    fn test_employees_by_id() {
        let data = sample();
        let ids: Vec<_> = data.employees_by_id().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
