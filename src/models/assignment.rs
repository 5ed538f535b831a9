//! Assignment (solution) model.
//!
//! An operation assignment records that an employee contributes a number of
//! hours to an operation on a specific date. Invariant violations found by
//! an audit are reported alongside as [`Violation`]s.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{EmployeeId, OperationId};

/// Hours an employee contributes to an operation on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationAssignment {
    /// Staffed operation.
    pub operation_id: OperationId,
    /// Contributing employee.
    pub employee_id: EmployeeId,
    /// Day of work.
    pub date: NaiveDate,
    /// Assigned hours.
    pub hours: u32,
}

impl OperationAssignment {
    /// Creates an assignment.
    pub fn new(
        operation_id: OperationId,
        employee_id: EmployeeId,
        date: NaiveDate,
        hours: u32,
    ) -> Self {
        Self {
            operation_id,
            employee_id,
            date,
            hours,
        }
    }
}

/// A broken ledger invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity ID (employee or operation).
    pub entity_id: i64,
    /// Day concerned, if the violation is day-scoped.
    pub date: Option<NaiveDate>,
    /// Human-readable description.
    pub message: String,
}

/// Classification of ledger invariant violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Employee assigned beyond their shift capacity on a day.
    CapacityExceeded,
    /// Operation assigned beyond its demand on a day.
    DemandExceeded,
    /// Employee assigned to an operation without qualification.
    Unqualified,
    /// Employee assigned beyond their annual budget.
    BudgetExceeded,
    /// Record dated on a Saturday or Sunday.
    WeekendDate,
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        violation_type: ViolationType,
        entity_id: i64,
        date: Option<NaiveDate>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            entity_id,
            date,
            message: message.into(),
        }
    }
}

/// A collection of assignments with the lookups callers need.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentSet {
    /// Assignment records in creation order.
    pub assignments: Vec<OperationAssignment>,
}

impl AssignmentSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    pub fn push(&mut self, assignment: OperationAssignment) {
        self.assignments.push(assignment);
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Records for a given operation.
    pub fn for_operation(&self, operation_id: OperationId) -> Vec<&OperationAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.operation_id == operation_id)
            .collect()
    }

    /// Records for a given employee.
    pub fn for_employee(&self, employee_id: EmployeeId) -> Vec<&OperationAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.employee_id == employee_id)
            .collect()
    }

    /// Total hours assigned to an operation.
    pub fn operation_hours(&self, operation_id: OperationId) -> u64 {
        self.for_operation(operation_id)
            .iter()
            .map(|a| a.hours as u64)
            .sum()
    }

    /// Total hours assigned to an employee.
    pub fn employee_hours(&self, employee_id: EmployeeId) -> u64 {
        self.for_employee(employee_id)
            .iter()
            .map(|a| a.hours as u64)
            .sum()
    }

    /// Hours per (employee, date).
    pub fn hours_by_employee_day(&self) -> HashMap<(EmployeeId, NaiveDate), u64> {
        let mut out: HashMap<(EmployeeId, NaiveDate), u64> = HashMap::new();
        for a in &self.assignments {
            *out.entry((a.employee_id, a.date)).or_insert(0) += a.hours as u64;
        }
        out
    }

    /// Hours per (operation, date).
    pub fn hours_by_operation_day(&self) -> HashMap<(OperationId, NaiveDate), u64> {
        let mut out: HashMap<(OperationId, NaiveDate), u64> = HashMap::new();
        for a in &self.assignments {
            *out.entry((a.operation_id, a.date)).or_insert(0) += a.hours as u64;
        }
        out
    }

    /// Total hours across all records.
    pub fn total_hours(&self) -> u64 {
        self.assignments.iter().map(|a| a.hours as u64).sum()
    }
}

impl From<Vec<OperationAssignment>> for AssignmentSet {
    fn from(assignments: Vec<OperationAssignment>) -> Self {
        Self { assignments }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn sample_set() -> AssignmentSet {
        let mut s = AssignmentSet::new();
        s.push(OperationAssignment::new(1, 10, d(6), 4));
        s.push(OperationAssignment::new(2, 10, d(6), 3));
        s.push(OperationAssignment::new(1, 11, d(7), 8));
        s
    }

    #[test]
    fn test_lookups() {
        let s = sample_set();
        assert_eq!(s.len(), 3);
        assert_eq!(s.for_operation(1).len(), 2);
        assert_eq!(s.for_employee(10).len(), 2);
        assert!(s.for_employee(99).is_empty());
    }

    #[test]
    fn test_hour_totals() {
        let s = sample_set();
        assert_eq!(s.operation_hours(1), 12);
        assert_eq!(s.employee_hours(10), 7);
        assert_eq!(s.total_hours(), 15);
    }

    #[test]
    fn test_daily_aggregates() {
        let s = sample_set();
        let by_emp = s.hours_by_employee_day();
        assert_eq!(by_emp[&(10, d(6))], 7);
        assert_eq!(by_emp[&(11, d(7))], 8);

        let by_op = s.hours_by_operation_day();
        assert_eq!(by_op[&(1, d(6))], 4);
        assert_eq!(by_op[&(1, d(7))], 8);
    }

    #[test]
    fn test_empty_set() {
        let s = AssignmentSet::new();
        assert!(s.is_empty());
        assert_eq!(s.total_hours(), 0);
    }
}
