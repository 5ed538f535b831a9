//! Allocation quality metrics (KPIs).
//!
//! Computes workforce and coverage indicators from a populated dataset.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total assigned hours | Sum of all assignment hours |
//! | Total assignable hours | Sum of annual budgets |
//! | Utilization (per employee) | assigned / horizon shift hours |
//! | Avg utilization | Mean over employees with shift hours |
//! | Fully covered | assigned ≥ demand |
//! | Partially covered | 0 < assigned < demand |
//! | Uncovered | no hours assigned |
//! | Unschedulable | window has no working day in the horizon |

use std::collections::HashMap;

use super::ledger::assignable_hours;
use crate::models::{EmployeeId, Horizon, PlanningData};

/// Allocation performance indicators.
#[derive(Debug, Clone)]
pub struct AllocationKpi {
    /// Hours assigned across all operations.
    pub total_assigned_hours: u64,
    /// Sum of every employee's annual budget.
    pub total_assignable_hours: u64,
    /// Per-employee utilization (0.0..=1.0 of shift hours).
    pub utilization_by_employee: HashMap<EmployeeId, f64>,
    /// Mean utilization over employees with shift hours.
    pub avg_utilization: f64,
    /// Operations whose assigned hours reach their demand.
    pub operations_fully_covered: usize,
    /// Operations with some but not all demand assigned.
    pub operations_partially_covered: usize,
    /// Schedulable operations with no assignment.
    pub operations_uncovered: usize,
    /// Operations without an active working day.
    pub operations_unschedulable: usize,
}

impl AllocationKpi {
    /// Computes KPIs from the dataset's shifts and assignments.
    pub fn calculate(data: &PlanningData, horizon: &Horizon, utilization_cap: f64) -> Self {
        let mut shift_hours: HashMap<EmployeeId, u64> = HashMap::new();
        for ((employee_id, date), capacity) in data.shift_capacity_map() {
            if horizon.is_working_day(date) {
                *shift_hours.entry(employee_id).or_insert(0) += capacity as u64;
            }
        }

        let total_assignable_hours = data
            .employees
            .iter()
            .map(|e| {
                let annual = shift_hours.get(&e.id).copied().unwrap_or(0);
                assignable_hours(annual.min(u32::MAX as u64) as u32, utilization_cap) as u64
            })
            .sum();

        let utilization_by_employee: HashMap<EmployeeId, f64> = shift_hours
            .iter()
            .filter(|(_, hours)| **hours > 0)
            .map(|(&id, &hours)| {
                let assigned = data.assignments.employee_hours(id);
                (id, assigned as f64 / hours as f64)
            })
            .collect();

        let avg_utilization = if utilization_by_employee.is_empty() {
            0.0
        } else {
            utilization_by_employee.values().sum::<f64>() / utilization_by_employee.len() as f64
        };

        let mut fully = 0;
        let mut partially = 0;
        let mut uncovered = 0;
        let mut unschedulable = 0;
        for op in &data.operations {
            if op.active_days(horizon).is_empty() {
                unschedulable += 1;
                continue;
            }
            let assigned = data.assignments.operation_hours(op.id);
            if assigned == 0 {
                uncovered += 1;
            } else if assigned >= op.capacity_demand as u64 {
                fully += 1;
            } else {
                partially += 1;
            }
        }

        Self {
            total_assigned_hours: data.assignments.total_hours(),
            total_assignable_hours,
            utilization_by_employee,
            avg_utilization,
            operations_fully_covered: fully,
            operations_partially_covered: partially,
            operations_uncovered: uncovered,
            operations_unschedulable: unschedulable,
        }
    }

    /// Fraction of schedulable operations with any assignment.
    pub fn coverage_rate(&self) -> f64 {
        let schedulable = self.operations_fully_covered
            + self.operations_partially_covered
            + self.operations_uncovered;
        if schedulable == 0 {
            1.0
        } else {
            (self.operations_fully_covered + self.operations_partially_covered) as f64
                / schedulable as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, EmployeeShift, Operation, OperationAssignment, Shift};
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn sample() -> PlanningData {
        let horizon = Horizon::new(d(6), d(10));
        let mut data = PlanningData {
            employees: vec![Employee::new(1, "E1"), Employee::new(2, "E2")],
            shifts: vec![Shift::new(1, "Früh", 8, "#a")],
            operations: vec![
                Operation::new(1, 1, "voll", 1).with_window(d(6), d(6)).with_demand(8),
                Operation::new(2, 1, "halb", 1).with_window(d(7), d(7)).with_demand(8),
                Operation::new(3, 1, "leer", 1).with_window(d(8), d(8)).with_demand(8),
                Operation::new(4, 1, "WE", 1).with_window(d(11), d(12)).with_demand(8),
            ],
            ..Default::default()
        };
        for date in horizon.working_days() {
            data.employee_shifts.push(EmployeeShift::new(1, 1, date));
        }
        data.assignments.push(OperationAssignment::new(1, 1, d(6), 8));
        data.assignments.push(OperationAssignment::new(2, 1, d(7), 4));
        data
    }

    #[test]
    fn test_kpi_coverage() {
        let kpi = AllocationKpi::calculate(&sample(), &Horizon::new(d(6), d(10)), 0.8);
        assert_eq!(kpi.operations_fully_covered, 1);
        assert_eq!(kpi.operations_partially_covered, 1);
        assert_eq!(kpi.operations_uncovered, 1);
        assert_eq!(kpi.operations_unschedulable, 1);
        assert!((kpi.coverage_rate() - 2.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_hours_and_utilization() {
        let kpi = AllocationKpi::calculate(&sample(), &Horizon::new(d(6), d(10)), 0.8);
        assert_eq!(kpi.total_assigned_hours, 12);
        assert_eq!(kpi.total_assignable_hours, 32); // floor(40 × 0.8), E2 has no shifts
        // E1: 12 / 40
        assert!((kpi.utilization_by_employee[&1] - 0.3).abs() < 1e-10);
        assert!(!kpi.utilization_by_employee.contains_key(&2));
        assert!((kpi.avg_utilization - 0.3).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = AllocationKpi::calculate(&PlanningData::new(), &Horizon::new(d(6), d(10)), 0.8);
        assert_eq!(kpi.total_assigned_hours, 0);
        assert!((kpi.avg_utilization - 0.0).abs() < 1e-10);
        assert!((kpi.coverage_rate() - 1.0).abs() < 1e-10);
    }
}
