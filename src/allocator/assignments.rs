//! Capacity-constrained assignment allocator.
//!
//! # Algorithm (employee-budget-first, default)
//!
//! 1. Walk employees in ascending id order.
//! 2. For each employee, collect every (operation, working day) slot where
//!    they are qualified for the operation's resource and the day lies in
//!    the operation's window.
//! 3. Shuffle the slots uniformly (fresh shuffle per employee).
//! 4. Greedily book `min(operation-day demand, employee-day capacity,
//!    annual budget)` hours per slot; skip zero amounts.
//! 5. Stop early once the employee's annual budget is exhausted.
//!
//! Ledger state is shared across employees, so lower ids win contended
//! slots.
//!
//! # Algorithm (operation-first)
//!
//! 1. Walk operations in ascending id order, attempting each with
//!    probability `operation_coverage`.
//! 2. Hand the whole window to the first qualified employee (ascending id)
//!    who has at least the full demand free on every active working day
//!    and enough annual budget for all of them.
//!
//! # Complexity
//! Employee-first: O(E * S log S) for S slots per employee.
//! Operation-first: O(O * Q * D) for Q qualified employees and D window days.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, info};

use super::ledger::{CapacityLedger, LedgerError};
use crate::config::AllocationStrategy;
use crate::models::{
    EmployeeId, Horizon, Operation, OperationAssignment, OperationId, PlanningData, ResourceId,
};

/// Produces operation assignments against a capacity ledger.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use felios_plan::allocator::{AssignmentAllocator, CapacityLedger};
/// use felios_plan::models::{Employee, Horizon, Operation, PlanningData, Qualification, Resource};
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
///
/// let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
/// let horizon = Horizon::new(d(6), d(10));
/// let data = PlanningData {
///     resources: vec![Resource::new(1, "CNC-Fräse")],
///     employees: vec![Employee::new(1, "Anna Weber")],
///     qualifications: vec![Qualification::new(1, 1)],
///     operations: vec![Operation::new(1, 1, "Fräsen 1", 1).with_window(d(6), d(7)).with_demand(4)],
///     ..Default::default()
/// };
///
/// let mut ledger = CapacityLedger::new();
/// ledger.set_budget(1, 100);
/// ledger.set_employee_day(1, d(6), 8);
/// ledger.set_operation_day(1, d(6), 4);
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// let assignments = AssignmentAllocator::new()
///     .allocate(&data, &horizon, &mut ledger, &mut rng)
///     .unwrap();
/// assert_eq!(assignments.len(), 1);
/// assert_eq!(assignments[0].hours, 4);
/// ```
#[derive(Debug, Clone)]
pub struct AssignmentAllocator {
    strategy: AllocationStrategy,
    operation_coverage: f64,
}

impl AssignmentAllocator {
    /// Creates an employee-budget-first allocator.
    pub fn new() -> Self {
        Self {
            strategy: AllocationStrategy::EmployeeBudgetFirst,
            operation_coverage: 0.8,
        }
    }

    /// Sets the strategy.
    pub fn with_strategy(mut self, strategy: AllocationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the share of operations the operation-first strategy attempts.
    pub fn with_operation_coverage(mut self, coverage: f64) -> Self {
        self.operation_coverage = coverage;
        self
    }

    /// Runs the configured strategy, consuming ledger capacity.
    ///
    /// Returns the new assignments in booking order. The ledger keeps the
    /// remaining capacity afterwards.
    pub fn allocate<R: Rng>(
        &self,
        data: &PlanningData,
        horizon: &Horizon,
        ledger: &mut CapacityLedger,
        rng: &mut R,
    ) -> Result<Vec<OperationAssignment>, LedgerError> {
        let assignments = match self.strategy {
            AllocationStrategy::EmployeeBudgetFirst => {
                self.employee_budget_first(data, horizon, ledger, rng)?
            }
            AllocationStrategy::OperationFirst => {
                self.operation_first(data, horizon, ledger, rng)?
            }
        };

        info!(
            strategy = ?self.strategy,
            assignments = assignments.len(),
            hours = assignments.iter().map(|a| a.hours as u64).sum::<u64>(),
            "assignments allocated"
        );
        Ok(assignments)
    }

    fn employee_budget_first<R: Rng>(
        &self,
        data: &PlanningData,
        horizon: &Horizon,
        ledger: &mut CapacityLedger,
        rng: &mut R,
    ) -> Result<Vec<OperationAssignment>, LedgerError> {
        let slots_by_resource = active_slots_by_resource(data, horizon);
        let resources_by_employee = resources_by_employee(data);
        let mut out = Vec::new();

        for employee in data.employees_by_id() {
            if ledger.budget_remaining(employee.id) == 0 {
                continue;
            }

            let mut candidates: Vec<(OperationId, NaiveDate)> = resources_by_employee
                .get(&employee.id)
                .into_iter()
                .flatten()
                .filter_map(|resource_id| slots_by_resource.get(resource_id))
                .flatten()
                .copied()
                .collect();
            candidates.shuffle(rng);

            let before = out.len();
            for (operation_id, date) in candidates {
                if ledger.budget_remaining(employee.id) == 0 {
                    break;
                }
                let amount = ledger.available(operation_id, employee.id, date);
                if amount == 0 {
                    continue;
                }
                ledger.book(operation_id, employee.id, date, amount)?;
                out.push(OperationAssignment::new(operation_id, employee.id, date, amount));
            }

            debug!(
                employee_id = employee.id,
                booked = out.len() - before,
                budget_left = ledger.budget_remaining(employee.id),
                "employee allocated"
            );
        }

        Ok(out)
    }

    fn operation_first<R: Rng>(
        &self,
        data: &PlanningData,
        horizon: &Horizon,
        ledger: &mut CapacityLedger,
        rng: &mut R,
    ) -> Result<Vec<OperationAssignment>, LedgerError> {
        let mut out = Vec::new();
        let mut uncovered = 0usize;

        for op in data.operations_by_id() {
            // Draw for every operation so the sampling is independent of outcomes.
            if rng.random::<f64>() >= self.operation_coverage {
                continue;
            }
            let days = op.active_days(horizon);
            if days.is_empty() || op.capacity_demand == 0 {
                continue;
            }

            match first_fitting_employee(data, op, &days, ledger) {
                Some(employee_id) => {
                    for &date in &days {
                        ledger.book(op.id, employee_id, date, op.capacity_demand)?;
                        out.push(OperationAssignment::new(
                            op.id,
                            employee_id,
                            date,
                            op.capacity_demand,
                        ));
                    }
                }
                None => uncovered += 1,
            }
        }

        debug!(uncovered, "operation-first pass finished");
        Ok(out)
    }
}

impl Default for AssignmentAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// First qualified employee (ascending id) with room for the full demand on
/// every day of the window.
fn first_fitting_employee(
    data: &PlanningData,
    op: &Operation,
    days: &[NaiveDate],
    ledger: &CapacityLedger,
) -> Option<EmployeeId> {
    let needed_budget = op.capacity_demand as u64 * days.len() as u64;
    data.qualified_employees(op.resource_id)
        .into_iter()
        .find(|&employee_id| {
            ledger.budget_remaining(employee_id) as u64 >= needed_budget
                && days
                    .iter()
                    .all(|&date| ledger.available(op.id, employee_id, date) >= op.capacity_demand)
        })
}

/// (operation, day) slots per resource, operations in ascending id order.
fn active_slots_by_resource(
    data: &PlanningData,
    horizon: &Horizon,
) -> HashMap<ResourceId, Vec<(OperationId, NaiveDate)>> {
    let mut out: HashMap<ResourceId, Vec<(OperationId, NaiveDate)>> = HashMap::new();
    for op in data.operations_by_id() {
        let slots = out.entry(op.resource_id).or_default();
        slots.extend(op.active_days(horizon).into_iter().map(|date| (op.id, date)));
    }
    out
}

/// Distinct qualified resources per employee, ascending.
fn resources_by_employee(data: &PlanningData) -> HashMap<EmployeeId, Vec<ResourceId>> {
    let mut out: HashMap<EmployeeId, Vec<ResourceId>> = HashMap::new();
    for q in &data.qualifications {
        out.entry(q.employee_id).or_default().push(q.resource_id);
    }
    for resources in out.values_mut() {
        resources.sort_unstable();
        resources.dedup();
    }
    out
}
