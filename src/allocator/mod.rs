//! Write-path allocation: shift rotation, capacity ledger, assignments.
//!
//! # Pipeline
//!
//! 1. [`ShiftAllocator`] gives every employee one shift per working day.
//! 2. [`CapacityLedger`] derives remaining hours per employee-day,
//!    operation-day and per-employee annual budget.
//! 3. [`AssignmentAllocator`] consumes the ledger to produce
//!    [`OperationAssignment`](crate::models::OperationAssignment)s.
//! 4. [`AllocationKpi`] summarizes the result.
//!
//! [`generate`] runs the whole pipeline over a dataset. It is single-pass
//! and not idempotent: rerunning it on the same dataset appends a second
//! allocation on top of the first.

mod assignments;
mod kpi;
mod ledger;
mod shifts;

pub use assignments::AssignmentAllocator;
pub use kpi::AllocationKpi;
pub use ledger::{assignable_hours, CapacityLedger, LedgerError};
pub use shifts::ShiftAllocator;

use rand::Rng;
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, GeneratorConfig};
use crate::models::{CatalogError, Employee, PlanningData, ShiftCatalog};

/// Errors of a generation pass.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// The dataset's shifts do not form a valid catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// A ledger counter would have been overdrawn.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// The configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Runs shift rotation and assignment allocation over `data`.
///
/// Shift records are replaced; assignment records are appended. Returns
/// the KPIs of the resulting dataset.
pub fn generate<R: Rng>(
    data: &mut PlanningData,
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<AllocationKpi, AllocationError> {
    let horizon = config.horizon()?;
    let catalog = ShiftCatalog::new(data.shifts.clone())?;

    let employees: Vec<Employee> = data.employees_by_id().into_iter().cloned().collect();
    data.employee_shifts = ShiftAllocator::new()
        .with_absence_probability(config.absence_probability)
        .allocate(&employees, &catalog, &horizon, rng);

    let mut ledger = CapacityLedger::build(data, &horizon, config.utilization_cap);
    let assignments = AssignmentAllocator::new()
        .with_strategy(config.strategy)
        .with_operation_coverage(config.operation_coverage)
        .allocate(data, &horizon, &mut ledger, rng)?;
    for a in assignments {
        data.assignments.push(a);
    }

    let kpi = AllocationKpi::calculate(data, &horizon, config.utilization_cap);
    info!(
        shifts = data.employee_shifts.len(),
        assignments = data.assignments.len(),
        assigned_hours = kpi.total_assigned_hours,
        coverage = kpi.coverage_rate(),
        avg_utilization = kpi.avg_utilization,
        "generation pass finished"
    );
    Ok(kpi)
}
