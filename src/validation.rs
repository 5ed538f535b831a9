//! Dataset validation and ledger audit.
//!
//! [`validate_dataset`] checks structural integrity before allocation:
//! - Duplicate IDs
//! - Dangling references between tables
//! - Circular operation dependencies (DAG validation)
//! - Dependencies whose predecessor does not end before the successor starts
//! - Operation windows that end before they start
//! - More than one shift record per (employee, date)
//!
//! [`audit_assignments`] checks the allocation invariants after the fact:
//! daily capacity, daily demand, qualification, annual budget and weekend
//! exclusion.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::{HashMap, HashSet};

use crate::allocator::assignable_hours;
use crate::models::{
    is_working_day, respects_order, EmployeeId, Horizon, OperationId, PlanningData, Violation,
    ViolationType,
};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two rows of one table share the same ID.
    DuplicateId,
    /// A row references a missing row of another table.
    InvalidReference,
    /// Dependency graph contains a cycle.
    CyclicDependency,
    /// A predecessor does not end strictly before its successor starts.
    DependencyOrder,
    /// An operation window ends before it starts.
    InvalidWindow,
    /// More than one shift record for an (employee, date).
    DuplicateShiftRecord,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn collect_ids(
    table: &str,
    ids: impl Iterator<Item = i64>,
    errors: &mut Vec<ValidationError>,
) -> HashSet<i64> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {table} ID: {id}"),
            ));
        }
    }
    seen
}

fn check_ref(
    errors: &mut Vec<ValidationError>,
    known: &HashSet<i64>,
    id: i64,
    what: impl FnOnce() -> String,
) {
    if !known.contains(&id) {
        errors.push(ValidationError::new(ValidationErrorKind::InvalidReference, what()));
    }
}

/// Validates the structural integrity of a dataset.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_dataset(data: &PlanningData) -> ValidationResult {
    let mut errors = Vec::new();

    let projects = collect_ids("project", data.projects.iter().map(|p| p.id), &mut errors);
    let networks = collect_ids("network", data.networks.iter().map(|n| n.id), &mut errors);
    collect_ids("milestone", data.milestones.iter().map(|m| m.id), &mut errors);
    let operations = collect_ids("operation", data.operations.iter().map(|o| o.id), &mut errors);
    let resources = collect_ids("resource", data.resources.iter().map(|r| r.id), &mut errors);
    let employees = collect_ids("employee", data.employees.iter().map(|e| e.id), &mut errors);
    let shifts = collect_ids("shift", data.shifts.iter().map(|s| s.id), &mut errors);

    for n in &data.networks {
        check_ref(&mut errors, &projects, n.project_id, || {
            format!("Network '{}' references unknown project {}", n.id, n.project_id)
        });
        if let Some(parent) = n.parent_network_id {
            check_ref(&mut errors, &networks, parent, || {
                format!("Network '{}' references unknown parent network {parent}", n.id)
            });
        }
    }

    for m in &data.milestones {
        check_ref(&mut errors, &projects, m.project_id, || {
            format!("Milestone '{}' references unknown project {}", m.id, m.project_id)
        });
    }

    for op in &data.operations {
        check_ref(&mut errors, &networks, op.network_id, || {
            format!("Operation '{}' references unknown network {}", op.id, op.network_id)
        });
        check_ref(&mut errors, &resources, op.resource_id, || {
            format!("Operation '{}' references unknown resource {}", op.id, op.resource_id)
        });
        if let Some(w) = op.window() {
            if w.is_empty() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidWindow,
                    format!("Operation '{}' ends ({}) before it starts ({})", op.id, w.end, w.start),
                ));
            }
        }
    }

    for q in &data.qualifications {
        check_ref(&mut errors, &employees, q.employee_id, || {
            format!("Qualification references unknown employee {}", q.employee_id)
        });
        check_ref(&mut errors, &resources, q.resource_id, || {
            format!("Qualification references unknown resource {}", q.resource_id)
        });
    }

    let mut shift_keys = HashSet::new();
    for es in &data.employee_shifts {
        check_ref(&mut errors, &employees, es.employee_id, || {
            format!("Shift record references unknown employee {}", es.employee_id)
        });
        check_ref(&mut errors, &shifts, es.shift_id, || {
            format!("Shift record references unknown shift {}", es.shift_id)
        });
        if !shift_keys.insert((es.employee_id, es.date)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateShiftRecord,
                format!("Employee {} has several shifts on {}", es.employee_id, es.date),
            ));
        }
    }

    for dep in &data.dependencies {
        check_ref(&mut errors, &operations, dep.operation_id, || {
            format!("Dependency references unknown operation {}", dep.operation_id)
        });
        check_ref(&mut errors, &operations, dep.depends_on_operation_id, || {
            format!(
                "Operation '{}' depends on unknown operation {}",
                dep.operation_id, dep.depends_on_operation_id
            )
        });
        if let (Some(succ), Some(pred)) = (
            data.operation(dep.operation_id),
            data.operation(dep.depends_on_operation_id),
        ) {
            if !respects_order(pred, succ) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DependencyOrder,
                    format!(
                        "Operation '{}' starts before its predecessor '{}' ends",
                        succ.id, pred.id
                    ),
                ));
            }
        }
    }

    if let Some(cycle_err) = detect_cycles(data) {
        errors.push(cycle_err);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects cycles in the dependency graph using DFS.
///
/// # Algorithm
/// Topological sort via DFS. If a back-edge is found (visiting a node
/// currently in the recursion stack), a cycle exists.
fn detect_cycles(data: &PlanningData) -> Option<ValidationError> {
    // successor → predecessors; reversing the edges keeps every cycle
    let adj = data.dependencies_by_operation();

    let mut nodes: Vec<OperationId> = adj.keys().copied().collect();
    nodes.sort_unstable();

    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();

    for node in nodes {
        if !visited.contains(&node) && has_cycle_dfs(node, &adj, &mut visited, &mut in_stack) {
            return Some(ValidationError::new(
                ValidationErrorKind::CyclicDependency,
                format!("Circular dependency detected involving operation '{node}'"),
            ));
        }
    }

    None
}

fn has_cycle_dfs(
    node: OperationId,
    adj: &HashMap<OperationId, Vec<OperationId>>,
    visited: &mut HashSet<OperationId>,
    in_stack: &mut HashSet<OperationId>,
) -> bool {
    visited.insert(node);
    in_stack.insert(node);

    if let Some(neighbors) = adj.get(&node) {
        for &next in neighbors {
            if in_stack.contains(&next) {
                return true; // Back edge → cycle
            }
            if !visited.contains(&next) && has_cycle_dfs(next, adj, visited, in_stack) {
                return true;
            }
        }
    }

    in_stack.remove(&node);
    false
}

/// Audits assignments against the ledger invariants.
///
/// Returns every violation found; an empty vector means the allocation is
/// consistent with the shift calendar, demand, qualifications and budgets.
pub fn audit_assignments(
    data: &PlanningData,
    horizon: &Horizon,
    utilization_cap: f64,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let capacity = data.shift_capacity_map();
    let qualified = data.qualification_set();

    let mut dates: Vec<_> = data
        .employee_shifts
        .iter()
        .map(|es| (es.employee_id, es.date))
        .chain(data.assignments.assignments.iter().map(|a| (a.employee_id, a.date)))
        .filter(|(_, date)| !is_working_day(*date))
        .collect();
    dates.sort_unstable();
    dates.dedup();
    for (employee_id, date) in dates {
        violations.push(Violation::new(
            ViolationType::WeekendDate,
            employee_id,
            Some(date),
            format!("Employee {employee_id} has a record on weekend day {date}"),
        ));
    }

    let mut by_employee_day: Vec<_> = data.assignments.hours_by_employee_day().into_iter().collect();
    by_employee_day.sort_unstable();
    for ((employee_id, date), hours) in by_employee_day {
        let cap = capacity.get(&(employee_id, date)).copied().unwrap_or(0) as u64;
        if hours > cap {
            violations.push(Violation::new(
                ViolationType::CapacityExceeded,
                employee_id,
                Some(date),
                format!("Employee {employee_id} assigned {hours}h on {date}, shift allows {cap}h"),
            ));
        }
    }

    let demand: HashMap<OperationId, u64> = data
        .operations
        .iter()
        .map(|o| (o.id, o.capacity_demand as u64))
        .collect();
    let mut by_operation_day: Vec<_> = data.assignments.hours_by_operation_day().into_iter().collect();
    by_operation_day.sort_unstable();
    for ((operation_id, date), hours) in by_operation_day {
        let cap = demand.get(&operation_id).copied().unwrap_or(0);
        if hours > cap {
            violations.push(Violation::new(
                ViolationType::DemandExceeded,
                operation_id,
                Some(date),
                format!("Operation {operation_id} assigned {hours}h on {date}, demand is {cap}h"),
            ));
        }
    }

    for a in &data.assignments.assignments {
        let resource = data.operation(a.operation_id).map(|o| o.resource_id);
        let ok = resource.is_some_and(|r| qualified.contains(&(a.employee_id, r)));
        if !ok {
            violations.push(Violation::new(
                ViolationType::Unqualified,
                a.employee_id,
                Some(a.date),
                format!(
                    "Employee {} is not qualified for operation {}",
                    a.employee_id, a.operation_id
                ),
            ));
        }
    }

    let mut annual: HashMap<EmployeeId, u64> = HashMap::new();
    for ((employee_id, date), cap) in &capacity {
        if horizon.is_working_day(*date) {
            *annual.entry(*employee_id).or_insert(0) += *cap as u64;
        }
    }
    let mut employees: Vec<EmployeeId> = data.employees.iter().map(|e| e.id).collect();
    employees.sort_unstable();
    for employee_id in employees {
        let shift_hours = annual.get(&employee_id).copied().unwrap_or(0);
        let budget = assignable_hours(shift_hours.min(u32::MAX as u64) as u32, utilization_cap) as u64;
        let assigned = data.assignments.employee_hours(employee_id);
        if assigned > budget {
            violations.push(Violation::new(
                ViolationType::BudgetExceeded,
                employee_id,
                None,
                format!("Employee {employee_id} assigned {assigned}h, budget is {budget}h"),
            ));
        }
    }

    violations
}
