//! Read-path capacity aggregation.
//!
//! For one resource and a date range, produces a daily series of the shift
//! capacity of every employee qualified for the resource next to the hours
//! already assigned to operations on that resource.
//!
//! # Algorithm
//! 1. Resolve the qualified employees. If there are none, return a zero
//!    series without looking at assignments.
//! 2. Sum shift capacity per date over the qualified employees.
//! 3. Sum assignment hours per date over operations on the resource,
//!    regardless of which employee holds them.
//! 4. Emit one point per calendar day in the range, weekends included.
//!
//! # Complexity
//! O(D + S + A) for D days, S shift rows and A assignment rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{DateRange, EmployeeId, OperationId, PlanningData, ResourceId};

/// One day of a capacity series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityPoint {
    /// Calendar day.
    pub date: NaiveDate,
    /// Shift hours of the qualified employees.
    pub capacity: u64,
    /// Hours assigned to operations on the resource.
    pub assigned: u64,
}

/// A series of zeros covering every day of `range`.
pub fn zero_series(range: DateRange) -> Vec<CapacityPoint> {
    range
        .days()
        .map(|date| CapacityPoint {
            date,
            capacity: 0,
            assigned: 0,
        })
        .collect()
}

/// Folds per-date capacity and assignment rows into a daily series.
///
/// Rows may repeat a date; they are summed. Rows outside `range` are
/// ignored and days without rows are zero.
pub fn fold_series<C, A>(range: DateRange, capacity_rows: C, assigned_rows: A) -> Vec<CapacityPoint>
where
    C: IntoIterator<Item = (NaiveDate, u64)>,
    A: IntoIterator<Item = (NaiveDate, u64)>,
{
    let mut capacity: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for (date, hours) in capacity_rows {
        if range.contains(date) {
            *capacity.entry(date).or_insert(0) += hours;
        }
    }
    let mut assigned: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for (date, hours) in assigned_rows {
        if range.contains(date) {
            *assigned.entry(date).or_insert(0) += hours;
        }
    }

    range
        .days()
        .map(|date| CapacityPoint {
            date,
            capacity: capacity.get(&date).copied().unwrap_or(0),
            assigned: assigned.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// Capacity series for `resource_id` over `range`, computed in memory.
///
/// [`crate::store::Store::resource_capacity`] runs the same aggregation
/// against persisted rows.
pub fn resource_capacity(
    data: &PlanningData,
    resource_id: ResourceId,
    range: DateRange,
) -> Vec<CapacityPoint> {
    let qualified: HashSet<EmployeeId> = data.qualified_employees(resource_id).into_iter().collect();
    if qualified.is_empty() {
        return zero_series(range);
    }

    let capacity_rows = data
        .shift_capacity_map()
        .into_iter()
        .filter(|((employee_id, _), _)| qualified.contains(employee_id))
        .map(|((_, date), hours)| (date, hours as u64));

    let resource_of: HashMap<OperationId, ResourceId> = data
        .operations
        .iter()
        .map(|o| (o.id, o.resource_id))
        .collect();
    let assigned_rows = data
        .assignments
        .assignments
        .iter()
        .filter(|a| resource_of.get(&a.operation_id) == Some(&resource_id))
        .map(|a| (a.date, a.hours as u64));

    fold_series(range, capacity_rows, assigned_rows)
}
