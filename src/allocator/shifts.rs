//! Shift rotation.
//!
//! # Algorithm
//!
//! For employee position `e` and working-day index `d`, the employee works
//! rotation slot `(e + d) mod W`, where `W` is the number of working
//! shifts. Each day is then independently overridden to the absence shift
//! with probability `absence_probability`.
//!
//! The step is total: every (employee, working day) pair gets exactly one
//! record.
//!
//! # Complexity
//! O(E * D) for E employees and D working days.

use rand::Rng;
use tracing::debug;

use crate::models::{Employee, EmployeeShift, Horizon, ShiftCatalog};

/// Assigns one shift per employee per working day.
///
/// # Example
///
/// ```
/// use felios_plan::allocator::ShiftAllocator;
/// use felios_plan::models::{Employee, Horizon, ShiftCatalog};
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
///
/// let employees = vec![Employee::new(1, "Anna Weber"), Employee::new(2, "Tim Koch")];
/// let horizon = Horizon::year(2025).unwrap();
/// let mut rng = SmallRng::seed_from_u64(1);
///
/// let rows = ShiftAllocator::new()
///     .allocate(&employees, &ShiftCatalog::standard(), &horizon, &mut rng);
/// assert_eq!(rows.len(), 2 * 261);
/// ```
#[derive(Debug, Clone)]
pub struct ShiftAllocator {
    absence_probability: f64,
}

impl ShiftAllocator {
    /// Creates an allocator with a 5% daily absence rate.
    pub fn new() -> Self {
        Self {
            absence_probability: 0.05,
        }
    }

    /// Sets the daily absence probability.
    pub fn with_absence_probability(mut self, p: f64) -> Self {
        self.absence_probability = p;
        self
    }

    /// Allocates shifts.
    ///
    /// Employee position is the index in `employees`, so callers control
    /// the rotation offset by ordering the slice.
    pub fn allocate<R: Rng>(
        &self,
        employees: &[Employee],
        catalog: &ShiftCatalog,
        horizon: &Horizon,
        rng: &mut R,
    ) -> Vec<EmployeeShift> {
        let days = horizon.working_days();
        let mut rows = Vec::with_capacity(employees.len() * days.len());
        let mut absences = 0usize;

        for (position, employee) in employees.iter().enumerate() {
            for (index, &date) in days.iter().enumerate() {
                let mut shift = catalog.rotation(position + index);
                // Out-of-range probabilities saturate instead of panicking.
                if rng.random::<f64>() < self.absence_probability {
                    shift = catalog.absence();
                    absences += 1;
                }
                rows.push(EmployeeShift::new(employee.id, shift.id, date));
            }
        }

        debug!(
            employees = employees.len(),
            working_days = days.len(),
            absences,
            "shift rotation allocated"
        );
        rows
    }
}

impl Default for ShiftAllocator {
    fn default() -> Self {
        Self::new()
    }
}
