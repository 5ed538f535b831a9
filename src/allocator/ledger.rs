//! Capacity ledger.
//!
//! Tracks remaining assignable hours at three granularities while the
//! assignment allocator consumes them:
//!
//! | Counter | Key | Initial value |
//! |---------|-----|---------------|
//! | employee-day | (employee, date) | shift daily capacity (0 if absent / no shift) |
//! | operation-day | (operation, date) | full operation demand, per active working day |
//! | annual budget | employee | floor(horizon shift hours × utilization cap) |
//!
//! Hours already booked in the dataset are deducted on construction, so a
//! ledger built from a partially populated store continues where it left off.
//!
//! The ledger is explicit mutable state passed by `&mut` into the
//! allocator; nothing is global.

use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;

use crate::models::{EmployeeId, Horizon, OperationId, PlanningData};

/// Overdraw of a ledger counter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Employee-day capacity exceeded.
    #[error("employee {employee_id} has {remaining}h left on {date}, requested {requested}h")]
    EmployeeDay {
        employee_id: EmployeeId,
        date: NaiveDate,
        remaining: u32,
        requested: u32,
    },
    /// Operation-day demand exceeded.
    #[error("operation {operation_id} has {remaining}h demand left on {date}, requested {requested}h")]
    OperationDay {
        operation_id: OperationId,
        date: NaiveDate,
        remaining: u32,
        requested: u32,
    },
    /// Annual budget exceeded.
    #[error("employee {employee_id} has {remaining}h annual budget left, requested {requested}h")]
    Budget {
        employee_id: EmployeeId,
        remaining: u32,
        requested: u32,
    },
}

/// Remaining-capacity counters for one allocation pass.
#[derive(Debug, Clone, Default)]
pub struct CapacityLedger {
    employee_day: HashMap<(EmployeeId, NaiveDate), u32>,
    operation_day: HashMap<(OperationId, NaiveDate), u32>,
    budget: HashMap<EmployeeId, u32>,
    annual_capacity: HashMap<EmployeeId, u32>,
}

impl CapacityLedger {
    /// Creates an empty ledger (every counter reads zero).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the ledger from shift records, operations and existing
    /// assignments.
    ///
    /// Only working days inside the horizon carry capacity or demand.
    pub fn build(data: &PlanningData, horizon: &Horizon, utilization_cap: f64) -> Self {
        let mut ledger = Self::new();

        for ((employee_id, date), capacity) in data.shift_capacity_map() {
            if !horizon.is_working_day(date) {
                continue;
            }
            ledger.employee_day.insert((employee_id, date), capacity);
            *ledger.annual_capacity.entry(employee_id).or_insert(0) += capacity;
        }

        for employee in &data.employees {
            let annual = ledger.annual_capacity.get(&employee.id).copied().unwrap_or(0);
            ledger
                .budget
                .insert(employee.id, assignable_hours(annual, utilization_cap));
        }

        for op in &data.operations {
            for date in op.active_days(horizon) {
                ledger.operation_day.insert((op.id, date), op.capacity_demand);
            }
        }

        for a in &data.assignments.assignments {
            if let Some(rem) = ledger.employee_day.get_mut(&(a.employee_id, a.date)) {
                *rem = rem.saturating_sub(a.hours);
            }
            if let Some(rem) = ledger.operation_day.get_mut(&(a.operation_id, a.date)) {
                *rem = rem.saturating_sub(a.hours);
            }
            if let Some(rem) = ledger.budget.get_mut(&a.employee_id) {
                *rem = rem.saturating_sub(a.hours);
            }
        }

        ledger
    }

    /// Sets an employee-day counter.
    pub fn set_employee_day(&mut self, employee_id: EmployeeId, date: NaiveDate, hours: u32) {
        self.employee_day.insert((employee_id, date), hours);
    }

    /// Sets an operation-day counter.
    pub fn set_operation_day(&mut self, operation_id: OperationId, date: NaiveDate, hours: u32) {
        self.operation_day.insert((operation_id, date), hours);
    }

    /// Sets an employee's annual budget.
    pub fn set_budget(&mut self, employee_id: EmployeeId, hours: u32) {
        self.budget.insert(employee_id, hours);
    }

    /// Remaining hours for an employee on a date.
    pub fn employee_remaining(&self, employee_id: EmployeeId, date: NaiveDate) -> u32 {
        self.employee_day
            .get(&(employee_id, date))
            .copied()
            .unwrap_or(0)
    }

    /// Remaining demand for an operation on a date.
    pub fn operation_remaining(&self, operation_id: OperationId, date: NaiveDate) -> u32 {
        self.operation_day
            .get(&(operation_id, date))
            .copied()
            .unwrap_or(0)
    }

    /// Remaining annual budget for an employee.
    pub fn budget_remaining(&self, employee_id: EmployeeId) -> u32 {
        self.budget.get(&employee_id).copied().unwrap_or(0)
    }

    /// Total shift hours of an employee over the horizon.
    pub fn annual_capacity(&self, employee_id: EmployeeId) -> u32 {
        self.annual_capacity.get(&employee_id).copied().unwrap_or(0)
    }

    /// Largest amount assignable to (operation, employee, date) right now.
    pub fn available(&self, operation_id: OperationId, employee_id: EmployeeId, date: NaiveDate) -> u32 {
        self.operation_remaining(operation_id, date)
            .min(self.employee_remaining(employee_id, date))
            .min(self.budget_remaining(employee_id))
    }

    /// Decrements an employee-day counter.
    pub fn consume_employee(
        &mut self,
        employee_id: EmployeeId,
        date: NaiveDate,
        hours: u32,
    ) -> Result<(), LedgerError> {
        let remaining = self.employee_remaining(employee_id, date);
        if hours > remaining {
            return Err(LedgerError::EmployeeDay {
                employee_id,
                date,
                remaining,
                requested: hours,
            });
        }
        self.employee_day.insert((employee_id, date), remaining - hours);
        Ok(())
    }

    /// Decrements an operation-day counter.
    pub fn consume_operation(
        &mut self,
        operation_id: OperationId,
        date: NaiveDate,
        hours: u32,
    ) -> Result<(), LedgerError> {
        let remaining = self.operation_remaining(operation_id, date);
        if hours > remaining {
            return Err(LedgerError::OperationDay {
                operation_id,
                date,
                remaining,
                requested: hours,
            });
        }
        self.operation_day.insert((operation_id, date), remaining - hours);
        Ok(())
    }

    /// Decrements an annual budget.
    pub fn consume_budget(&mut self, employee_id: EmployeeId, hours: u32) -> Result<(), LedgerError> {
        let remaining = self.budget_remaining(employee_id);
        if hours > remaining {
            return Err(LedgerError::Budget {
                employee_id,
                remaining,
                requested: hours,
            });
        }
        self.budget.insert(employee_id, remaining - hours);
        Ok(())
    }

    /// Books hours against all three counters.
    ///
    /// Either all counters are decremented or none are.
    pub fn book(
        &mut self,
        operation_id: OperationId,
        employee_id: EmployeeId,
        date: NaiveDate,
        hours: u32,
    ) -> Result<(), LedgerError> {
        let budget = self.budget_remaining(employee_id);
        if hours > budget {
            return Err(LedgerError::Budget {
                employee_id,
                remaining: budget,
                requested: hours,
            });
        }
        let op_left = self.operation_remaining(operation_id, date);
        if hours > op_left {
            return Err(LedgerError::OperationDay {
                operation_id,
                date,
                remaining: op_left,
                requested: hours,
            });
        }
        self.consume_employee(employee_id, date, hours)?;
        self.consume_operation(operation_id, date, hours)?;
        self.consume_budget(employee_id, hours)
    }
}

/// floor(annual × cap), the hours an employee may be allocated per horizon.
pub fn assignable_hours(annual: u32, utilization_cap: f64) -> u32 {
    let cap = utilization_cap.clamp(0.0, 1.0);
    // Tolerance absorbs binary representation error (80 × 0.8 = 64).
    (annual as f64 * cap + 1e-9).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Employee, EmployeeShift, Operation, OperationAssignment, Shift,
    };

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn horizon() -> Horizon {
        // Mon 6th .. Sun 19th: ten working days
        Horizon::new(d(6), d(19))
    }

    fn sample() -> PlanningData {
        let h = horizon();
        let mut data = PlanningData {
            employees: vec![Employee::new(1, "E1"), Employee::new(2, "E2")],
            shifts: vec![Shift::new(1, "Früh", 8, "#a"), Shift::new(2, "Abw", 0, "#b")],
            operations: vec![Operation::new(1, 1, "O1", 1)
                .with_window(d(6), d(12))
                .with_demand(40)],
            ..Default::default()
        };
        for date in h.working_days() {
            data.employee_shifts.push(EmployeeShift::new(1, 1, date));
        }
        data.employee_shifts.push(EmployeeShift::new(2, 2, d(6)));
        // outside the horizon, ignored
        data.employee_shifts.push(EmployeeShift::new(2, 1, d(20)));
        data
    }

    #[test]
    fn test_assignable_hours() {
        assert_eq!(assignable_hours(80, 0.8), 64);
        assert_eq!(assignable_hours(2088, 0.8), 1670);
        assert_eq!(assignable_hours(7, 0.8), 5);
        assert_eq!(assignable_hours(0, 0.8), 0);
        assert_eq!(assignable_hours(10, 1.7), 10);
    }

    #[test]
    fn test_build_supply_and_demand() {
        let ledger = CapacityLedger::build(&sample(), &horizon(), 0.8);

        assert_eq!(ledger.employee_remaining(1, d(6)), 8);
        assert_eq!(ledger.employee_remaining(1, d(11)), 0); // Saturday
        assert_eq!(ledger.employee_remaining(2, d(6)), 0); // absent
        assert_eq!(ledger.employee_remaining(2, d(20)), 0); // outside horizon

        assert_eq!(ledger.annual_capacity(1), 80);
        assert_eq!(ledger.budget_remaining(1), 64);
        assert_eq!(ledger.budget_remaining(2), 0);

        // flat demand on every active working day (Mon..Fri + Mon)
        for day in [6, 7, 8, 9, 10, 13] {
            let expected = if day == 13 { 0 } else { 40 };
            assert_eq!(ledger.operation_remaining(1, d(day)), expected, "day {day}");
        }
        assert_eq!(ledger.operation_remaining(1, d(12)), 0); // Sunday
    }

    #[test]
    fn test_build_deducts_existing_assignments() {
        let mut data = sample();
        data.assignments.push(OperationAssignment::new(1, 1, d(6), 5));
        let ledger = CapacityLedger::build(&data, &horizon(), 0.8);
        assert_eq!(ledger.employee_remaining(1, d(6)), 3);
        assert_eq!(ledger.operation_remaining(1, d(6)), 35);
        assert_eq!(ledger.budget_remaining(1), 59);
    }

    #[test]
    fn test_available_is_min_of_counters() {
        let mut ledger = CapacityLedger::build(&sample(), &horizon(), 0.8);
        assert_eq!(ledger.available(1, 1, d(6)), 8);
        ledger.set_budget(1, 3);
        assert_eq!(ledger.available(1, 1, d(6)), 3);
        ledger.set_operation_day(1, d(6), 2);
        assert_eq!(ledger.available(1, 1, d(6)), 2);
        assert_eq!(ledger.available(1, 2, d(6)), 0);
    }

    #[test]
    fn test_consume_and_overdraw() {
        let mut ledger = CapacityLedger::build(&sample(), &horizon(), 0.8);
        ledger.consume_employee(1, d(6), 6).unwrap();
        assert_eq!(ledger.employee_remaining(1, d(6)), 2);

        let err = ledger.consume_employee(1, d(6), 3).unwrap_err();
        assert!(matches!(err, LedgerError::EmployeeDay { remaining: 2, requested: 3, .. }));
        assert_eq!(ledger.employee_remaining(1, d(6)), 2);

        ledger.consume_operation(1, d(6), 40).unwrap();
        assert!(ledger.consume_operation(1, d(6), 1).is_err());
        assert!(ledger.consume_budget(2, 1).is_err());
    }

    #[test]
    fn test_book_is_all_or_nothing() {
        let mut ledger = CapacityLedger::build(&sample(), &horizon(), 0.8);
        ledger.set_operation_day(1, d(7), 4);

        assert!(ledger.book(1, 1, d(7), 5).is_err());
        assert_eq!(ledger.employee_remaining(1, d(7)), 8);
        assert_eq!(ledger.budget_remaining(1), 64);

        ledger.book(1, 1, d(7), 4).unwrap();
        assert_eq!(ledger.employee_remaining(1, d(7)), 4);
        assert_eq!(ledger.operation_remaining(1, d(7)), 0);
        assert_eq!(ledger.budget_remaining(1), 60);
    }
}
