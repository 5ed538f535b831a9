//! Shift models and the shift catalog.
//!
//! A shift is a named daily capacity template. Employees receive exactly
//! one shift per working day; the absence shift carries zero capacity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{EmployeeId, ShiftId};

/// A daily capacity template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique shift identifier.
    pub id: ShiftId,
    /// Human-readable name.
    pub name: String,
    /// Hours available on a day worked under this shift (0 = absent).
    pub daily_capacity: u32,
    /// Display color (`#RRGGBB`).
    pub color_code: String,
}

impl Shift {
    /// Creates a shift.
    pub fn new(
        id: ShiftId,
        name: impl Into<String>,
        daily_capacity: u32,
        color_code: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            daily_capacity,
            color_code: color_code.into(),
        }
    }

    /// Whether this is an absence shift.
    #[inline]
    pub fn is_absence(&self) -> bool {
        self.daily_capacity == 0
    }
}

/// An employee's shift on a given date.
///
/// At most one per (employee, date).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeShift {
    /// Employee.
    pub employee_id: EmployeeId,
    /// Assigned shift.
    pub shift_id: ShiftId,
    /// Day.
    pub date: NaiveDate,
}

impl EmployeeShift {
    /// Creates a shift record.
    pub fn new(employee_id: EmployeeId, shift_id: ShiftId, date: NaiveDate) -> Self {
        Self {
            employee_id,
            shift_id,
            date,
        }
    }
}

/// Shift catalog construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No zero-capacity shift present.
    #[error("shift catalog has no absence shift")]
    MissingAbsence,
    /// More than one zero-capacity shift present.
    #[error("shift catalog has {0} absence shifts, expected exactly one")]
    AmbiguousAbsence(usize),
    /// Only the absence shift present.
    #[error("shift catalog has no working shift")]
    NoWorkingShift,
}

/// Ordered shift catalog with one designated absence shift.
///
/// Working shifts keep their catalog order; the rotation cycles through
/// them in that order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftCatalog {
    working: Vec<Shift>,
    absence: Shift,
}

impl ShiftCatalog {
    /// Builds a catalog, picking the single zero-capacity shift as absence.
    pub fn new(shifts: Vec<Shift>) -> Result<Self, CatalogError> {
        let (absences, working): (Vec<Shift>, Vec<Shift>) =
            shifts.into_iter().partition(Shift::is_absence);

        let absence = match absences.len() {
            0 => return Err(CatalogError::MissingAbsence),
            1 => absences.into_iter().next().ok_or(CatalogError::MissingAbsence)?,
            n => return Err(CatalogError::AmbiguousAbsence(n)),
        };
        if working.is_empty() {
            return Err(CatalogError::NoWorkingShift);
        }

        Ok(Self { working, absence })
    }

    /// The default catalog: early, late and night shifts plus absence.
    pub fn standard() -> Self {
        Self {
            working: vec![
                Shift::new(1, "Frühschicht", 8, "#B0BEC5"),
                Shift::new(2, "Spätschicht", 8, "#90A4AE"),
                Shift::new(3, "Nachtschicht", 8, "#78909C"),
            ],
            absence: Shift::new(4, "Abwesend", 0, "#CFD8DC"),
        }
    }

    /// Working shifts in rotation order.
    pub fn working(&self) -> &[Shift] {
        &self.working
    }

    /// The absence shift.
    pub fn absence(&self) -> &Shift {
        &self.absence
    }

    /// All shifts, working first then absence.
    pub fn all(&self) -> impl Iterator<Item = &Shift> {
        self.working.iter().chain(std::iter::once(&self.absence))
    }

    /// Working shift for a rotation slot (wraps around).
    pub fn rotation(&self, slot: usize) -> &Shift {
        &self.working[slot % self.working.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog() {
        let cat = ShiftCatalog::standard();
        assert_eq!(cat.working().len(), 3);
        assert!(cat.absence().is_absence());
        assert_eq!(cat.all().count(), 4);
        assert_eq!(cat.absence().id, 4);
        assert_eq!(cat.absence().daily_capacity, 0);
    }

    #[test]
    fn test_rotation_wraps() {
        let cat = ShiftCatalog::standard();
        assert_eq!(cat.rotation(0).id, 1);
        assert_eq!(cat.rotation(2).id, 3);
        assert_eq!(cat.rotation(3).id, 1);
    }

    #[test]
    fn test_catalog_keeps_order() {
        let cat = ShiftCatalog::new(vec![
            Shift::new(10, "Absent", 0, "#000000"),
            Shift::new(11, "Late", 6, "#111111"),
            Shift::new(12, "Early", 8, "#222222"),
        ])
        .unwrap();
        assert_eq!(cat.absence().id, 10);
        assert_eq!(cat.working()[0].id, 11);
        assert_eq!(cat.working()[1].id, 12);
    }

    #[test]
    fn test_catalog_errors() {
        let missing = ShiftCatalog::new(vec![Shift::new(1, "Early", 8, "#fff")]);
        assert_eq!(missing.unwrap_err(), CatalogError::MissingAbsence);

        let ambiguous = ShiftCatalog::new(vec![
            Shift::new(1, "Early", 8, "#fff"),
            Shift::new(2, "Off", 0, "#fff"),
            Shift::new(3, "Sick", 0, "#fff"),
        ]);
        assert_eq!(ambiguous.unwrap_err(), CatalogError::AmbiguousAbsence(2));

        let no_work = ShiftCatalog::new(vec![Shift::new(1, "Off", 0, "#fff")]);
        assert_eq!(no_work.unwrap_err(), CatalogError::NoWorkingShift);
    }
}
