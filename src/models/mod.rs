//! Planning domain models.
//!
//! Provides the data types for the project/operation/workforce schema and
//! for the allocation results derived from it. Each type maps 1:1 to a
//! row of the Schema Store.
//!
//! # Entity Map
//!
//! | Model | Table | Owned by |
//! |-------|-------|----------|
//! | Project | project | - |
//! | Network | network | Project (optionally a parent Network) |
//! | Milestone | milestone | Project |
//! | Operation | operation | Network |
//! | OperationDependency | operation_dependency | Operation |
//! | Resource | resource | - |
//! | Employee | employee | - |
//! | Qualification | employee_qualification | Employee × Resource |
//! | Shift | shift | - |
//! | EmployeeShift | employee_shift | Employee × Date |
//! | OperationAssignment | operation_assignment | Operation × Employee × Date |

mod assignment;
mod calendar;
mod dataset;
mod employee;
mod operation;
mod project;
mod shift;

pub use assignment::{AssignmentSet, OperationAssignment, Violation, ViolationType};
pub use calendar::{format_date, is_working_day, DateRange, Horizon};
pub use dataset::PlanningData;
pub use employee::{Employee, Qualification, Resource};
pub use operation::{respects_order, Operation, OperationDependency};
pub use project::{Milestone, Network, Project};
pub use shift::{CatalogError, EmployeeShift, Shift, ShiftCatalog};

/// Project row id.
pub type ProjectId = i64;
/// Network row id.
pub type NetworkId = i64;
/// Milestone row id.
pub type MilestoneId = i64;
/// Operation row id.
pub type OperationId = i64;
/// Resource row id.
pub type ResourceId = i64;
/// Employee row id.
pub type EmployeeId = i64;
/// Shift row id.
pub type ShiftId = i64;
