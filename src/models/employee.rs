//! Workforce model: resources, employees, qualifications.
//!
//! Resources are machine or workstation capabilities that operations
//! consume. Employees may only be assigned to operations whose resource
//! they hold a qualification for.

use serde::{Deserialize, Serialize};

use super::{EmployeeId, ResourceId};

/// A capability operations consume (machine, workstation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique resource identifier.
    pub id: ResourceId,
    /// Human-readable name.
    pub name: String,
}

impl Resource {
    /// Creates a resource.
    pub fn new(id: ResourceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// An employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique employee identifier.
    pub id: EmployeeId,
    /// Full name.
    pub name: String,
}

impl Employee {
    /// Creates an employee.
    pub fn new(id: EmployeeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Authorization for an employee to operate a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Qualification {
    /// Qualified employee.
    pub employee_id: EmployeeId,
    /// Resource they may operate.
    pub resource_id: ResourceId,
}

impl Qualification {
    /// Creates a qualification.
    pub fn new(employee_id: EmployeeId, resource_id: ResourceId) -> Self {
        Self {
            employee_id,
            resource_id,
        }
    }
}
