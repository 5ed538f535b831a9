//! Operation model.
//!
//! An operation is the smallest schedulable unit of labor. It belongs to a
//! network, consumes exactly one resource, and demands a number of hours
//! inside an optional date window.
//!
//! # Demand Model
//! `capacity_demand` acts as a flat cap per active working day: on any
//! single day the operation may absorb up to its full demand. It is not
//! divided by the window length.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DateRange, Horizon, NetworkId, OperationId, ResourceId};

/// An operation to be staffed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Unique operation identifier.
    pub id: OperationId,
    /// Owning network.
    pub network_id: NetworkId,
    /// Human-readable name.
    pub name: String,
    /// Resource this operation consumes.
    pub resource_id: ResourceId,
    /// First day of the window (inclusive).
    pub start_date: Option<NaiveDate>,
    /// Last day of the window (inclusive).
    pub end_date: Option<NaiveDate>,
    /// Labor demand in hours.
    pub capacity_demand: u32,
}

impl Operation {
    /// Creates an undated operation with zero demand.
    pub fn new(
        id: OperationId,
        network_id: NetworkId,
        name: impl Into<String>,
        resource_id: ResourceId,
    ) -> Self {
        Self {
            id,
            network_id,
            name: name.into(),
            resource_id,
            start_date: None,
            end_date: None,
            capacity_demand: 0,
        }
    }

    /// Sets the date window.
    pub fn with_window(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Sets the labor demand (hours).
    pub fn with_demand(mut self, hours: u32) -> Self {
        self.capacity_demand = hours;
        self
    }

    /// The active window, if both ends are set.
    ///
    /// An operation without a complete window is never active.
    pub fn window(&self) -> Option<DateRange> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            _ => None,
        }
    }

    /// Working days on which the operation is active within the horizon.
    pub fn active_days(&self, horizon: &Horizon) -> Vec<NaiveDate> {
        match self.window() {
            Some(window) => horizon.working_days_in(&window),
            None => Vec::new(),
        }
    }
}

/// Precedence edge: `operation_id` depends on `depends_on_operation_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationDependency {
    /// Successor.
    pub operation_id: OperationId,
    /// Predecessor.
    pub depends_on_operation_id: OperationId,
}

impl OperationDependency {
    /// Creates a dependency edge.
    pub fn new(operation_id: OperationId, depends_on_operation_id: OperationId) -> Self {
        Self {
            operation_id,
            depends_on_operation_id,
        }
    }
}

/// Whether `predecessor` ends strictly before `successor` starts.
///
/// Undated ends impose no ordering and are accepted.
pub fn respects_order(predecessor: &Operation, successor: &Operation) -> bool {
    match (predecessor.end_date, successor.start_date) {
        (Some(end), Some(start)) => end < start,
        _ => true,
    }
}
