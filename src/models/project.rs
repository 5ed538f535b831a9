//! Project structure: projects, networks, milestones.
//!
//! A project owns networks (optionally nested) and milestones.
//! Networks own operations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{MilestoneId, NetworkId, ProjectId};

/// A project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project identifier.
    pub id: ProjectId,
    /// Human-readable name.
    pub name: String,
    /// Display color (`#RRGGBB`).
    pub color_code: String,
}

impl Project {
    /// Creates a project with a neutral display color.
    pub fn new(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color_code: "#90A4AE".to_string(),
        }
    }

    /// Sets the display color.
    pub fn with_color(mut self, color_code: impl Into<String>) -> Self {
        self.color_code = color_code.into();
        self
    }
}

/// A network of operations within a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Unique network identifier.
    pub id: NetworkId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Parent network for hierarchical networks.
    pub parent_network_id: Option<NetworkId>,
    /// Human-readable name.
    pub name: String,
}

impl Network {
    /// Creates a top-level network.
    pub fn new(id: NetworkId, project_id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            project_id,
            parent_network_id: None,
            name: name.into(),
        }
    }

    /// Nests this network under a parent.
    pub fn with_parent(mut self, parent: NetworkId) -> Self {
        self.parent_network_id = Some(parent);
        self
    }
}

/// A project milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Unique milestone identifier.
    pub id: MilestoneId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Human-readable name.
    pub name: String,
    /// Due date, if scheduled.
    pub due_date: Option<NaiveDate>,
}

impl Milestone {
    /// Creates an undated milestone.
    pub fn new(id: MilestoneId, project_id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            project_id,
            name: name.into(),
            due_date: None,
        }
    }

    /// Sets the due date.
    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }
}
