//! Generation-pass configuration.
//!
//! All knobs of a drop-and-recreate generation pass in one place. Every
//! field has a default, so a JSON config file only needs the keys it
//! overrides.
//!
//! ```
//! use felios_plan::config::{AllocationStrategy, GeneratorConfig};
//!
//! let config = GeneratorConfig::default()
//!     .with_seed(42)
//!     .with_strategy(AllocationStrategy::OperationFirst);
//! assert_eq!(config.seed, Some(42));
//! assert!((config.utilization_cap - 0.8).abs() < 1e-12);
//! ```

use std::path::Path;

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Horizon;

/// How the assignment allocator walks the problem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    /// Per employee: shuffle qualified (operation, day) slots and fill
    /// greedily under the annual budget.
    #[default]
    EmployeeBudgetFirst,
    /// Per operation: hand the whole window to the first qualified
    /// employee with room on every day.
    OperationFirst,
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// File is not valid config JSON.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    /// Horizon year out of range.
    #[error("invalid horizon year: {0}")]
    InvalidYear(i32),
    /// A day-offset range lies outside `0..=MAX_DAY_OFFSET`.
    #[error("{field} ({lo}, {hi}) must lie within 0..={max}", max = MAX_DAY_OFFSET)]
    InvalidDayRange {
        /// Config key.
        field: &'static str,
        /// First bound as given.
        lo: i64,
        /// Second bound as given.
        hi: i64,
    },
}

/// Largest day offset a seed range may use.
pub const MAX_DAY_OFFSET: i64 = 366;

/// Ranges and counts for synthetic data generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Number of projects.
    pub projects: usize,
    /// Number of employees (names are unique).
    pub employees: usize,
    /// Networks per project (inclusive range).
    pub networks_per_project: (usize, usize),
    /// Operations per network (inclusive range).
    pub operations_per_network: (usize, usize),
    /// Milestones per project (inclusive range).
    pub milestones_per_project: (usize, usize),
    /// Operation demand in hours (inclusive range).
    pub demand_hours: (u32, u32),
    /// Operation start, as day offset into the horizon year (inclusive range).
    pub start_day: (i64, i64),
    /// Operation length in days beyond its start (inclusive range).
    pub duration_days: (i64, i64),
    /// Milestone due date, as day offset into the horizon year (inclusive range).
    pub milestone_day: (i64, i64),
    /// Chance an employee gets a second qualification.
    pub second_qualification_probability: f64,
    /// Chance an operation depends on its network predecessor.
    pub dependency_probability: f64,
}

impl SeedConfig {
    /// Checks the day-offset ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ranges = [
            ("start_day", self.start_day),
            ("duration_days", self.duration_days),
            ("milestone_day", self.milestone_day),
        ];
        for (field, (lo, hi)) in ranges {
            let in_range = |v: i64| (0..=MAX_DAY_OFFSET).contains(&v);
            if !in_range(lo) || !in_range(hi) {
                return Err(ConfigError::InvalidDayRange { field, lo, hi });
            }
        }
        Ok(())
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            projects: 50,
            employees: 80,
            networks_per_project: (2, 3),
            operations_per_network: (4, 10),
            milestones_per_project: (2, 4),
            demand_hours: (4, 16),
            start_day: (1, 350),
            duration_days: (1, 5),
            milestone_day: (30, 360),
            second_qualification_probability: 0.25,
            dependency_probability: 0.7,
        }
    }
}

/// Configuration for one generation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Calendar year the horizon covers.
    pub year: i32,
    /// Chance a working day is overridden to absence.
    pub absence_probability: f64,
    /// Share of an employee's shift hours that may be assigned.
    pub utilization_cap: f64,
    /// Allocation strategy.
    pub strategy: AllocationStrategy,
    /// Share of operations the operation-first strategy attempts.
    pub operation_coverage: f64,
    /// Fixed RNG seed; `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Synthetic data shape.
    pub data: SeedConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            year: 2025,
            absence_probability: 0.05,
            utilization_cap: 0.8,
            strategy: AllocationStrategy::default(),
            operation_coverage: 0.8,
            seed: None,
            data: SeedConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Loads a config from a JSON file and checks its seed ranges.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.data.validate()?;
        Ok(config)
    }

    /// Sets the horizon year.
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    /// Fixes the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the allocation strategy.
    pub fn with_strategy(mut self, strategy: AllocationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the absence probability (clamped to [0, 1]).
    pub fn with_absence_probability(mut self, p: f64) -> Self {
        self.absence_probability = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the utilization cap (clamped to [0, 1]).
    pub fn with_utilization_cap(mut self, cap: f64) -> Self {
        self.utilization_cap = cap.clamp(0.0, 1.0);
        self
    }

    /// Sets the operation-first coverage share (clamped to [0, 1]).
    pub fn with_operation_coverage(mut self, coverage: f64) -> Self {
        self.operation_coverage = coverage.clamp(0.0, 1.0);
        self
    }

    /// Sets the synthetic data shape.
    pub fn with_data(mut self, data: SeedConfig) -> Self {
        self.data = data;
        self
    }

    /// The horizon for the configured year.
    pub fn horizon(&self) -> Result<Horizon, ConfigError> {
        Horizon::year(self.year).ok_or(ConfigError::InvalidYear(self.year))
    }

    /// RNG for this pass: seeded when `seed` is set, OS entropy otherwise.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
