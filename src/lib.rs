//! Capacity-constrained planning core.
//!
//! Staffs manufacturing operations with qualified employees under daily
//! shift capacity, per-day operation demand and an annual utilization
//! budget, and aggregates the result for visualization.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Project`, `Network`, `Operation`,
//!   `Employee`, `Shift`, `OperationAssignment`, calendar and horizon
//! - **`allocator`**: Write path: shift rotation, capacity ledger,
//!   assignment strategies, KPIs
//! - **`capacity`**: Read path: daily capacity/assigned series per resource
//! - **`validation`**: Structural checks (duplicate IDs, references, DAG
//!   cycles, dependency order) and the allocation audit
//! - **`seed`**: Synthetic scenario generation
//! - **`store`**: SQLite Schema Store with query, edit and viewer surfaces
//! - **`config`**: Generation-pass configuration
//!
//! # Pipeline
//!
//! ```text
//! seed::generate_dataset → allocator::generate → store::Store::write_dataset
//!                                                       ↓
//!                                  query / views / capacity (read side)
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"

pub mod allocator;
pub mod capacity;
pub mod config;
pub mod models;
pub mod seed;
pub mod store;
pub mod validation;
