//! `MechCare` Core Library
//!
//! Shared functionality for `MechCare` components:
//! - Machine and service log model with input validation
//! - Maintenance status and runtime quality derivation
//! - JSON file store and the repository that guards it
//! - Configuration resolution and tracing setup
//! - Common error types

pub mod config;
pub mod error;
pub mod maintenance;
pub mod model;
pub mod repository;
pub mod store;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
pub use maintenance::{MachineHealth, QualityReport, Severity, Status, StatusReport};
pub use model::{Dataset, Log, Machine, MachinePatch, NewLog, NewMachine, NumericInput};
pub use repository::Repository;
pub use store::JsonStore;
