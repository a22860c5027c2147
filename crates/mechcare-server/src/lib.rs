//! MechCare REST server library.
//!
//! Exposes the core repository as a JSON API under `/api`.

pub mod error;
pub mod routes;

pub use routes::{AppState, build_router};
