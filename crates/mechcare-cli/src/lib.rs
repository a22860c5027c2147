//! MechCare CLI Library
//!
//! Offline interface to the MechCare dataset: the same repository the
//! server uses, called in-process against the local data file.

pub mod data_cmd;
pub mod log_cmd;
pub mod machine_cmd;
