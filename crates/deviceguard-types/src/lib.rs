//! Stable DTOs and IDs used across the deviceguard workspace.
//!
//! This crate is intentionally boring:
//! - the threat vocabulary (`Category`, `ThreatLevel`)
//! - data types for the emitted report envelope
//! - stable string IDs and codes
//! - explain registry for remediation guidance

#![forbid(unsafe_code)]

pub mod explain;
pub mod ids;
pub mod level;
pub mod receipt;

pub use explain::{Explanation, lookup_explanation};
pub use level::{Category, ThreatLevel};
pub use receipt::{
    IndicatorRecord, IntegrityData, ReportEnvelope, RunMeta, RuntimeError, SCHEMA_REPORT_V1,
    ToolMeta,
};
