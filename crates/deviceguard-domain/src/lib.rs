//! Pure integrity evaluation (no IO).
//!
//! Input: capability providers implemented elsewhere (host adapters, test doubles).
//! Output: four indicators + a derived threat level.

#![forbid(unsafe_code)]

pub mod checks;
pub mod error;
pub mod fingerprint;
pub mod model;
pub mod policy;
pub mod probe;
pub mod report;

mod engine;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use engine::{Evaluator, EvaluatorBuilder, Probes};
pub use error::{ConfigError, ProbeError};
pub use report::{IntegrityReport, derive_level};
