//! Device integrity evaluation.
//!
//! Re-exports the evaluator, its provider traits and the host adapters under one crate.
//!
//! ```
//! use std::sync::Arc;
//! use deviceguard::host::{DeviceSnapshot, SnapshotProbes, snapshot_probes};
//! use deviceguard::policy::{EvaluatorConfig, ExpectedSignature};
//! use deviceguard::{Evaluator, ThreatLevel};
//!
//! let snapshot = DeviceSnapshot {
//!     present_paths: ["/sbin/su".to_string()].into(),
//!     ..DeviceSnapshot::default()
//! };
//! let probes = snapshot_probes(Arc::new(SnapshotProbes::new(snapshot)));
//! let config = EvaluatorConfig::new(ExpectedSignature::parse("cafe")?);
//!
//! let report = Evaluator::new(probes, config)?.evaluate();
//! // Rooted, and the missing signature fails closed.
//! assert_eq!(report.threat_level(), ThreatLevel::Critical);
//! # Ok::<(), deviceguard::ConfigError>(())
//! ```

#![forbid(unsafe_code)]

pub use deviceguard_domain::{
    ConfigError, Evaluator, EvaluatorBuilder, IntegrityReport, ProbeError, Probes, checks,
    derive_level, model, policy, probe,
};
pub use deviceguard_types::{Category, ThreatLevel, ids};

/// Snapshot and live providers.
pub mod host {
    pub use deviceguard_host::*;
}
