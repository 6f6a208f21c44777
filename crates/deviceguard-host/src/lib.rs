//! Host adapters: recorded device snapshots and live probes of the running machine.
//!
//! This crate is allowed to do filesystem IO and spawn processes. Everything it produces is
//! handed to the domain through the provider traits.

#![forbid(unsafe_code)]

mod build_prop;
mod live;
mod snapshot;

pub use build_prop::{BUILD_PROP_KEYS, field_for_key, parse_build_prop};
pub use live::{
    BuildPropProbe, DEFAULT_BUILD_PROP, DEFAULT_PACKAGE_ROOT, DEFAULT_PROC_STATUS, LiveOptions,
    OsFilesystemProbe, PackageDirProbe, ProcStatusDebugProbe, SpawnProcessProbe, live_probes,
    parse_tracer_pid,
};
pub use snapshot::{
    BuildSnapshot, DeviceSnapshot, ProbeErrorKind, SCHEMA_SNAPSHOT_V1, ShellOutcome,
    SnapshotProbes, SnapshotSignature, load_snapshot, parse_snapshot_json,
};

use deviceguard_domain::Probes;
use std::sync::Arc;

/// Share one [`SnapshotProbes`] as all five providers.
pub fn snapshot_probes(probes: Arc<SnapshotProbes>) -> Probes {
    Probes {
        fs: probes.clone(),
        packages: probes.clone(),
        process: probes.clone(),
        build: probes.clone(),
        debug: probes,
    }
}

/// Fuzz-friendly API: parsers that never touch the filesystem and never panic.
pub mod fuzz {
    /// Parse arbitrary text as `build.prop`.
    pub fn parse_build_prop(text: &str) -> usize {
        super::parse_build_prop(text).len()
    }

    /// Parse arbitrary text as snapshot JSON.
    pub fn parse_snapshot(text: &str) -> anyhow::Result<()> {
        let _ = super::parse_snapshot_json(text)?;
        Ok(())
    }

    /// Parse arbitrary text as a Linux `status` file.
    pub fn parse_tracer_pid(text: &str) -> Option<u32> {
        super::parse_tracer_pid(text)
    }
}
