use crate::build_prop::parse_build_prop;
use anyhow::Context;
use camino::Utf8Path;
use deviceguard_domain::ProbeError;
use deviceguard_domain::probe::{
    BuildField, BuildMetadataProbe, DebugProbe, ElevatedSession, FilesystemProbe, PackageLookup,
    PackageProbe, ProcessProbe, Signature,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const SCHEMA_SNAPSHOT_V1: &str = "deviceguard.snapshot.v1";

/// Recorded device state, replayed through the provider traits.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DeviceSnapshot {
    /// `deviceguard.snapshot.v1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Filesystem paths that exist on the device.
    #[serde(default)]
    pub present_paths: BTreeSet<String>,

    /// Package identifiers that resolve.
    #[serde(default)]
    pub installed_packages: BTreeSet<String>,

    /// Package identifiers whose lookup fails, with the failure kind.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub package_errors: BTreeMap<String, ProbeErrorKind>,

    /// The application's own signing identity. Absent means it could not be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<SnapshotSignature>,

    #[serde(default)]
    pub build: BuildSnapshot,

    /// A `build.prop` file, relative to the snapshot, filling build fields not set inline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_prop: Option<String>,

    #[serde(default)]
    pub privileged_shell: ShellOutcome,

    #[serde(default)]
    pub debugger_attached: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSignature {
    /// Hex-encoded signature bytes.
    Hex(String),
    Error(ProbeErrorKind),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BuildSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

impl BuildSnapshot {
    pub fn get(&self, field: BuildField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    fn slot(&self, field: BuildField) -> &Option<String> {
        match field {
            BuildField::Fingerprint => &self.fingerprint,
            BuildField::Model => &self.model,
            BuildField::Manufacturer => &self.manufacturer,
            BuildField::Brand => &self.brand,
            BuildField::Device => &self.device,
            BuildField::Tags => &self.tags,
        }
    }

    fn slot_mut(&mut self, field: BuildField) -> &mut Option<String> {
        match field {
            BuildField::Fingerprint => &mut self.fingerprint,
            BuildField::Model => &mut self.model,
            BuildField::Manufacturer => &mut self.manufacturer,
            BuildField::Brand => &mut self.brand,
            BuildField::Device => &mut self.device,
            BuildField::Tags => &mut self.tags,
        }
    }

    /// Fill unset fields from `build.prop` text. Inline values win.
    pub fn fill_from_build_prop(&mut self, text: &str) {
        for (field, value) in parse_build_prop(text) {
            self.slot_mut(field).get_or_insert(value);
        }
    }
}

/// What happened when the privileged shell was invoked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShellOutcome {
    Available,
    #[default]
    Denied,
    Error,
}

/// Serializable form of [`ProbeError`]'s variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProbeErrorKind {
    ProviderUnavailable,
    NotFound,
    InvocationFailure,
    Malformed,
    Timeout,
}

impl ProbeErrorKind {
    pub fn to_error(self, context: &str) -> ProbeError {
        let context = context.to_string();
        match self {
            ProbeErrorKind::ProviderUnavailable => ProbeError::ProviderUnavailable(context),
            ProbeErrorKind::NotFound => ProbeError::NotFound(context),
            ProbeErrorKind::InvocationFailure => ProbeError::InvocationFailure(context),
            ProbeErrorKind::Malformed => ProbeError::Malformed(context),
            ProbeErrorKind::Timeout => ProbeError::Timeout(Duration::ZERO),
        }
    }
}

/// Parse snapshot JSON without touching the filesystem. `build_prop` is left unresolved.
pub fn parse_snapshot_json(text: &str) -> anyhow::Result<DeviceSnapshot> {
    let snapshot: DeviceSnapshot = serde_json::from_str(text).context("parse device snapshot")?;
    if let Some(schema) = snapshot.schema.as_deref()
        && schema != SCHEMA_SNAPSHOT_V1
    {
        anyhow::bail!("unsupported snapshot schema: {schema} (expected {SCHEMA_SNAPSHOT_V1})");
    }
    Ok(snapshot)
}

/// Read a snapshot file and resolve its `build_prop` reference.
pub fn load_snapshot(path: &Utf8Path) -> anyhow::Result<DeviceSnapshot> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {path}"))?;
    let mut snapshot = parse_snapshot_json(&text).with_context(|| format!("in {path}"))?;

    if let Some(rel) = snapshot.build_prop.as_deref() {
        let base = path.parent().unwrap_or_else(|| Utf8Path::new("."));
        let prop_path = base.join(rel);
        let prop = std::fs::read_to_string(&prop_path)
            .with_context(|| format!("read {prop_path}"))?;
        snapshot.build.fill_from_build_prop(&prop);
    }
    Ok(snapshot)
}

/// Implements every provider trait from a [`DeviceSnapshot`].
///
/// Counts opened and released privileged sessions so callers can verify none leak.
#[derive(Debug, Default)]
pub struct SnapshotProbes {
    snapshot: DeviceSnapshot,
    opened: AtomicUsize,
    released: Arc<AtomicUsize>,
}

impl SnapshotProbes {
    pub fn new(snapshot: DeviceSnapshot) -> Self {
        Self {
            snapshot,
            opened: AtomicUsize::new(0),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn snapshot(&self) -> &DeviceSnapshot {
        &self.snapshot
    }

    pub fn sessions_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn sessions_released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl FilesystemProbe for SnapshotProbes {
    fn exists(&self, path: &str) -> bool {
        self.snapshot.present_paths.contains(path)
    }
}

impl PackageProbe for SnapshotProbes {
    fn resolve(&self, identifier: &str) -> Result<PackageLookup, ProbeError> {
        if let Some(kind) = self.snapshot.package_errors.get(identifier) {
            return Err(kind.to_error(identifier));
        }
        if self.snapshot.installed_packages.contains(identifier) {
            Ok(PackageLookup::Found)
        } else {
            Ok(PackageLookup::NotFound)
        }
    }

    fn own_signature(&self) -> Result<Signature, ProbeError> {
        match &self.snapshot.signature {
            Some(SnapshotSignature::Hex(hex)) => Signature::from_hex(hex),
            Some(SnapshotSignature::Error(kind)) => Err(kind.to_error("own signature")),
            None => Err(ProbeError::ProviderUnavailable(
                "snapshot has no signature".to_string(),
            )),
        }
    }
}

struct SnapshotSession {
    released: Arc<AtomicUsize>,
}

impl ElevatedSession for SnapshotSession {
    fn release(self: Box<Self>) -> Result<(), ProbeError> {
        self.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl ProcessProbe for SnapshotProbes {
    fn try_invoke(
        &self,
        command: &str,
        _timeout: Duration,
    ) -> Result<Box<dyn ElevatedSession>, ProbeError> {
        match self.snapshot.privileged_shell {
            ShellOutcome::Available => {
                self.opened.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(SnapshotSession {
                    released: Arc::clone(&self.released),
                }))
            }
            ShellOutcome::Denied => Err(ProbeError::InvocationFailure(format!(
                "{command}: permission denied"
            ))),
            ShellOutcome::Error => Err(ProbeError::ProviderUnavailable(format!(
                "{command}: process execution unavailable"
            ))),
        }
    }
}

impl BuildMetadataProbe for SnapshotProbes {
    fn read(&self, field: BuildField) -> Result<Option<String>, ProbeError> {
        Ok(self.snapshot.build.get(field).map(str::to_string))
    }
}

impl DebugProbe for SnapshotProbes {
    fn is_debugger_attached(&self) -> bool {
        self.snapshot.debugger_attached
    }
}
