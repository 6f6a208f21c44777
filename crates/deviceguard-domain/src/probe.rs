//! Capability providers the detectors read from.
//!
//! Each trait answers one kind of question about the host device. Implementations live outside
//! this crate; the domain only ever sees these traits.

use crate::error::ProbeError;
use std::fmt;
use std::time::Duration;

/// Filesystem existence checks.
pub trait FilesystemProbe: Send + Sync {
    fn exists(&self, path: &str) -> bool;
}

/// Outcome of resolving a package identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PackageLookup {
    Found,
    NotFound,
}

/// Installed-package queries plus the running application's own signing identity.
pub trait PackageProbe: Send + Sync {
    fn resolve(&self, identifier: &str) -> Result<PackageLookup, ProbeError>;

    fn own_signature(&self) -> Result<Signature, ProbeError>;
}

/// A process started through [`ProcessProbe::try_invoke`].
///
/// `release` terminates and reaps it. Callers must release every session they receive.
pub trait ElevatedSession: Send {
    fn release(self: Box<Self>) -> Result<(), ProbeError>;
}

/// Process execution.
pub trait ProcessProbe: Send + Sync {
    /// Start `command`. `timeout` bounds how long the probe may block, including the
    /// eventual release of the returned session.
    fn try_invoke(
        &self,
        command: &str,
        timeout: Duration,
    ) -> Result<Box<dyn ElevatedSession>, ProbeError>;
}

/// Build metadata fields exposed by [`BuildMetadataProbe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuildField {
    Fingerprint,
    Model,
    Manufacturer,
    Brand,
    Device,
    Tags,
}

impl BuildField {
    pub const ALL: [BuildField; 6] = [
        BuildField::Fingerprint,
        BuildField::Model,
        BuildField::Manufacturer,
        BuildField::Brand,
        BuildField::Device,
        BuildField::Tags,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BuildField::Fingerprint => "fingerprint",
            BuildField::Model => "model",
            BuildField::Manufacturer => "manufacturer",
            BuildField::Brand => "brand",
            BuildField::Device => "device",
            BuildField::Tags => "tags",
        }
    }
}

impl fmt::Display for BuildField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only OS build metadata. `Ok(None)` means the field is not set.
pub trait BuildMetadataProbe: Send + Sync {
    fn read(&self, field: BuildField) -> Result<Option<String>, ProbeError>;
}

/// OS-level debugger attachment.
pub trait DebugProbe: Send + Sync {
    fn is_debugger_attached(&self) -> bool;
}

/// Observed signing identity of the running application.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decode a hex-encoded signature (the form Android's `toCharsString` produces).
    pub fn from_hex(text: &str) -> Result<Self, ProbeError> {
        hex::decode(text.trim())
            .map(Self)
            .map_err(|e| ProbeError::Malformed(format!("signature is not valid hex: {e}")))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({} bytes)", self.0.len())
    }
}
