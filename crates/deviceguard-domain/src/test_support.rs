//! Configurable provider doubles with call counters.

use crate::engine::{Evaluator, Probes};
use crate::error::ProbeError;
use crate::policy::{EvaluatorConfig, ExpectedSignature};
use crate::probe::{
    BuildField, BuildMetadataProbe, DebugProbe, ElevatedSession, FilesystemProbe, PackageLookup,
    PackageProbe, ProcessProbe, Signature,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub const RELEASE_SIGNATURE: &[u8] = &[0x30, 0x82, 0x01, 0x0a, 0xca, 0xfe];

pub fn expected_release() -> ExpectedSignature {
    ExpectedSignature::Exact(RELEASE_SIGNATURE.to_vec())
}

#[derive(Default)]
pub struct StubFs {
    pub present: BTreeSet<String>,
    pub calls: AtomicUsize,
}

impl StubFs {
    pub fn with(paths: &[&str]) -> Self {
        Self {
            present: paths.iter().map(|p| p.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl FilesystemProbe for StubFs {
    fn exists(&self, path: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.present.contains(path)
    }
}

pub struct StubPackages {
    pub installed: BTreeSet<String>,
    pub failing: BTreeSet<String>,
    pub signature: Result<Signature, ProbeError>,
    pub resolve_calls: AtomicUsize,
    pub signature_calls: AtomicUsize,
}

impl Default for StubPackages {
    fn default() -> Self {
        Self {
            installed: BTreeSet::new(),
            failing: BTreeSet::new(),
            signature: Ok(Signature::new(RELEASE_SIGNATURE.to_vec())),
            resolve_calls: AtomicUsize::new(0),
            signature_calls: AtomicUsize::new(0),
        }
    }
}

impl StubPackages {
    pub fn with_installed(ids: &[&str]) -> Self {
        Self {
            installed: ids.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_signature(signature: Result<Signature, ProbeError>) -> Self {
        Self {
            signature,
            ..Self::default()
        }
    }
}

impl PackageProbe for StubPackages {
    fn resolve(&self, identifier: &str) -> Result<PackageLookup, ProbeError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(identifier) {
            return Err(ProbeError::ProviderUnavailable(identifier.to_string()));
        }
        if self.installed.contains(identifier) {
            Ok(PackageLookup::Found)
        } else {
            Ok(PackageLookup::NotFound)
        }
    }

    fn own_signature(&self) -> Result<Signature, ProbeError> {
        self.signature_calls.fetch_add(1, Ordering::SeqCst);
        self.signature.clone()
    }
}

/// Process double. Each successful invocation hands out a session sharing `released`.
#[derive(Default)]
pub struct StubProcess {
    pub invocable: bool,
    pub fail_release: bool,
    pub calls: AtomicUsize,
    pub last_timeout: std::sync::Mutex<Option<Duration>>,
    pub released: Arc<AtomicBool>,
    pub live_sessions: Arc<AtomicUsize>,
}

impl StubProcess {
    pub fn invocable() -> Self {
        Self {
            invocable: true,
            ..Self::default()
        }
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

struct StubSession {
    fail_release: bool,
    released: Arc<AtomicBool>,
    live_sessions: Arc<AtomicUsize>,
}

impl ElevatedSession for StubSession {
    fn release(self: Box<Self>) -> Result<(), ProbeError> {
        self.released.store(true, Ordering::SeqCst);
        self.live_sessions.fetch_sub(1, Ordering::SeqCst);
        if self.fail_release {
            Err(ProbeError::InvocationFailure("kill failed".to_string()))
        } else {
            Ok(())
        }
    }
}

impl ProcessProbe for StubProcess {
    fn try_invoke(
        &self,
        command: &str,
        timeout: Duration,
    ) -> Result<Box<dyn ElevatedSession>, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_timeout.lock() {
            *last = Some(timeout);
        }
        if !self.invocable {
            return Err(ProbeError::InvocationFailure(format!("{command}: not found")));
        }
        self.released.store(false, Ordering::SeqCst);
        self.live_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubSession {
            fail_release: self.fail_release,
            released: Arc::clone(&self.released),
            live_sessions: Arc::clone(&self.live_sessions),
        }))
    }
}

#[derive(Default)]
pub struct StubBuild {
    pub fields: BTreeMap<BuildField, String>,
    pub failing: BTreeSet<BuildField>,
    pub calls: AtomicUsize,
}

impl StubBuild {
    pub fn with(fields: &[(BuildField, &str)]) -> Self {
        Self {
            fields: fields.iter().map(|(f, v)| (*f, v.to_string())).collect(),
            ..Self::default()
        }
    }

    /// Metadata of an ordinary retail handset.
    pub fn retail() -> Self {
        Self::with(&[
            (
                BuildField::Fingerprint,
                "google/oriole/oriole:14/UQ1A.240105.004/11206848:user/release-keys",
            ),
            (BuildField::Model, "Pixel 6"),
            (BuildField::Manufacturer, "Google"),
            (BuildField::Brand, "google"),
            (BuildField::Device, "oriole"),
            (BuildField::Tags, "release-keys"),
        ])
    }
}

impl BuildMetadataProbe for StubBuild {
    fn read(&self, field: BuildField) -> Result<Option<String>, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&field) {
            return Err(ProbeError::ProviderUnavailable(field.to_string()));
        }
        Ok(self.fields.get(&field).cloned())
    }
}

#[derive(Default)]
pub struct StubDebug {
    pub attached: AtomicBool,
    pub calls: AtomicUsize,
}

impl StubDebug {
    pub fn attached(attached: bool) -> Self {
        Self {
            attached: AtomicBool::new(attached),
            calls: AtomicUsize::new(0),
        }
    }
}

impl DebugProbe for StubDebug {
    fn is_debugger_attached(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.attached.load(Ordering::SeqCst)
    }
}

/// A full set of doubles, kept as concrete `Arc`s so tests can inspect them afterwards.
pub struct StubDevice {
    pub fs: Arc<StubFs>,
    pub packages: Arc<StubPackages>,
    pub process: Arc<StubProcess>,
    pub build: Arc<StubBuild>,
    pub debug: Arc<StubDebug>,
}

impl StubDevice {
    /// A retail device signed with the release key: every indicator absent.
    pub fn clean() -> Self {
        Self {
            fs: Arc::new(StubFs::default()),
            packages: Arc::new(StubPackages::default()),
            process: Arc::new(StubProcess::default()),
            build: Arc::new(StubBuild::retail()),
            debug: Arc::new(StubDebug::default()),
        }
    }

    pub fn probes(&self) -> Probes {
        Probes {
            fs: self.fs.clone(),
            packages: self.packages.clone(),
            process: self.process.clone(),
            build: self.build.clone(),
            debug: self.debug.clone(),
        }
    }

    pub fn evaluator(&self) -> Evaluator {
        Evaluator::new(self.probes(), EvaluatorConfig::new(expected_release()))
            .expect("default config is valid")
    }
}
