use crate::build_prop::parse_build_prop;
use camino::{Utf8Path, Utf8PathBuf};
use deviceguard_domain::probe::{
    BuildField, BuildMetadataProbe, DebugProbe, ElevatedSession, FilesystemProbe, PackageLookup,
    PackageProbe, ProcessProbe, Signature,
};
use deviceguard_domain::{ProbeError, Probes};
use std::io;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_BUILD_PROP: &str = "/system/build.prop";
pub const DEFAULT_PACKAGE_ROOT: &str = "/data/data";
pub const DEFAULT_PROC_STATUS: &str = "/proc/self/status";

const REAP_POLL: Duration = Duration::from_millis(5);

/// Where the live probes read from.
#[derive(Clone, Debug)]
pub struct LiveOptions {
    /// Prefix for every denylisted path; `None` checks the real root.
    pub fs_root: Option<Utf8PathBuf>,
    pub build_prop: Utf8PathBuf,
    pub package_root: Utf8PathBuf,
    pub signature_file: Option<Utf8PathBuf>,
    pub proc_status: Utf8PathBuf,
}

impl Default for LiveOptions {
    fn default() -> Self {
        Self {
            fs_root: None,
            build_prop: DEFAULT_BUILD_PROP.into(),
            package_root: DEFAULT_PACKAGE_ROOT.into(),
            signature_file: None,
            proc_status: DEFAULT_PROC_STATUS.into(),
        }
    }
}

/// Providers backed by the machine this process runs on.
pub fn live_probes(opts: &LiveOptions) -> Probes {
    Probes {
        fs: Arc::new(OsFilesystemProbe {
            root: opts.fs_root.clone(),
        }),
        packages: Arc::new(PackageDirProbe {
            root: opts.package_root.clone(),
            signature_file: opts.signature_file.clone(),
        }),
        process: Arc::new(SpawnProcessProbe),
        build: Arc::new(BuildPropProbe {
            path: opts.build_prop.clone(),
        }),
        debug: Arc::new(ProcStatusDebugProbe {
            path: opts.proc_status.clone(),
        }),
    }
}

#[derive(Clone, Debug, Default)]
pub struct OsFilesystemProbe {
    pub root: Option<Utf8PathBuf>,
}

impl FilesystemProbe for OsFilesystemProbe {
    fn exists(&self, path: &str) -> bool {
        match &self.root {
            Some(root) => root.join(path.trim_start_matches('/')).exists(),
            None => Utf8Path::new(path).exists(),
        }
    }
}

/// Starts processes with all stdio detached.
///
/// The command line is split on whitespace; the first word is the program.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpawnProcessProbe;

impl ProcessProbe for SpawnProcessProbe {
    fn try_invoke(
        &self,
        command: &str,
        timeout: Duration,
    ) -> Result<Box<dyn ElevatedSession>, ProbeError> {
        let mut words = command.split_whitespace();
        let program = words
            .next()
            .ok_or_else(|| ProbeError::InvocationFailure("empty command".to_string()))?;

        let child = Command::new(program)
            .args(words)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| spawn_error(program, &e))?;

        tracing::debug!(program, pid = child.id(), "spawned privileged shell");
        Ok(Box::new(SpawnedSession { child, timeout }))
    }
}

fn spawn_error(program: &str, err: &io::Error) -> ProbeError {
    match err.kind() {
        io::ErrorKind::NotFound => ProbeError::NotFound(program.to_string()),
        _ => ProbeError::InvocationFailure(format!("{program}: {err}")),
    }
}

struct SpawnedSession {
    child: Child,
    timeout: Duration,
}

impl ElevatedSession for SpawnedSession {
    fn release(mut self: Box<Self>) -> Result<(), ProbeError> {
        let deadline = Instant::now() + self.timeout;
        if self.child.try_wait().map_err(release_error)?.is_some() {
            return Ok(());
        }
        self.child.kill().map_err(release_error)?;
        loop {
            if self.child.try_wait().map_err(release_error)?.is_some() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(ProbeError::Timeout(self.timeout));
            }
            std::thread::sleep(REAP_POLL);
        }
    }
}

fn release_error(err: io::Error) -> ProbeError {
    ProbeError::InvocationFailure(format!("release: {err}"))
}

/// Reads build fields from a `build.prop` file on every call.
#[derive(Clone, Debug)]
pub struct BuildPropProbe {
    pub path: Utf8PathBuf,
}

impl BuildMetadataProbe for BuildPropProbe {
    fn read(&self, field: BuildField) -> Result<Option<String>, ProbeError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ProbeError::NotFound(self.path.to_string()),
            _ => ProbeError::ProviderUnavailable(format!("{}: {e}", self.path)),
        })?;
        Ok(parse_build_prop(&text).remove(&field))
    }
}

/// Debugger detection through the `TracerPid` line of a Linux `status` file.
#[derive(Clone, Debug)]
pub struct ProcStatusDebugProbe {
    pub path: Utf8PathBuf,
}

impl DebugProbe for ProcStatusDebugProbe {
    fn is_debugger_attached(&self) -> bool {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => parse_tracer_pid(&text).is_some_and(|pid| pid != 0),
            Err(err) => {
                tracing::debug!(path = %self.path, error = %err, "status unreadable; assuming no debugger");
                false
            }
        }
    }
}

pub fn parse_tracer_pid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("TracerPid:"))
        .and_then(|v| v.trim().parse().ok())
}

/// Packages resolved as directories under a data root; the own signature comes from a hex file.
#[derive(Clone, Debug)]
pub struct PackageDirProbe {
    pub root: Utf8PathBuf,
    pub signature_file: Option<Utf8PathBuf>,
}

impl PackageProbe for PackageDirProbe {
    fn resolve(&self, identifier: &str) -> Result<PackageLookup, ProbeError> {
        if identifier.is_empty()
            || identifier.contains('/')
            || identifier.contains('\\')
            || identifier.starts_with('.')
        {
            return Err(ProbeError::Malformed(format!(
                "package identifier: {identifier:?}"
            )));
        }
        if !self.root.is_dir() {
            return Err(ProbeError::ProviderUnavailable(format!(
                "package root {} is not a directory",
                self.root
            )));
        }
        if self.root.join(identifier).is_dir() {
            Ok(PackageLookup::Found)
        } else {
            Ok(PackageLookup::NotFound)
        }
    }

    fn own_signature(&self) -> Result<Signature, ProbeError> {
        let path = self.signature_file.as_ref().ok_or_else(|| {
            ProbeError::ProviderUnavailable("no signature source configured".to_string())
        })?;
        let text = std::fs::read_to_string(path)
            .map_err(|e| ProbeError::ProviderUnavailable(format!("{path}: {e}")))?;
        Signature::from_hex(&text)
    }
}
