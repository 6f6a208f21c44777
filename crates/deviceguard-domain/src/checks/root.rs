use crate::model::{Denylist, Evidence, Indicator};
use crate::policy::RootPolicy;
use crate::probe::{
    BuildField, BuildMetadataProbe, ElevatedSession, FilesystemProbe, PackageLookup,
    PackageProbe, ProcessProbe,
};
use deviceguard_types::{Category, ids};
use std::time::Duration;

/// Build tag carried by firmware signed with development keys.
pub const TEST_KEYS_TAG: &str = "test-keys";

/// Root detection: binaries, root-manager packages, privileged shell, build tags.
///
/// Sub-checks run in that order and stop at the first hit.
pub fn detect_root(
    fs: &dyn FilesystemProbe,
    pkg: &dyn PackageProbe,
    process: &dyn ProcessProbe,
    meta: &dyn BuildMetadataProbe,
    policy: &RootPolicy,
) -> Indicator {
    let evidence = binary_presence(fs, &policy.binaries)
        .or_else(|| root_manager_package(pkg, &policy.packages))
        .or_else(|| privileged_shell(process, &policy.shell_command, policy.shell_timeout))
        .or_else(|| test_keys_build(meta));

    if let Some(e) = &evidence {
        tracing::debug!(code = e.code, detail = %e.detail, "root evidence");
    }
    Indicator::from_evidence(Category::Root, evidence)
}

pub(crate) fn binary_presence(fs: &dyn FilesystemProbe, binaries: &Denylist) -> Option<Evidence> {
    binaries
        .iter()
        .find(|path| fs.exists(path))
        .map(|path| Evidence::new(ids::CODE_ROOT_BINARY_PRESENT, path))
}

pub(crate) fn root_manager_package(
    pkg: &dyn PackageProbe,
    packages: &Denylist,
) -> Option<Evidence> {
    for identifier in packages.iter() {
        match pkg.resolve(identifier) {
            Ok(PackageLookup::Found) => {
                return Some(Evidence::new(ids::CODE_ROOT_PACKAGE_INSTALLED, identifier));
            }
            Ok(PackageLookup::NotFound) => {}
            Err(err) => {
                tracing::debug!(package = identifier, error = %err, "package lookup failed; treating as absent");
            }
        }
    }
    None
}

pub(crate) fn privileged_shell(
    process: &dyn ProcessProbe,
    command: &str,
    timeout: Duration,
) -> Option<Evidence> {
    match process.try_invoke(command, timeout) {
        Ok(session) => {
            SessionGuard::new(session).release();
            Some(Evidence::new(ids::CODE_PRIVILEGED_SHELL_INVOKED, command))
        }
        Err(err) => {
            tracing::debug!(command, error = %err, "privileged shell not invocable");
            None
        }
    }
}

pub(crate) fn test_keys_build(meta: &dyn BuildMetadataProbe) -> Option<Evidence> {
    match meta.read(BuildField::Tags) {
        Ok(Some(tags)) if tags.contains(TEST_KEYS_TAG) => {
            Some(Evidence::new(ids::CODE_TEST_KEYS_BUILD, tags))
        }
        Ok(_) => None,
        Err(err) => {
            tracing::debug!(error = %err, "build tags unreadable; treating as release build");
            None
        }
    }
}

/// Owns a spawned session until it is released.
///
/// `release` is the normal path; `Drop` covers unwinding out of the detector.
struct SessionGuard {
    session: Option<Box<dyn ElevatedSession>>,
}

impl SessionGuard {
    fn new(session: Box<dyn ElevatedSession>) -> Self {
        Self {
            session: Some(session),
        }
    }

    fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(session) = self.session.take()
            && let Err(err) = session.release()
        {
            tracing::warn!(error = %err, "failed to release privileged shell session");
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.release_inner();
    }
}
