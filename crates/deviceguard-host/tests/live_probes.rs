use camino::{Utf8Path, Utf8PathBuf};
use deviceguard_domain::ProbeError;
use deviceguard_domain::probe::{
    BuildField, BuildMetadataProbe, DebugProbe, FilesystemProbe, PackageLookup, PackageProbe,
    ProcessProbe,
};
use deviceguard_host::{
    BuildPropProbe, OsFilesystemProbe, PackageDirProbe, ProcStatusDebugProbe, SpawnProcessProbe,
    parse_tracer_pid,
};
use std::time::Duration;
use tempfile::TempDir;

fn write_file(path: &Utf8Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(path, content).expect("write file");
}

fn setup() -> (TempDir, Utf8PathBuf) {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8 path");
    (temp, root)
}

#[test]
fn filesystem_probe_checks_under_prefix() {
    let (_temp, root) = setup();
    write_file(&root.join("system/xbin/su"), "");
    let fs = OsFilesystemProbe {
        root: Some(root.clone()),
    };
    assert!(fs.exists("/system/xbin/su"));
    assert!(!fs.exists("/sbin/su"));
}

#[test]
fn package_dir_probe_resolves_directories() {
    let (_temp, root) = setup();
    std::fs::create_dir_all(root.join("com.topjohnwu.magisk")).expect("mkdir");
    let probe = PackageDirProbe {
        root: root.clone(),
        signature_file: None,
    };
    assert_eq!(
        probe.resolve("com.topjohnwu.magisk").unwrap(),
        PackageLookup::Found
    );
    assert_eq!(
        probe.resolve("eu.chainfire.supersu").unwrap(),
        PackageLookup::NotFound
    );
    assert!(matches!(
        probe.resolve("../etc"),
        Err(ProbeError::Malformed(_))
    ));
}

#[test]
fn package_dir_probe_without_root_is_unavailable() {
    let (_temp, root) = setup();
    let probe = PackageDirProbe {
        root: root.join("missing"),
        signature_file: None,
    };
    assert!(matches!(
        probe.resolve("com.topjohnwu.magisk"),
        Err(ProbeError::ProviderUnavailable(_))
    ));
}

#[test]
fn own_signature_comes_from_hex_file() {
    let (_temp, root) = setup();
    write_file(&root.join("sig.hex"), "30820122cafe\n");
    let probe = PackageDirProbe {
        root: root.clone(),
        signature_file: Some(root.join("sig.hex")),
    };
    assert_eq!(
        probe.own_signature().unwrap().as_bytes(),
        &[0x30, 0x82, 0x01, 0x22, 0xca, 0xfe]
    );

    let unconfigured = PackageDirProbe {
        root,
        signature_file: None,
    };
    assert!(matches!(
        unconfigured.own_signature(),
        Err(ProbeError::ProviderUnavailable(_))
    ));
}

#[test]
fn build_prop_probe_reads_fields() {
    let (_temp, root) = setup();
    write_file(
        &root.join("build.prop"),
        "ro.product.manufacturer=Genymotion\nro.product.model=Samsung Galaxy S9\n",
    );
    let probe = BuildPropProbe {
        path: root.join("build.prop"),
    };
    assert_eq!(
        probe.read(BuildField::Manufacturer).unwrap().as_deref(),
        Some("Genymotion")
    );
    assert_eq!(probe.read(BuildField::Tags).unwrap(), None);

    let missing = BuildPropProbe {
        path: root.join("absent.prop"),
    };
    assert!(matches!(
        missing.read(BuildField::Tags),
        Err(ProbeError::NotFound(_))
    ));
}

#[test]
fn tracer_pid_detects_attached_debugger() {
    let (_temp, root) = setup();
    write_file(
        &root.join("status"),
        "Name:\tapp\nState:\tS (sleeping)\nTracerPid:\t4242\nUid:\t1000\n",
    );
    let probe = ProcStatusDebugProbe {
        path: root.join("status"),
    };
    assert!(probe.is_debugger_attached());

    assert_eq!(parse_tracer_pid("TracerPid:\t0\n"), Some(0));
    assert_eq!(parse_tracer_pid("Name:\tapp\n"), None);

    let unreadable = ProcStatusDebugProbe {
        path: root.join("absent"),
    };
    assert!(!unreadable.is_debugger_attached());
}

#[test]
fn spawn_probe_reports_missing_program() {
    let err = SpawnProcessProbe
        .try_invoke(
            "deviceguard-no-such-program-7f3a",
            Duration::from_millis(100),
        )
        .err()
        .expect("spawn must fail");
    assert!(matches!(err, ProbeError::NotFound(_)));
}

#[cfg(unix)]
#[test]
fn spawn_probe_session_is_killed_on_release() {
    let session = SpawnProcessProbe
        .try_invoke("sleep 30", Duration::from_secs(2))
        .expect("spawn sleep");
    let started = std::time::Instant::now();
    session.release().expect("release");
    assert!(started.elapsed() < Duration::from_secs(2));
}
