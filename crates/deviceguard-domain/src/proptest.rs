//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Threat level derivation over every indicator combination
//! - Evaluation determinism and session release
//! - Fail-closed tamper handling and signature parsing

use crate::checks::detect_tamper;
use crate::error::{ConfigError, ProbeError};
use crate::model::Denylist;
use crate::policy::ExpectedSignature;
use crate::probe::{BuildField, Signature};
use crate::report::derive_level;
use crate::test_support::{
    RELEASE_SIGNATURE, StubBuild, StubDebug, StubDevice, StubFs, StubPackages, StubProcess,
    expected_release,
};
use deviceguard_types::ThreatLevel;
use proptest::prelude::*;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

// ============================================================================
// Strategies
// ============================================================================

fn arb_probe_error() -> impl Strategy<Value = ProbeError> {
    let msg = "[a-z ]{0,16}";
    prop_oneof![
        msg.prop_map(ProbeError::ProviderUnavailable),
        msg.prop_map(ProbeError::NotFound),
        msg.prop_map(ProbeError::InvocationFailure),
        msg.prop_map(ProbeError::Malformed),
        (1u64..5_000).prop_map(|ms| ProbeError::Timeout(Duration::from_millis(ms))),
    ]
}

fn arb_signature_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..64)
}

/// A stub device where every root, emulator and debugger signal is independently switchable.
#[derive(Clone, Debug)]
struct DeviceShape {
    su_binary: bool,
    manager_installed: bool,
    shell_invocable: bool,
    test_keys: bool,
    emulator_fingerprint: bool,
    debugger: bool,
    resigned: bool,
}

fn arb_device_shape() -> impl Strategy<Value = DeviceShape> {
    (
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(
                su_binary,
                manager_installed,
                shell_invocable,
                test_keys,
                emulator_fingerprint,
                debugger,
                resigned,
            )| DeviceShape {
                su_binary,
                manager_installed,
                shell_invocable,
                test_keys,
                emulator_fingerprint,
                debugger,
                resigned,
            },
        )
}

impl DeviceShape {
    fn build(&self) -> StubDevice {
        let fs = if self.su_binary {
            StubFs::with(&["/system/xbin/su"])
        } else {
            StubFs::default()
        };

        let mut packages = if self.manager_installed {
            StubPackages::with_installed(&["eu.chainfire.supersu"])
        } else {
            StubPackages::default()
        };
        if self.resigned {
            packages.signature = Ok(Signature::new(vec![0xde, 0xad]));
        }

        let process = if self.shell_invocable {
            StubProcess::invocable()
        } else {
            StubProcess::default()
        };

        let fingerprint = if self.emulator_fingerprint {
            "generic/sdk_gphone64_x86_64/emu64x:14/UE1A/11:userdebug/dev-keys"
        } else {
            "google/oriole/oriole:14/UQ1A.240105.004/11206848:user/release-keys"
        };
        let tags = if self.test_keys {
            "test-keys"
        } else {
            "release-keys"
        };
        let build = StubBuild::with(&[
            (BuildField::Fingerprint, fingerprint),
            (BuildField::Model, "Pixel 6"),
            (BuildField::Manufacturer, "Google"),
            (BuildField::Brand, "google"),
            (BuildField::Device, "oriole"),
            (BuildField::Tags, tags),
        ]);

        StubDevice {
            fs: Arc::new(fs),
            packages: Arc::new(packages),
            process: Arc::new(process),
            build: Arc::new(build),
            debug: Arc::new(StubDebug::attached(self.debugger)),
        }
    }

    fn rooted(&self) -> bool {
        self.su_binary || self.manager_installed || self.shell_invocable || self.test_keys
    }
}

// ============================================================================
// Threat level derivation
// ============================================================================

proptest! {
    /// Root plus tamper is critical whatever the weaker signals say.
    #[test]
    fn root_and_tamper_is_always_critical(emulator in any::<bool>(), debugger in any::<bool>()) {
        prop_assert_eq!(derive_level(true, true, emulator, debugger), ThreatLevel::Critical);
    }

    /// Exactly one of root and tamper is high whatever the weaker signals say.
    #[test]
    fn single_strong_signal_is_high(
        root in any::<bool>(),
        emulator in any::<bool>(),
        debugger in any::<bool>(),
    ) {
        prop_assert_eq!(derive_level(root, !root, emulator, debugger), ThreatLevel::High);
    }

    /// The level is Safe exactly when nothing is present.
    #[test]
    fn safe_iff_nothing_present(
        root in any::<bool>(),
        tamper in any::<bool>(),
        emulator in any::<bool>(),
        debugger in any::<bool>(),
    ) {
        let safe = derive_level(root, tamper, emulator, debugger) == ThreatLevel::Safe;
        prop_assert_eq!(safe, !(root || tamper || emulator || debugger));
    }

    /// Adding a signal never lowers the level.
    #[test]
    fn level_is_monotonic(
        flags in prop::array::uniform4(any::<bool>()),
        extra in 0usize..4,
    ) {
        let before = derive_level(flags[0], flags[1], flags[2], flags[3]);
        let mut raised = flags;
        raised[extra] = true;
        let after = derive_level(raised[0], raised[1], raised[2], raised[3]);
        prop_assert!(after >= before, "{:?} -> {:?} lowered {} to {}", flags, raised, before, after);
    }
}

// ============================================================================
// Evaluation
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Two evaluations of an unchanged device produce equal reports.
    #[test]
    fn evaluation_is_deterministic(shape in arb_device_shape()) {
        let device = shape.build();
        let evaluator = device.evaluator();
        prop_assert_eq!(evaluator.evaluate(), evaluator.evaluate());
    }

    /// Running the detectors on the rayon pool gives the same report as running them in order.
    #[test]
    fn concurrent_evaluation_is_equivalent(shape in arb_device_shape()) {
        let device = shape.build();
        let evaluator = device.evaluator();
        prop_assert_eq!(evaluator.evaluate_concurrent(), evaluator.evaluate());
    }

    /// Indicators follow the device state and the level follows the indicators.
    #[test]
    fn report_reflects_device_state(shape in arb_device_shape()) {
        let device = shape.build();
        let report = device.evaluator().evaluate();

        prop_assert_eq!(report.is_rooted(), shape.rooted());
        prop_assert_eq!(report.is_tampered(), shape.resigned);
        prop_assert_eq!(report.is_emulator(), shape.emulator_fingerprint);
        prop_assert_eq!(report.is_debugging(), shape.debugger);
        prop_assert_eq!(
            report.threat_level(),
            derive_level(
                report.is_rooted(),
                report.is_tampered(),
                report.is_emulator(),
                report.is_debugging(),
            )
        );
    }

    /// No privileged session outlives an evaluation.
    #[test]
    fn no_session_outlives_evaluation(shape in arb_device_shape(), runs in 1usize..5) {
        let device = shape.build();
        let evaluator = device.evaluator();
        for _ in 0..runs {
            evaluator.evaluate();
            prop_assert_eq!(device.process.live_sessions.load(Ordering::SeqCst), 0);
        }
    }
}

// ============================================================================
// Tamper and signature handling
// ============================================================================

proptest! {
    /// Any provider failure while reading the signature marks the device tampered.
    #[test]
    fn tamper_fails_closed_on_any_error(err in arb_probe_error()) {
        let packages = StubPackages::with_signature(Err(err));
        prop_assert!(detect_tamper(&packages, &expected_release()).is_present());
    }

    /// Any signature other than the release one is tampered; the release one never is.
    #[test]
    fn only_the_expected_signature_passes(bytes in arb_signature_bytes()) {
        let packages = StubPackages::with_signature(Ok(Signature::new(bytes.clone())));
        let tampered = detect_tamper(&packages, &expected_release()).is_present();
        prop_assert_eq!(tampered, bytes.as_slice() != RELEASE_SIGNATURE);
    }

    /// Exact and digest forms of the same expected signature agree.
    #[test]
    fn digest_and_exact_forms_agree(expected in arb_signature_bytes(), observed in arb_signature_bytes()) {
        let exact = ExpectedSignature::parse(&hex::encode(&expected)).unwrap();
        let digest = ExpectedSignature::parse(
            &format!("sha256:{}", crate::fingerprint::sha256_hex(&expected)),
        )
        .unwrap();
        let observed = Signature::new(observed);
        prop_assert_eq!(exact.matches(&observed), digest.matches(&observed));
    }

    /// Whitespace-only expected signatures are reported as missing, not malformed.
    #[test]
    fn blank_expected_signature_is_missing(blank in "[ \t\n]{0,8}") {
        prop_assert_eq!(
            ExpectedSignature::parse(&blank),
            Err(ConfigError::MissingExpectedSignature)
        );
    }
}

// ============================================================================
// Denylists
// ============================================================================

proptest! {
    /// Denylists never contain blanks or duplicates and keep first-seen order.
    #[test]
    fn denylist_is_trimmed_and_deduplicated(entries in prop::collection::vec("[ ]{0,2}[a-c/]{0,4}[ ]{0,2}", 0..24)) {
        let list = Denylist::new("paths", &entries);

        let mut expected: Vec<String> = Vec::new();
        for e in &entries {
            let t = e.trim();
            if !t.is_empty() && !expected.iter().any(|x| x == t) {
                expected.push(t.to_string());
            }
        }
        let got: Vec<String> = list.iter().map(str::to_string).collect();
        prop_assert_eq!(got, expected);
    }
}
