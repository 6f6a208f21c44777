//! The `check` use case: resolve config, probe the device, evaluate, produce a report.

use anyhow::Context;
use camino::Utf8PathBuf;
use deviceguard_domain::Evaluator;
use deviceguard_host::{LiveOptions, SnapshotProbes};
use deviceguard_settings::{DeviceguardConfigV1, Overrides, ResolvedConfig};
use deviceguard_types::{ReportEnvelope, ThreatLevel};
use std::sync::Arc;
use time::OffsetDateTime;

use crate::report::build_report;

/// Where device state comes from.
#[derive(Clone, Debug)]
pub enum DeviceSource {
    /// A recorded `device.json` snapshot.
    Snapshot(Utf8PathBuf),
    /// The machine this process runs on.
    Live(LiveOptions),
}

/// Input for the check use case.
#[derive(Clone, Debug)]
pub struct CheckInput<'a> {
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// CLI overrides.
    pub overrides: Overrides,
    pub source: DeviceSource,
}

/// Output from the check use case.
#[derive(Clone, Debug)]
pub struct CheckOutput {
    pub report: ReportEnvelope,
    pub resolved_config: ResolvedConfig,
    /// Level derived by this evaluation.
    pub threat_level: ThreatLevel,
}

/// Run the check use case.
///
/// Configuration is resolved before any probing, so a missing expected signature never
/// produces a partial report.
pub fn run_check(input: CheckInput<'_>) -> anyhow::Result<CheckOutput> {
    let started_at = OffsetDateTime::now_utc();

    let cfg = if input.config_text.trim().is_empty() {
        DeviceguardConfigV1::default()
    } else {
        deviceguard_settings::parse_config_toml(input.config_text).context("parse config")?
    };
    let resolved =
        deviceguard_settings::resolve_config(cfg, input.overrides).context("resolve config")?;

    let probes = match &input.source {
        DeviceSource::Snapshot(path) => {
            let snapshot = deviceguard_host::load_snapshot(path)?;
            deviceguard_host::snapshot_probes(Arc::new(SnapshotProbes::new(snapshot)))
        }
        DeviceSource::Live(opts) => deviceguard_host::live_probes(opts),
    };

    let evaluator = Evaluator::new(probes, resolved.evaluator.clone())
        .context("configure evaluator")?;
    let integrity = evaluator.evaluate();

    let finished_at = OffsetDateTime::now_utc();
    let report = build_report(&integrity, &resolved.profile, started_at, finished_at);

    Ok(CheckOutput {
        report,
        threat_level: integrity.threat_level(),
        resolved_config: resolved,
    })
}

/// Map a threat level to an exit code: 0 below `fail_on`, 2 at or above it.
pub fn threat_exit_code(level: ThreatLevel, fail_on: ThreatLevel) -> i32 {
    if level >= fail_on { 2 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;
    use deviceguard_domain::ConfigError;

    const CONFIG: &str = "expected_signature = \"cafe\"\n";

    fn snapshot_dir(json: &str) -> (tempfile::TempDir, Utf8PathBuf) {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let path = Utf8Path::from_path(tmp.path())
            .expect("utf8 path")
            .join("device.json");
        std::fs::write(&path, json).expect("write snapshot");
        (tmp, path)
    }

    #[test]
    fn clean_snapshot_is_safe() {
        let (_tmp, path) = snapshot_dir(r#"{"signature": {"hex": "cafe"}}"#);
        let output = run_check(CheckInput {
            config_text: CONFIG,
            overrides: Overrides::default(),
            source: DeviceSource::Snapshot(path),
        })
        .expect("run_check");

        assert_eq!(output.threat_level, ThreatLevel::Safe);
        assert_eq!(output.report.threat_level, Some(ThreatLevel::Safe));
        assert_eq!(output.report.indicators.len(), 4);
        assert_eq!(output.resolved_config.profile, "standard");
        assert!(output.report.error.is_none());
    }

    #[test]
    fn missing_expected_signature_fails_before_probing() {
        let output = run_check(CheckInput {
            config_text: "",
            overrides: Overrides::default(),
            source: DeviceSource::Snapshot("/nonexistent/device.json".into()),
        });
        let err = output.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::MissingExpectedSignature)
        );
    }

    #[test]
    fn expected_signature_can_come_from_overrides() {
        let (_tmp, path) = snapshot_dir(r#"{"signature": {"hex": "beef"}}"#);
        let output = run_check(CheckInput {
            config_text: "",
            overrides: Overrides {
                expected_signature: Some("beef".to_string()),
                ..Overrides::default()
            },
            source: DeviceSource::Snapshot(path),
        })
        .expect("run_check");
        assert_eq!(output.threat_level, ThreatLevel::Safe);
    }

    #[test]
    fn unreadable_snapshot_is_an_error() {
        let result = run_check(CheckInput {
            config_text: CONFIG,
            overrides: Overrides::default(),
            source: DeviceSource::Snapshot("/nonexistent/device.json".into()),
        });
        assert!(result.is_err());
    }

    #[test]
    fn exit_codes_follow_fail_on() {
        assert_eq!(threat_exit_code(ThreatLevel::Safe, ThreatLevel::High), 0);
        assert_eq!(threat_exit_code(ThreatLevel::Medium, ThreatLevel::High), 0);
        assert_eq!(threat_exit_code(ThreatLevel::High, ThreatLevel::High), 2);
        assert_eq!(threat_exit_code(ThreatLevel::Critical, ThreatLevel::High), 2);
        assert_eq!(threat_exit_code(ThreatLevel::Medium, ThreatLevel::Medium), 2);
        assert_eq!(threat_exit_code(ThreatLevel::High, ThreatLevel::Critical), 0);
    }
}
