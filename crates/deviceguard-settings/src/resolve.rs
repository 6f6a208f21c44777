use crate::{model::DeviceguardConfigV1, presets};
use anyhow::Context;
use deviceguard_domain::ConfigError;
use deviceguard_domain::model::Denylist;
use deviceguard_domain::policy::{
    EvaluatorConfig, ExpectedSignature, ROOT_BINARIES_LIST, ROOT_PACKAGES_LIST,
};
use deviceguard_types::ThreatLevel;
use std::time::Duration;

/// Values supplied on the command line; each one wins over the file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub expected_signature: Option<String>,
    pub fail_on: Option<String>,
    pub shell_timeout_ms: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub profile: String,
    pub fail_on: ThreatLevel,
    pub evaluator: EvaluatorConfig,
}

pub fn resolve_config(
    cfg: DeviceguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let profile = overrides
        .profile
        .or(cfg.profile)
        .unwrap_or_else(|| presets::DEFAULT_PROFILE.to_string());

    let preset = presets::preset(&profile).with_context(|| {
        format!(
            "unknown profile: {profile} (expected {})",
            presets::PROFILES.join("|")
        )
    })?;

    let mut fail_on = preset.fail_on;
    if let Some(v) = overrides.fail_on.or(cfg.fail_on) {
        fail_on = parse_fail_on(&v)?;
    }

    let mut root = preset.root;
    let rc = cfg.root;
    if let Some(binaries) = rc.binaries {
        root.binaries = Denylist::new(ROOT_BINARIES_LIST, binaries);
    }
    root.binaries.extend(rc.extra_binaries);
    if let Some(packages) = rc.packages {
        root.packages = Denylist::new(ROOT_PACKAGES_LIST, packages);
    }
    root.packages.extend(rc.extra_packages);
    if let Some(command) = rc.shell_command {
        root.shell_command = command.trim().to_string();
    }
    if let Some(ms) = overrides.shell_timeout_ms.or(rc.shell_timeout_ms) {
        root.shell_timeout = Duration::from_millis(ms);
    }
    root.validate().context("invalid [root] settings")?;

    let expected = overrides
        .expected_signature
        .or(cfg.expected_signature)
        .ok_or(ConfigError::MissingExpectedSignature)?;
    let expected_signature = ExpectedSignature::parse(&expected)?;

    Ok(ResolvedConfig {
        profile: preset.profile.to_string(),
        fail_on,
        evaluator: EvaluatorConfig {
            expected_signature,
            root,
        },
    })
}

fn parse_fail_on(v: &str) -> anyhow::Result<ThreatLevel> {
    ThreatLevel::ALL
        .into_iter()
        .find(|level| level.as_str() == v)
        .with_context(|| format!("unknown fail_on: {v} (expected safe|medium|high|critical)"))
}
