use deviceguard_domain::policy::RootPolicy;
use deviceguard_types::ThreatLevel;

pub const DEFAULT_PROFILE: &str = "standard";

/// Known profile names, default first.
pub const PROFILES: &[&str] = &["standard", "strict", "lenient"];

/// What a profile decides before file values and overrides apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preset {
    pub profile: &'static str,
    pub fail_on: ThreatLevel,
    pub root: RootPolicy,
}

/// Preset profiles differ only in where the exit code turns non-zero.
///
/// All of them share the built-in denylists.
pub fn preset(profile: &str) -> Option<Preset> {
    let (profile, fail_on) = match profile {
        "standard" => ("standard", ThreatLevel::High),
        "strict" => ("strict", ThreatLevel::Medium),
        "lenient" => ("lenient", ThreatLevel::Critical),
        _ => return None,
    };
    Some(Preset {
        profile,
        fail_on,
        root: RootPolicy::default(),
    })
}
