use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `deviceguard.toml` schema v1.
///
/// Every key is optional here; `expected_signature` is enforced at resolution time because it
/// may also arrive as a command-line override.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DeviceguardConfigV1 {
    /// Optional schema string for tooling (`deviceguard.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// `standard` (default), `strict` or `lenient`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Trusted signing identity: `sha256:<digest>`, `hex:<bytes>` or bare hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_signature: Option<String>,

    /// Lowest threat level that fails the check: `safe`, `medium`, `high` or `critical`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on: Option<String>,

    #[serde(default)]
    pub root: RootConfig,
}

/// `[root]` table: data inputs of the root detector.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RootConfig {
    /// Replaces the built-in binary path list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binaries: Option<Vec<String>>,

    /// Appended to the binary path list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_binaries: Vec<String>,

    /// Replaces the built-in root-manager package list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<String>>,

    /// Appended to the package list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_packages: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_timeout_ms: Option<u64>,
}
