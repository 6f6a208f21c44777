use crate::error::ConfigError;
use crate::fingerprint::sha256_hex;
use crate::model::Denylist;
use crate::probe::Signature;
use std::time::Duration;

/// Known root-broker binary locations.
pub const DEFAULT_ROOT_BINARIES: &[&str] = &[
    "/system/app/Superuser.apk",
    "/sbin/su",
    "/system/bin/su",
    "/system/xbin/su",
    "/data/local/xbin/su",
    "/data/local/bin/su",
    "/system/sd/xbin/su",
    "/system/bin/failsafe/su",
    "/data/local/su",
    "/su/bin/su",
];

/// Known root-management application identifiers.
pub const DEFAULT_ROOT_PACKAGES: &[&str] = &[
    "com.noshufou.android.su",
    "com.noshufou.android.su.elite",
    "eu.chainfire.supersu",
    "com.koushikdutta.superuser",
    "com.thirdparty.superuser",
    "com.yellowes.su",
    "com.topjohnwu.magisk",
];

pub const DEFAULT_SHELL_COMMAND: &str = "su";
pub const DEFAULT_SHELL_TIMEOUT: Duration = Duration::from_millis(500);
pub const MAX_SHELL_TIMEOUT: Duration = Duration::from_secs(10);

pub const ROOT_BINARIES_LIST: &str = "root_binaries";
pub const ROOT_PACKAGES_LIST: &str = "root_packages";

/// Inputs of the root detector that are data rather than code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootPolicy {
    pub binaries: Denylist,
    pub packages: Denylist,
    pub shell_command: String,
    pub shell_timeout: Duration,
}

impl Default for RootPolicy {
    fn default() -> Self {
        Self {
            binaries: Denylist::new(ROOT_BINARIES_LIST, DEFAULT_ROOT_BINARIES),
            packages: Denylist::new(ROOT_PACKAGES_LIST, DEFAULT_ROOT_PACKAGES),
            shell_command: DEFAULT_SHELL_COMMAND.to_string(),
            shell_timeout: DEFAULT_SHELL_TIMEOUT,
        }
    }
}

impl RootPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shell_command.trim().is_empty() {
            return Err(ConfigError::EmptyCommand);
        }
        if self.shell_timeout.is_zero() || self.shell_timeout > MAX_SHELL_TIMEOUT {
            return Err(ConfigError::InvalidTimeout {
                got_ms: self.shell_timeout.as_millis() as u64,
                max_ms: MAX_SHELL_TIMEOUT.as_millis() as u64,
            });
        }
        Ok(())
    }
}

/// The trusted build's signing identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExpectedSignature {
    /// Raw signature bytes, compared byte-for-byte.
    Exact(Vec<u8>),
    /// SHA-256 digest of the signature bytes.
    Sha256([u8; 32]),
}

impl ExpectedSignature {
    /// Parse `sha256:<64 hex>`, `hex:<hex>` or bare hex.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ConfigError::MissingExpectedSignature);
        }

        if let Some(digest) = text.strip_prefix("sha256:") {
            let bytes = hex::decode(digest).map_err(|e| {
                ConfigError::InvalidExpectedSignature(format!("sha256 digest is not hex: {e}"))
            })?;
            let digest: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
                ConfigError::InvalidExpectedSignature(format!(
                    "sha256 digest must be 32 bytes, got {}",
                    b.len()
                ))
            })?;
            return Ok(Self::Sha256(digest));
        }

        let raw = text.strip_prefix("hex:").unwrap_or(text);
        let bytes = hex::decode(raw).map_err(|e| {
            ConfigError::InvalidExpectedSignature(format!("signature is not hex: {e}"))
        })?;
        if bytes.is_empty() {
            return Err(ConfigError::InvalidExpectedSignature(
                "signature is empty".to_string(),
            ));
        }
        Ok(Self::Exact(bytes))
    }

    pub fn matches(&self, observed: &Signature) -> bool {
        match self {
            Self::Exact(expected) => expected.as_slice() == observed.as_bytes(),
            Self::Sha256(digest) => sha256_hex(observed.as_bytes()) == hex::encode(digest),
        }
    }
}

/// Everything the evaluator needs besides its providers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluatorConfig {
    pub expected_signature: ExpectedSignature,
    pub root: RootPolicy,
}

impl EvaluatorConfig {
    pub fn new(expected_signature: ExpectedSignature) -> Self {
        Self {
            expected_signature,
            root: RootPolicy::default(),
        }
    }
}
