use crate::ids;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Threat category covered by exactly one indicator per report.
///
/// Declaration order is the order indicators are emitted in.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Root,
    Tamper,
    Emulator,
    Debugger,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Root,
        Category::Tamper,
        Category::Emulator,
        Category::Debugger,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Root => "root",
            Category::Tamper => "tamper",
            Category::Emulator => "emulator",
            Category::Debugger => "debugger",
        }
    }

    pub fn check_id(self) -> &'static str {
        match self {
            Category::Root => ids::CHECK_INTEGRITY_ROOT,
            Category::Tamper => ids::CHECK_INTEGRITY_TAMPER,
            Category::Emulator => ids::CHECK_INTEGRITY_EMULATOR,
            Category::Debugger => ids::CHECK_INTEGRITY_DEBUGGER,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall verdict derived from the four indicators.
///
/// Variants are declared in ascending severity so the derived `Ord` gives
/// `Safe < Medium < High < Critical`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    Safe,
    Medium,
    High,
    Critical,
}

impl ThreatLevel {
    pub const ALL: [ThreatLevel; 4] = [
        ThreatLevel::Safe,
        ThreatLevel::Medium,
        ThreatLevel::High,
        ThreatLevel::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ThreatLevel::Safe => "safe",
            ThreatLevel::Medium => "medium",
            ThreatLevel::High => "high",
            ThreatLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
