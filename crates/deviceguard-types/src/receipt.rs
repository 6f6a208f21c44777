use crate::{Category, ThreatLevel};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Stable schema identifier for deviceguard reports.
pub const SCHEMA_REPORT_V1: &str = "deviceguard.report.v1";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunMeta {
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "Option<String>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// One indicator as it appears on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IndicatorRecord {
    pub category: Category,
    pub check_id: String,
    pub present: bool,

    /// Sub-check that produced the evidence (only set when `present`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Human-readable evidence detail, e.g. the matched path or package identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// The integrity verdict payload handed to presentation layers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IntegrityData {
    pub is_rooted: bool,
    pub is_tampered: bool,
    pub is_emulator: bool,
    pub is_debugging: bool,
    pub threat_level: ThreatLevel,
    pub profile: String,
}

/// Tool failure (bad configuration, unreadable device snapshot, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RuntimeError {
    pub check_id: String,
    pub code: String,
    pub message: String,
}

/// Report envelope.
///
/// A successful run carries `threat_level`, four `indicators` and `data`. A failed run carries
/// only `error`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportEnvelope {
    /// Versioned schema identifier for the envelope shape.
    pub schema: String,
    pub tool: ToolMeta,
    pub run: RunMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat_level: Option<ThreatLevel>,
    #[serde(default)]
    pub indicators: Vec<IndicatorRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<IntegrityData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RuntimeError>,
}
