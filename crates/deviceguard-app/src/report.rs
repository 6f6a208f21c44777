use anyhow::Context;
use deviceguard_domain::IntegrityReport;
use deviceguard_render::{RenderableError, RenderableIndicator, RenderableReport};
use deviceguard_types::{
    ReportEnvelope, RunMeta, RuntimeError, SCHEMA_REPORT_V1, ToolMeta, ids,
};
use time::OffsetDateTime;

fn tool_meta() -> ToolMeta {
    ToolMeta {
        name: "deviceguard".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

fn run_meta(started_at: OffsetDateTime, finished_at: OffsetDateTime) -> RunMeta {
    let duration_ms = (finished_at - started_at).whole_milliseconds().max(0) as u64;
    RunMeta {
        started_at,
        ended_at: Some(finished_at),
        duration_ms: Some(duration_ms),
    }
}

/// Wrap an evaluation in the versioned report envelope.
pub fn build_report(
    report: &IntegrityReport,
    profile: &str,
    started_at: OffsetDateTime,
    finished_at: OffsetDateTime,
) -> ReportEnvelope {
    ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        run: run_meta(started_at, finished_at),
        threat_level: Some(report.threat_level()),
        indicators: report.to_records(),
        data: Some(report.to_data(profile)),
        error: None,
    }
}

/// Envelope for a run that could not evaluate. Carries no level and no indicators.
pub fn runtime_error_report(message: &str, started_at: OffsetDateTime) -> ReportEnvelope {
    ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        run: run_meta(started_at, OffsetDateTime::now_utc()),
        threat_level: None,
        indicators: Vec::new(),
        data: None,
        error: Some(RuntimeError {
            check_id: ids::CHECK_TOOL_RUNTIME.to_string(),
            code: ids::CODE_RUNTIME_ERROR.to_string(),
            message: message.to_string(),
        }),
    }
}

pub fn parse_report_json(text: &str) -> anyhow::Result<ReportEnvelope> {
    let report: ReportEnvelope = serde_json::from_str(text).context("parse report json")?;
    if report.schema != SCHEMA_REPORT_V1 {
        anyhow::bail!(
            "unknown report schema: {} (expected {SCHEMA_REPORT_V1})",
            report.schema
        );
    }
    Ok(report)
}

pub fn serialize_report(report: &ReportEnvelope) -> anyhow::Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(report).context("serialize report")?;
    bytes.push(b'\n');
    Ok(bytes)
}

pub fn to_renderable(report: &ReportEnvelope) -> RenderableReport {
    RenderableReport {
        threat_level: report.threat_level,
        profile: report.data.as_ref().map(|d| d.profile.clone()),
        indicators: report
            .indicators
            .iter()
            .map(|r| RenderableIndicator {
                category: r.category,
                present: r.present,
                code: r.code.clone(),
                detail: r.detail.clone(),
            })
            .collect(),
        error: report.error.as_ref().map(|e| RenderableError {
            code: e.code.clone(),
            message: e.message.clone(),
        }),
    }
}
