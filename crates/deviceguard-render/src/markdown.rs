use crate::RenderableReport;
use deviceguard_types::ThreatLevel;

pub fn render_markdown(report: &RenderableReport) -> String {
    let mut out = String::new();

    out.push_str("# Device integrity report\n\n");

    if let Some(err) = &report.error {
        out.push_str("- Threat level: **UNKNOWN**\n\n");
        out.push_str(&format!(
            "> Evaluation failed (`{}`): {}\n",
            err.code, err.message
        ));
        return out;
    }

    let level = report.threat_level.map_or("UNKNOWN", level_label);
    out.push_str(&format!("- Threat level: **{level}**\n"));
    if let Some(profile) = &report.profile {
        out.push_str(&format!("- Profile: `{profile}`\n"));
    }
    out.push('\n');

    if report.indicators.is_empty() {
        out.push_str("No indicators.\n");
        return out;
    }

    out.push_str("| Check | Present | Evidence |\n");
    out.push_str("|---|---|---|\n");
    for ind in &report.indicators {
        let present = if ind.present { "yes" } else { "no" };
        let evidence = match (&ind.code, &ind.detail) {
            (Some(code), Some(detail)) => format!("`{code}`: {}", escape_cell(detail)),
            (Some(code), None) => format!("`{code}`"),
            _ => String::new(),
        };
        out.push_str(&format!(
            "| `{}` | {} | {} |\n",
            ind.category.check_id(),
            present,
            evidence
        ));
    }

    out
}

fn level_label(level: ThreatLevel) -> &'static str {
    match level {
        ThreatLevel::Safe => "SAFE",
        ThreatLevel::Medium => "MEDIUM",
        ThreatLevel::High => "HIGH",
        ThreatLevel::Critical => "CRITICAL",
    }
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}
