use deviceguard_types::{Category, ThreatLevel};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableIndicator {
    pub category: Category,
    pub present: bool,
    pub code: Option<String>,
    pub detail: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableError {
    pub code: String,
    pub message: String,
}

/// Renderer input, decoupled from the report envelope's wire shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableReport {
    pub threat_level: Option<ThreatLevel>,
    pub profile: Option<String>,
    pub indicators: Vec<RenderableIndicator>,
    pub error: Option<RenderableError>,
}
