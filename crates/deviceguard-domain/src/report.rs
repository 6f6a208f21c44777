use crate::model::Indicator;
use deviceguard_types::{Category, IndicatorRecord, IntegrityData, ThreatLevel};

/// Fold the four indicator booleans into a threat level.
///
/// First matching rule wins:
/// 1. root AND tamper        -> Critical
/// 2. root OR tamper         -> High
/// 3. emulator OR debugger   -> Medium
/// 4. otherwise              -> Safe
pub fn derive_level(root: bool, tamper: bool, emulator: bool, debugger: bool) -> ThreatLevel {
    if root && tamper {
        ThreatLevel::Critical
    } else if root || tamper {
        ThreatLevel::High
    } else if emulator || debugger {
        ThreatLevel::Medium
    } else {
        ThreatLevel::Safe
    }
}

/// Result of one evaluation: one indicator per category plus the derived level.
///
/// Only constructible through [`IntegrityReport::from_indicators`], so the level always agrees
/// with the indicators.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IntegrityReport {
    root: Indicator,
    tamper: Indicator,
    emulator: Indicator,
    debugger: Indicator,
    threat_level: ThreatLevel,
}

impl IntegrityReport {
    pub fn from_indicators(
        root: Indicator,
        tamper: Indicator,
        emulator: Indicator,
        debugger: Indicator,
    ) -> Self {
        debug_assert_eq!(root.category(), Category::Root);
        debug_assert_eq!(tamper.category(), Category::Tamper);
        debug_assert_eq!(emulator.category(), Category::Emulator);
        debug_assert_eq!(debugger.category(), Category::Debugger);

        let threat_level = derive_level(
            root.is_present(),
            tamper.is_present(),
            emulator.is_present(),
            debugger.is_present(),
        );

        Self {
            root,
            tamper,
            emulator,
            debugger,
            threat_level,
        }
    }

    pub fn is_rooted(&self) -> bool {
        self.root.is_present()
    }

    pub fn is_tampered(&self) -> bool {
        self.tamper.is_present()
    }

    pub fn is_emulator(&self) -> bool {
        self.emulator.is_present()
    }

    pub fn is_debugging(&self) -> bool {
        self.debugger.is_present()
    }

    pub fn threat_level(&self) -> ThreatLevel {
        self.threat_level
    }

    pub fn indicator(&self, category: Category) -> &Indicator {
        match category {
            Category::Root => &self.root,
            Category::Tamper => &self.tamper,
            Category::Emulator => &self.emulator,
            Category::Debugger => &self.debugger,
        }
    }

    /// Indicators in category order (root, tamper, emulator, debugger).
    pub fn indicators(&self) -> [&Indicator; 4] {
        [&self.root, &self.tamper, &self.emulator, &self.debugger]
    }

    pub fn to_records(&self) -> Vec<IndicatorRecord> {
        self.indicators()
            .into_iter()
            .map(|indicator| IndicatorRecord {
                category: indicator.category(),
                check_id: indicator.category().check_id().to_string(),
                present: indicator.is_present(),
                code: indicator.evidence().map(|e| e.code.to_string()),
                detail: indicator.evidence().map(|e| e.detail.clone()),
            })
            .collect()
    }

    pub fn to_data(&self, profile: &str) -> IntegrityData {
        IntegrityData {
            is_rooted: self.is_rooted(),
            is_tampered: self.is_tampered(),
            is_emulator: self.is_emulator(),
            is_debugging: self.is_debugging(),
            threat_level: self.threat_level,
            profile: profile.to_string(),
        }
    }
}
