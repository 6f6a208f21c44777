use crate::model::{Evidence, Indicator};
use crate::probe::{BuildField, BuildMetadataProbe};
use deviceguard_types::{Category, ids};
use std::fmt;

/// Case-sensitive test of one build field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldMatch {
    Prefix(BuildField, &'static str),
    Contains(BuildField, &'static str),
}

impl FieldMatch {
    fn field(self) -> BuildField {
        match self {
            FieldMatch::Prefix(field, _) | FieldMatch::Contains(field, _) => field,
        }
    }

    fn test(self, value: &str) -> bool {
        match self {
            FieldMatch::Prefix(_, needle) => value.starts_with(needle),
            FieldMatch::Contains(_, needle) => value.contains(needle),
        }
    }

    fn eval(self, meta: &dyn BuildMetadataProbe) -> bool {
        match meta.read(self.field()) {
            Ok(Some(value)) => self.test(&value),
            Ok(None) => false,
            Err(err) => {
                tracing::debug!(field = %self.field(), error = %err, "build field unreadable");
                false
            }
        }
    }
}

impl fmt::Display for FieldMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldMatch::Prefix(field, needle) => write!(f, "{field} starts with \"{needle}\""),
            FieldMatch::Contains(field, needle) => write!(f, "{field} contains \"{needle}\""),
        }
    }
}

/// One entry of the emulator signature table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmulatorRule {
    Single(FieldMatch),
    /// Matches only when every part matches. Each part alone is too weak a signal.
    AllOf(&'static [FieldMatch]),
}

impl EmulatorRule {
    pub fn matches(&self, meta: &dyn BuildMetadataProbe) -> bool {
        match self {
            EmulatorRule::Single(m) => m.eval(meta),
            EmulatorRule::AllOf(parts) => !parts.is_empty() && parts.iter().all(|m| m.eval(meta)),
        }
    }
}

impl fmt::Display for EmulatorRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmulatorRule::Single(m) => fmt::Display::fmt(m, f),
            EmulatorRule::AllOf(parts) => {
                for (i, m) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" and ")?;
                    }
                    fmt::Display::fmt(m, f)?;
                }
                Ok(())
            }
        }
    }
}

/// Known emulator and virtualization build signatures, evaluated in order.
pub const EMULATOR_RULES: &[EmulatorRule] = &[
    EmulatorRule::Single(FieldMatch::Prefix(BuildField::Fingerprint, "generic")),
    EmulatorRule::Single(FieldMatch::Prefix(BuildField::Fingerprint, "unknown")),
    EmulatorRule::Single(FieldMatch::Contains(BuildField::Model, "google_sdk")),
    EmulatorRule::Single(FieldMatch::Contains(BuildField::Model, "Emulator")),
    EmulatorRule::Single(FieldMatch::Contains(BuildField::Model, "Android SDK")),
    EmulatorRule::Single(FieldMatch::Contains(BuildField::Manufacturer, "Genymotion")),
    EmulatorRule::AllOf(&[
        FieldMatch::Prefix(BuildField::Brand, "generic"),
        FieldMatch::Prefix(BuildField::Device, "generic"),
    ]),
];

pub fn detect_emulator(meta: &dyn BuildMetadataProbe) -> Indicator {
    let evidence = EMULATOR_RULES
        .iter()
        .find(|rule| rule.matches(meta))
        .map(|rule| Evidence::new(ids::CODE_EMULATOR_BUILD_SIGNATURE, rule.to_string()));

    if let Some(e) = &evidence {
        tracing::debug!(rule = %e.detail, "emulator signature matched");
    }
    Indicator::from_evidence(Category::Emulator, evidence)
}
