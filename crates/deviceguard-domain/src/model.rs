use deviceguard_types::Category;
use std::collections::BTreeSet;

/// What made an indicator fire.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Evidence {
    /// Stable code from `deviceguard_types::ids`.
    pub code: &'static str,
    pub detail: String,
}

impl Evidence {
    pub fn new(code: &'static str, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }
}

/// A single boolean signal for one threat category.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Indicator {
    category: Category,
    evidence: Option<Evidence>,
}

impl Indicator {
    pub fn absent(category: Category) -> Self {
        Self {
            category,
            evidence: None,
        }
    }

    pub fn present(category: Category, evidence: Evidence) -> Self {
        Self {
            category,
            evidence: Some(evidence),
        }
    }

    pub(crate) fn from_evidence(category: Category, evidence: Option<Evidence>) -> Self {
        Self { category, evidence }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn is_present(&self) -> bool {
        self.evidence.is_some()
    }

    pub fn evidence(&self) -> Option<&Evidence> {
        self.evidence.as_ref()
    }
}

/// Named, ordered, duplicate-free list of strings (paths or package identifiers).
///
/// Entries are trimmed; blank entries are dropped. The first occurrence of a duplicate keeps
/// its position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Denylist {
    name: String,
    entries: Vec<String>,
}

impl Denylist {
    pub fn new<I, S>(name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self {
            name: name.into(),
            entries: Vec::new(),
        };
        list.extend(entries);
        list
    }

    pub fn extend<I, S>(&mut self, entries: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: BTreeSet<String> = self.entries.iter().cloned().collect();
        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            if seen.insert(entry.to_string()) {
                self.entries.push(entry.to_string());
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries.iter().any(|e| e == entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
