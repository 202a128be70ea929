//! Read-only lesson catalog and completion ledger supplied by the caller.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use super::learning_domain::LearningDomain;

/// Kind of learnable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Lesson,
    Quiz,
    Challenge,
    /// Only produced by the assembler for remedial entries.
    Review,
}

impl UnitKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lesson => "lesson",
            Self::Quiz => "quiz",
            Self::Challenge => "challenge",
            Self::Review => "review",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One learnable unit in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningUnit {
    pub id: String,
    pub title: String,
    pub domain: LearningDomain,
    pub kind: UnitKind,
    pub estimated_minutes: u32,
}

impl LearningUnit {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        domain: LearningDomain,
        kind: UnitKind,
        estimated_minutes: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            domain,
            kind,
            estimated_minutes,
        }
    }
}

/// Ordered collection of learnable units.
///
/// Order within a domain is the suggested study order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub units: Vec<LearningUnit>,
}

impl Catalog {
    pub fn new(units: Vec<LearningUnit>) -> Self {
        Self { units }
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Units of `domain`, in catalog order.
    pub fn units_in(&self, domain: LearningDomain) -> impl Iterator<Item = &LearningUnit> {
        self.units.iter().filter(move |u| u.domain == domain)
    }

    pub fn find(&self, unit_id: &str) -> Option<&LearningUnit> {
        self.units.iter().find(|u| u.id == unit_id)
    }

    /// Parse a catalog from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

/// Answers whether a unit has been finished.
pub trait CompletionLedger {
    fn is_completed(&self, unit_id: &str) -> bool;
}

impl CompletionLedger for HashSet<String> {
    fn is_completed(&self, unit_id: &str) -> bool {
        self.contains(unit_id)
    }
}

impl CompletionLedger for BTreeSet<String> {
    fn is_completed(&self, unit_id: &str) -> bool {
        self.contains(unit_id)
    }
}

impl CompletionLedger for HashMap<String, bool> {
    fn is_completed(&self, unit_id: &str) -> bool {
        self.get(unit_id).copied().unwrap_or(false)
    }
}

impl<L: CompletionLedger + ?Sized> CompletionLedger for &L {
    fn is_completed(&self, unit_id: &str) -> bool {
        (**self).is_completed(unit_id)
    }
}
