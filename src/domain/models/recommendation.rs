//! Concrete recommendations handed to the presentation layer.

use serde::{Deserialize, Serialize};

use super::catalog::{LearningUnit, UnitKind};
use super::learning_domain::LearningDomain;

/// A concrete unit the learner should do next. Rebuilt on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveRecommendation {
    pub id: String,
    pub kind: UnitKind,
    pub domain: LearningDomain,
    pub priority: f64,
    pub reason: String,
    pub is_exploration: bool,
    pub title: String,
    pub estimated_minutes: u32,
}

impl AdaptiveRecommendation {
    /// Recommend `unit` as-is.
    pub fn for_unit(unit: &LearningUnit, priority: f64, reason: impl Into<String>, is_exploration: bool) -> Self {
        Self {
            id: unit.id.clone(),
            kind: unit.kind,
            domain: unit.domain,
            priority,
            reason: reason.into(),
            is_exploration,
            title: unit.title.clone(),
            estimated_minutes: unit.estimated_minutes,
        }
    }

    /// A remedial pass over an already-completed `unit`, at half its length.
    pub fn review_of(unit: &LearningUnit, priority: f64, reason: impl Into<String>) -> Self {
        Self {
            id: format!("review-{}", unit.id),
            kind: UnitKind::Review,
            domain: unit.domain,
            priority,
            reason: reason.into(),
            is_exploration: false,
            title: format!("Review: {}", unit.title),
            estimated_minutes: unit.estimated_minutes.div_ceil(2),
        }
    }
}
