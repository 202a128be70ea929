//! Bandit state and the ranked output of the domain scorer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::learning_domain::{DomainMap, LearningDomain};
use super::performance::DomainStats;

/// Exploration rate for a freshly created learner.
pub const INITIAL_EXPLORATION_RATE: f64 = 0.3;

/// Lower bound of the exploration schedule.
pub const MIN_EXPLORATION_RATE: f64 = 0.1;

/// Upper bound of the exploration schedule.
pub const MAX_EXPLORATION_RATE: f64 = 0.4;

/// Exploration rate given the number of interactions seen so far.
///
/// | interactions | rate                          |
/// |--------------|-------------------------------|
/// | `< 10`       | 0.4                           |
/// | `< 30`       | 0.25                          |
/// | otherwise    | `max(0.1, 0.3 - n * 0.002)`   |
pub fn exploration_rate_for(total_interactions: u64) -> f64 {
    match total_interactions {
        0..=9 => MAX_EXPLORATION_RATE,
        10..=29 => 0.25,
        n => (0.3 - n as f64 * 0.002).max(MIN_EXPLORATION_RATE),
    }
}

/// Everything the scorer knows about one learner. The unit of persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BanditState {
    #[serde(default)]
    pub domain_stats: DomainMap<DomainStats>,
    #[serde(default = "default_exploration_rate")]
    pub exploration_rate: f64,
    #[serde(default)]
    pub total_interactions: u64,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

fn default_exploration_rate() -> f64 {
    INITIAL_EXPLORATION_RATE
}

impl BanditState {
    /// All-zero statistics with the initial exploration rate.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            domain_stats: DomainMap::default(),
            exploration_rate: INITIAL_EXPLORATION_RATE,
            total_interactions: 0,
            last_updated: now,
        }
    }

    pub fn stats(&self, domain: LearningDomain) -> &DomainStats {
        &self.domain_stats[domain]
    }

    /// Apply one learner outcome.
    ///
    /// The exploration rate is derived from the interaction count *before*
    /// this outcome is counted.
    pub fn apply_outcome(
        &mut self,
        domain: LearningDomain,
        score: f64,
        passed: bool,
        time_spent_seconds: Option<f64>,
        now: DateTime<Utc>,
    ) {
        self.domain_stats[domain].record(score, passed, time_spent_seconds, now);
        self.exploration_rate = exploration_rate_for(self.total_interactions);
        self.total_interactions = self.total_interactions.saturating_add(1);
        self.last_updated = now;
    }

    /// Restore invariants on state decoded from storage.
    pub fn sanitize(&mut self) {
        for (_, stats) in self.domain_stats.iter_mut() {
            stats.sanitize();
        }
        self.exploration_rate = if self.exploration_rate.is_finite() {
            self.exploration_rate.clamp(MIN_EXPLORATION_RATE, MAX_EXPLORATION_RATE)
        } else {
            INITIAL_EXPLORATION_RATE
        };
    }
}

impl Default for BanditState {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

/// Why a domain was surfaced, chosen by the first matching rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationReason {
    /// Two or more consecutive failures.
    Practice,
    /// Low recent performance with at least three attempts.
    Foundation,
    /// Idle for more than 48 hours.
    Refresh,
    /// Fewer than three attempts.
    Discover,
    /// Three or more consecutive successes.
    OnARoll,
    Continue,
}

impl RecommendationReason {
    pub const fn message(self) -> &'static str {
        match self {
            Self::Practice => "Let's practice this area a bit more",
            Self::Foundation => "Building a stronger foundation here will help",
            Self::Refresh => "Time for a quick refresh",
            Self::Discover => "Discover something new",
            Self::OnARoll => "You're on a roll - keep going!",
            Self::Continue => "Continue your learning journey",
        }
    }
}

/// One ranked domain produced by the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanditRecommendation {
    pub domain: LearningDomain,
    /// Unbounded; higher means more worth doing now.
    pub score: f64,
    pub reason: RecommendationReason,
    pub is_exploration: bool,
    /// In `[0, 1]`.
    pub confidence: f64,
}
