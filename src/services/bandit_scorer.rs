//! Thompson-sampling domain scorer.
//!
//! Scoring is read-only over a [`BanditState`] snapshot and is re-run from
//! scratch on every request. For each domain:
//!
//! 1. **Thompson sample** from the Beta-Bernoulli posterior
//!    `Beta(successes + 1, failures + 1)`.
//! 2. **Deterministic adjustments** (`ScoreBreakdown`): idle-time bonus,
//!    struggle bonus, cold-start uncertainty bonus and mastery penalty.
//! 3. **Exploration**: with probability `exploration_rate`, extra uniform
//!    noise in `[0, 0.3)` is added so low-ranked domains occasionally surface.
//!
//! Domains are then ranked by final score, highest first.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::cmp::Ordering;

use super::sampling;
use crate::domain::models::{
    BanditRecommendation, BanditState, DomainStats, LearningDomain, RecommendationReason,
};

/// Idle hours after which the long-neglect bonus applies.
pub const LONG_IDLE_HOURS: f64 = 72.0;
/// Idle hours after which the short-neglect bonus applies.
pub const SHORT_IDLE_HOURS: f64 = 24.0;
/// Idle hours after which the reason becomes "refresh".
pub const REFRESH_IDLE_HOURS: f64 = 48.0;
/// Attempts below which a domain gets the cold-start bonus.
pub const COLD_START_ATTEMPTS: u32 = 5;
/// Consecutive successes that trigger the mastery penalty.
pub const MASTERY_STREAK: u32 = 5;
/// Upper bound (exclusive) of exploration noise.
pub const EXPLORATION_NOISE: f64 = 0.3;

/// The deterministic parts of a domain score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub time_bonus: f64,
    pub struggle_bonus: f64,
    pub uncertainty_bonus: f64,
    pub mastery_penalty: f64,
}

impl ScoreBreakdown {
    pub fn for_stats(stats: &DomainStats, now: DateTime<Utc>) -> Self {
        let idle_hours = stats.hours_since_last_attempt(now);

        let time_bonus = if idle_hours > LONG_IDLE_HOURS {
            0.15
        } else if idle_hours > SHORT_IDLE_HOURS {
            0.08
        } else {
            0.0
        };

        let struggle_bonus = if stats.streak_incorrect >= 2 {
            0.25 + 0.05 * f64::from(stats.streak_incorrect)
        } else if stats.is_underperforming() {
            0.15
        } else {
            0.0
        };

        let uncertainty_bonus = if stats.attempts < COLD_START_ATTEMPTS {
            0.2 * (1.0 - f64::from(stats.attempts) / f64::from(COLD_START_ATTEMPTS))
        } else {
            0.0
        };

        let mastery_penalty = if stats.streak_correct >= MASTERY_STREAK { 0.1 } else { 0.0 };

        Self {
            time_bonus,
            struggle_bonus,
            uncertainty_bonus,
            mastery_penalty,
        }
    }

    /// Final score for a given posterior draw, before exploration noise.
    pub fn apply(&self, sampled: f64) -> f64 {
        sampled + self.time_bonus + self.struggle_bonus + self.uncertainty_bonus - self.mastery_penalty
    }
}

/// First matching rule wins.
pub fn select_reason(stats: &DomainStats, now: DateTime<Utc>) -> RecommendationReason {
    if stats.streak_incorrect >= 2 {
        RecommendationReason::Practice
    } else if stats.is_underperforming() {
        RecommendationReason::Foundation
    } else if stats.hours_since_last_attempt(now) > REFRESH_IDLE_HOURS {
        RecommendationReason::Refresh
    } else if stats.attempts < 3 {
        RecommendationReason::Discover
    } else if stats.streak_correct >= 3 {
        RecommendationReason::OnARoll
    } else {
        RecommendationReason::Continue
    }
}

/// How much the posterior can be trusted, in `[0.1, 0.95]`.
pub fn confidence(stats: &DomainStats) -> f64 {
    if stats.attempts == 0 {
        0.1
    } else {
        (0.3 + f64::from(stats.attempts) * 0.1).min(0.95)
    }
}

/// Thompson draw of the believed success probability.
pub fn thompson_sample<R: Rng + ?Sized>(rng: &mut R, stats: &DomainStats) -> f64 {
    let alpha = f64::from(stats.successes) + 1.0;
    let failures = stats.attempts.saturating_sub(stats.successes);
    let beta_param = f64::from(failures) + 1.0;
    sampling::beta(rng, alpha, beta_param)
}

/// Score a single domain.
pub fn score_domain<R: Rng + ?Sized>(
    domain: LearningDomain,
    stats: &DomainStats,
    exploration_rate: f64,
    now: DateTime<Utc>,
    rng: &mut R,
) -> BanditRecommendation {
    let sampled = thompson_sample(rng, stats);
    let mut score = ScoreBreakdown::for_stats(stats, now).apply(sampled);

    let roll: f64 = rng.gen();
    let is_exploration = roll < exploration_rate;
    if is_exploration {
        score += rng.gen_range(0.0..EXPLORATION_NOISE);
    }

    BanditRecommendation {
        domain,
        score,
        reason: select_reason(stats, now),
        is_exploration,
        confidence: confidence(stats),
    }
}

/// Rank every domain not in `exclude`, best first, keeping at most `count`.
pub fn score_domains<R: Rng + ?Sized>(
    state: &BanditState,
    exclude: &[LearningDomain],
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<BanditRecommendation> {
    let mut ranked: Vec<BanditRecommendation> = state
        .domain_stats
        .iter()
        .filter(|(domain, _)| !exclude.contains(domain))
        .map(|(domain, stats)| score_domain(domain, stats, state.exploration_rate, now, rng))
        .collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked.truncate(count);

    tracing::debug!(
        candidates = ranked.len(),
        excluded = exclude.len(),
        top = ?ranked.first().map(|r| r.domain),
        "scored learning domains"
    );

    ranked
}
