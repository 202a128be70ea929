//! Per-domain running statistics and the metrics derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::learning_domain::LearningDomain;

/// Length of the sliding window of recent scores.
pub const RECENT_WINDOW: usize = 10;

/// Default recency weight for [`decayed_score`].
pub const DEFAULT_DECAY: f64 = 0.8;

/// Decayed score below which a domain with enough attempts is struggling.
pub const STRUGGLE_THRESHOLD: f64 = 0.5;

/// Attempts required before a low decayed score counts as struggling.
pub const STRUGGLE_MIN_ATTEMPTS: u32 = 3;

/// Consecutive failures that flag a domain for attention.
pub const FAILURE_STREAK_THRESHOLD: u32 = 2;

/// Running statistics for one learning domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct DomainStats {
    pub attempts: u32,
    /// Never exceeds `attempts`.
    pub successes: u32,
    /// Sum of every per-attempt score in `[0, 1]`.
    pub total_score: f64,
    pub last_score: f64,
    /// `None` until the first attempt.
    pub last_attempt_time: Option<DateTime<Utc>>,
    /// Oldest first, at most [`RECENT_WINDOW`] entries.
    pub recent_scores: Vec<f64>,
    pub streak_correct: u32,
    pub streak_incorrect: u32,
    /// Accumulated time on task, for reporting only.
    pub total_time_seconds: f64,
}

impl DomainStats {
    /// Fold one outcome into the running statistics.
    ///
    /// Never fails: `NaN` scores count as 0, out-of-range scores are clamped,
    /// and unusable durations are dropped.
    pub fn record(&mut self, score: f64, passed: bool, time_spent_seconds: Option<f64>, now: DateTime<Utc>) {
        let score = sanitize_score(score);

        self.attempts = self.attempts.saturating_add(1);
        if passed {
            self.successes = self.successes.saturating_add(1);
        }
        self.total_score += score;
        self.last_score = score;
        self.last_attempt_time = Some(now);

        self.recent_scores.push(score);
        if self.recent_scores.len() > RECENT_WINDOW {
            let overflow = self.recent_scores.len() - RECENT_WINDOW;
            self.recent_scores.drain(..overflow);
        }

        if passed {
            self.streak_correct = self.streak_correct.saturating_add(1);
            self.streak_incorrect = 0;
        } else {
            self.streak_incorrect = self.streak_incorrect.saturating_add(1);
            self.streak_correct = 0;
        }

        if let Some(seconds) = time_spent_seconds.filter(|s| s.is_finite() && *s >= 0.0) {
            self.total_time_seconds += seconds;
        }
    }

    /// Restore invariants on state that came from outside the process.
    pub fn sanitize(&mut self) {
        self.successes = self.successes.min(self.attempts);
        if !self.total_score.is_finite() || self.total_score < 0.0 {
            self.total_score = 0.0;
        }
        self.last_score = sanitize_score(self.last_score);
        for s in &mut self.recent_scores {
            *s = sanitize_score(*s);
        }
        if self.recent_scores.len() > RECENT_WINDOW {
            let overflow = self.recent_scores.len() - RECENT_WINDOW;
            self.recent_scores.drain(..overflow);
        }
        if self.streak_correct > 0 && self.streak_incorrect > 0 {
            // Trust the side consistent with the last recorded score.
            if self.last_score >= STRUGGLE_THRESHOLD {
                self.streak_incorrect = 0;
            } else {
                self.streak_correct = 0;
            }
        } else if self.attempts > 0 && self.streak_correct == 0 && self.streak_incorrect == 0 {
            // Every recorded attempt extends exactly one streak.
            if self.last_score >= STRUGGLE_THRESHOLD {
                self.streak_correct = 1;
            } else {
                self.streak_incorrect = 1;
            }
        }
        if !self.total_time_seconds.is_finite() || self.total_time_seconds < 0.0 {
            self.total_time_seconds = 0.0;
        }
    }

    pub fn decayed_score(&self) -> f64 {
        decayed_score(&self.recent_scores, DEFAULT_DECAY)
    }

    /// Hours since the last attempt, `+inf` if never attempted.
    pub fn hours_since_last_attempt(&self, now: DateTime<Utc>) -> f64 {
        match self.last_attempt_time {
            None => f64::INFINITY,
            Some(at) => (now - at).num_milliseconds().max(0) as f64 / 3_600_000.0,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            f64::from(self.successes) / f64::from(self.attempts)
        }
    }

    pub fn average_score(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.total_score / f64::from(self.attempts)
        }
    }

    /// Whether the learner is struggling in this domain.
    pub fn needs_attention(&self) -> bool {
        self.streak_incorrect >= FAILURE_STREAK_THRESHOLD || self.is_underperforming()
    }

    /// Low recent performance with enough attempts to trust it.
    pub fn is_underperforming(&self) -> bool {
        self.decayed_score() < STRUGGLE_THRESHOLD && self.attempts >= STRUGGLE_MIN_ATTEMPTS
    }
}

/// Clamp a score into `[0, 1]`, mapping `NaN` to 0.
pub fn sanitize_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Exponentially weighted mean of `scores`, newest weighted highest.
///
/// Entry `i` of `n` gets weight `decay^(n-1-i)`. Returns the neutral prior 0.5
/// for an empty slice.
pub fn decayed_score(scores: &[f64], decay: f64) -> f64 {
    if scores.is_empty() {
        return 0.5;
    }

    let n = scores.len();
    let (weighted, total_weight) = scores.iter().enumerate().fold((0.0, 0.0), |(ws, tw), (i, s)| {
        let exponent = i32::try_from(n - 1 - i).unwrap_or(i32::MAX);
        let w = decay.powi(exponent);
        (ws + s * w, tw + w)
    });

    if total_weight > 0.0 {
        weighted / total_weight
    } else {
        0.5
    }
}

/// Read-only performance summary for one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainPerformance {
    pub domain: LearningDomain,
    pub total_attempts: u32,
    pub successes: u32,
    pub success_rate: f64,
    pub average_score: f64,
    pub decayed_score: f64,
    pub last_score: f64,
    pub streak_correct: u32,
    pub streak_incorrect: u32,
    /// `None` when the domain has never been attempted.
    pub hours_since_last_attempt: Option<f64>,
    pub total_time_seconds: f64,
    pub needs_attention: bool,
}

impl DomainPerformance {
    pub fn from_stats(domain: LearningDomain, stats: &DomainStats, now: DateTime<Utc>) -> Self {
        let hours = stats.hours_since_last_attempt(now);
        Self {
            domain,
            total_attempts: stats.attempts,
            successes: stats.successes,
            success_rate: stats.success_rate(),
            average_score: stats.average_score(),
            decayed_score: stats.decayed_score(),
            last_score: stats.last_score,
            streak_correct: stats.streak_correct,
            streak_incorrect: stats.streak_incorrect,
            hours_since_last_attempt: hours.is_finite().then_some(hours),
            total_time_seconds: stats.total_time_seconds,
            needs_attention: stats.needs_attention(),
        }
    }
}
