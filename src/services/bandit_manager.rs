//! Stateful owner of a learner's [`BanditState`].
//!
//! The in-memory state is the source of truth. Every mutation runs under the
//! write lock, so concurrent `record_outcome` calls are applied one after
//! another against the latest committed snapshot. After each mutation a save
//! is spawned in the background; failures are logged and never roll back the
//! in-memory change.
//!
//! Background saves carry the version of the snapshot they write and pass
//! through a persistence gate, so a slow save of an older snapshot can never
//! overwrite a newer one.

use chrono::Utc;
use rand::Rng;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::bandit_scorer;
use crate::domain::errors::DomainResult;
use crate::domain::models::{
    BanditRecommendation, BanditState, DomainPerformance, DomainStats, LearningDomain,
};
use crate::domain::ports::BanditStateRepository;

struct Inner {
    state: BanditState,
    version: u64,
}

/// Holds one learner's bandit state and persists it after every change.
#[derive(Clone)]
pub struct BanditStateManager {
    learner_id: Arc<str>,
    repository: Arc<dyn BanditStateRepository>,
    inner: Arc<RwLock<Inner>>,
    /// Highest snapshot version written to the repository.
    persisted_version: Arc<Mutex<u64>>,
    default_count: usize,
}

impl BanditStateManager {
    /// Load the learner's state, falling back to defaults on absent or bad data.
    ///
    /// Never fails: repository errors and undecodable blobs are logged and
    /// replaced by a fresh state.
    pub async fn load(
        repository: Arc<dyn BanditStateRepository>,
        learner_id: impl Into<String>,
        default_count: usize,
    ) -> Self {
        let learner_id: String = learner_id.into();

        let state = match repository.load(&learner_id).await {
            Ok(Some(blob)) => decode_state(&blob).unwrap_or_else(|| {
                tracing::warn!(learner_id = %learner_id, "stored bandit state unreadable, starting fresh");
                BanditState::default()
            }),
            Ok(None) => {
                tracing::info!(learner_id = %learner_id, "no stored bandit state, starting fresh");
                BanditState::default()
            }
            Err(err) => {
                tracing::warn!(learner_id = %learner_id, error = %err, "failed to load bandit state, starting fresh");
                BanditState::default()
            }
        };

        tracing::debug!(
            learner_id = %learner_id,
            total_interactions = state.total_interactions,
            exploration_rate = state.exploration_rate,
            "bandit state loaded"
        );

        Self::with_state(repository, learner_id, state, default_count)
    }

    /// Wrap an existing state without touching the repository.
    pub fn with_state(
        repository: Arc<dyn BanditStateRepository>,
        learner_id: impl Into<String>,
        state: BanditState,
        default_count: usize,
    ) -> Self {
        let learner_id: String = learner_id.into();
        Self {
            learner_id: Arc::from(learner_id),
            repository,
            inner: Arc::new(RwLock::new(Inner { state, version: 0 })),
            persisted_version: Arc::new(Mutex::new(0)),
            default_count,
        }
    }

    pub fn learner_id(&self) -> &str {
        &self.learner_id
    }

    /// Number of ranked domains returned when callers pass no count.
    pub fn default_count(&self) -> usize {
        self.default_count
    }

    /// Fold a learner outcome into the state and schedule a save.
    ///
    /// Scores are clamped into `[0, 1]`; unusable durations are ignored.
    pub async fn record_outcome(
        &self,
        domain: LearningDomain,
        score: f64,
        passed: bool,
        time_spent_seconds: Option<f64>,
    ) -> DomainPerformance {
        let now = Utc::now();
        let (snapshot, version) = {
            let mut inner = self.inner.write().await;
            inner.state.apply_outcome(domain, score, passed, time_spent_seconds, now);
            inner.version += 1;
            (inner.state.clone(), inner.version)
        };

        tracing::info!(
            domain = %domain,
            score,
            passed,
            total_interactions = snapshot.total_interactions,
            exploration_rate = snapshot.exploration_rate,
            "recorded learner outcome"
        );

        let performance = DomainPerformance::from_stats(domain, snapshot.stats(domain), now);
        self.spawn_persist(snapshot, version);
        performance
    }

    /// Ranked domains, best first, using the thread-local generator.
    pub async fn get_recommendations(
        &self,
        count: Option<usize>,
        exclude: &[LearningDomain],
    ) -> Vec<BanditRecommendation> {
        let snapshot = self.snapshot().await;
        let count = count.unwrap_or(self.default_count);
        bandit_scorer::score_domains(&snapshot, exclude, count, Utc::now(), &mut rand::thread_rng())
    }

    /// Ranked domains drawn from a caller-supplied generator.
    pub async fn get_recommendations_with<R: Rng + ?Sized>(
        &self,
        count: usize,
        exclude: &[LearningDomain],
        rng: &mut R,
    ) -> Vec<BanditRecommendation> {
        let snapshot = self.snapshot().await;
        bandit_scorer::score_domains(&snapshot, exclude, count, Utc::now(), rng)
    }

    pub async fn get_category_performance(&self, domain: LearningDomain) -> DomainPerformance {
        let inner = self.inner.read().await;
        DomainPerformance::from_stats(domain, inner.state.stats(domain), Utc::now())
    }

    /// One entry per domain, in canonical order.
    pub async fn get_all_performance_stats(&self) -> Vec<DomainPerformance> {
        let inner = self.inner.read().await;
        let now = Utc::now();
        inner
            .state
            .domain_stats
            .iter()
            .map(|(domain, stats)| DomainPerformance::from_stats(domain, stats, now))
            .collect()
    }

    /// Clone of the latest committed state.
    pub async fn snapshot(&self) -> BanditState {
        self.inner.read().await.state.clone()
    }

    /// Reinitialize every domain to zero and persist the fresh state.
    pub async fn reset(&self) {
        let (snapshot, version) = {
            let mut inner = self.inner.write().await;
            inner.state = BanditState::new(Utc::now());
            inner.version += 1;
            (inner.state.clone(), inner.version)
        };

        tracing::info!(learner_id = %self.learner_id, "bandit state reset");
        self.spawn_persist(snapshot, version);
    }

    /// Write the current state and wait for the repository to accept it.
    pub async fn flush(&self) -> DomainResult<()> {
        let (snapshot, version) = {
            let inner = self.inner.read().await;
            (inner.state.clone(), inner.version)
        };
        persist_if_newer(
            self.repository.as_ref(),
            &self.learner_id,
            &self.persisted_version,
            &snapshot,
            version,
        )
        .await
    }

    fn spawn_persist(&self, snapshot: BanditState, version: u64) {
        let repository = Arc::clone(&self.repository);
        let learner_id = Arc::clone(&self.learner_id);
        let gate = Arc::clone(&self.persisted_version);

        tokio::spawn(async move {
            if let Err(err) =
                persist_if_newer(repository.as_ref(), &learner_id, &gate, &snapshot, version).await
            {
                tracing::error!(
                    learner_id = %learner_id,
                    version,
                    error = %err,
                    "failed to persist bandit state"
                );
            }
        });
    }
}

async fn persist_if_newer(
    repository: &dyn BanditStateRepository,
    learner_id: &str,
    gate: &Mutex<u64>,
    snapshot: &BanditState,
    version: u64,
) -> DomainResult<()> {
    let mut persisted = gate.lock().await;
    if version < *persisted {
        tracing::trace!(version, persisted = *persisted, "skipping stale bandit state save");
        return Ok(());
    }

    let blob = serde_json::to_string(snapshot)?;
    repository.save(learner_id, &blob).await?;
    *persisted = version;
    Ok(())
}

/// Decode a stored blob field by field.
///
/// Fields that are missing or malformed keep their defaults, as does any
/// single domain whose statistics cannot be read. Returns `None` only when
/// the blob is not a JSON object at all.
pub fn decode_state(blob: &str) -> Option<BanditState> {
    let value: Value = serde_json::from_str(blob).ok()?;
    let object = value.as_object()?;
    let mut state = BanditState::default();

    if let Some(Value::Object(domains)) = object.get("domain_stats") {
        for (key, raw) in domains {
            let Ok(domain) = key.parse::<LearningDomain>() else {
                tracing::debug!(key = %key, "ignoring unknown domain in stored state");
                continue;
            };
            match decode_domain_stats(raw) {
                Some(stats) => state.domain_stats[domain] = stats,
                None => tracing::warn!(domain = %domain, "discarding unreadable domain stats"),
            }
        }
    }

    if let Some(rate) = object.get("exploration_rate").and_then(Value::as_f64) {
        state.exploration_rate = rate;
    }
    if let Some(total) = object.get("total_interactions").and_then(whole_number) {
        state.total_interactions = total;
    }
    if let Some(updated) = object
        .get("last_updated")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
    {
        state.last_updated = updated;
    }

    state.sanitize();
    Some(state)
}

/// Decode one domain's statistics, keeping every readable field.
///
/// Returns `None` only when `raw` is not an object.
fn decode_domain_stats(raw: &Value) -> Option<DomainStats> {
    let object = raw.as_object()?;
    let mut stats = DomainStats::default();

    let count = |key: &str| {
        object
            .get(key)
            .and_then(whole_number)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
    };
    let real = |key: &str| object.get(key).and_then(Value::as_f64);

    if let Some(n) = count("attempts") {
        stats.attempts = n;
    }
    if let Some(n) = count("successes") {
        stats.successes = n;
    }
    if let Some(n) = count("streak_correct") {
        stats.streak_correct = n;
    }
    if let Some(n) = count("streak_incorrect") {
        stats.streak_incorrect = n;
    }
    if let Some(x) = real("total_score") {
        stats.total_score = x;
    }
    if let Some(x) = real("last_score") {
        stats.last_score = x;
    }
    if let Some(x) = real("total_time_seconds") {
        stats.total_time_seconds = x;
    }
    stats.last_attempt_time = object
        .get("last_attempt_time")
        .and_then(|v| serde_json::from_value(v.clone()).ok());
    if let Some(Value::Array(scores)) = object.get("recent_scores") {
        stats.recent_scores = scores.iter().filter_map(Value::as_f64).collect();
    }

    Some(stats)
}

/// A non-negative integer, also accepted when written as a whole float (`3.0`).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_number(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let x = value.as_f64()?;
    (x.is_finite() && x >= 0.0 && x.fract() == 0.0 && x < u64::MAX as f64).then(|| x as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::InMemoryBanditStateRepository;

    async fn manager_with(repo: Arc<InMemoryBanditStateRepository>) -> BanditStateManager {
        BanditStateManager::load(repo, "learner-1", 3).await
    }

    #[tokio::test]
    async fn test_record_outcome_updates_counts() {
        let repo = Arc::new(InMemoryBanditStateRepository::new());
        let manager = manager_with(repo).await;

        let perf = manager.record_outcome(LearningDomain::Debt, 0.2, false, Some(30.0)).await;
        assert_eq!(perf.total_attempts, 1);
        assert_eq!(perf.streak_incorrect, 1);

        let state = manager.snapshot().await;
        assert_eq!(state.total_interactions, 1);
        assert!((state.exploration_rate - 0.4).abs() < f64::EPSILON);
        assert!((state.stats(LearningDomain::Debt).total_time_seconds - 30.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_flush_persists_latest_state() {
        let repo = Arc::new(InMemoryBanditStateRepository::new());
        let manager = manager_with(Arc::clone(&repo)).await;

        manager.record_outcome(LearningDomain::Saving, 0.9, true, None).await;
        manager.record_outcome(LearningDomain::Saving, 0.8, true, None).await;
        manager.flush().await.unwrap();

        let blob = repo.raw("learner-1").await.unwrap();
        let stored = decode_state(&blob).unwrap();
        assert_eq!(stored, manager.snapshot().await);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_in_memory_progress() {
        let repo = Arc::new(InMemoryBanditStateRepository::new());
        repo.set_fail_saves(true);
        let manager = manager_with(Arc::clone(&repo)).await;

        manager.record_outcome(LearningDomain::Credit, 1.0, true, None).await;
        assert!(manager.flush().await.is_err());
        assert_eq!(manager.get_category_performance(LearningDomain::Credit).await.total_attempts, 1);
        assert!(repo.raw("learner-1").await.is_none());
    }

    #[tokio::test]
    async fn test_reset_returns_to_defaults() {
        let repo = Arc::new(InMemoryBanditStateRepository::new());
        let manager = manager_with(repo).await;
        for _ in 0..3 {
            manager.record_outcome(LearningDomain::Debt, 0.1, false, None).await;
        }

        manager.reset().await;

        for perf in manager.get_all_performance_stats().await {
            assert_eq!(perf.total_attempts, 0);
            assert!(perf.success_rate.abs() < f64::EPSILON);
            assert!(!perf.needs_attention);
        }
        let state = manager.snapshot().await;
        assert!((state.exploration_rate - 0.3).abs() < f64::EPSILON);
        assert_eq!(state.total_interactions, 0);
    }

    #[tokio::test]
    async fn test_load_recovers_from_garbage() {
        let repo = Arc::new(InMemoryBanditStateRepository::new());
        repo.insert_raw("learner-1", "not json at all").await;
        let manager = manager_with(repo).await;
        assert_eq!(manager.snapshot().await.total_interactions, 0);
    }

    #[test]
    fn test_decode_state_keeps_readable_fields() {
        let blob = r#"{
            "domain_stats": {
                "debt": {"attempts": 3, "successes": 1, "streak_incorrect": 2},
                "saving": "corrupt",
                "crypto": {"attempts": 99}
            },
            "exploration_rate": 0.2,
            "total_interactions": 3,
            "last_updated": 12
        }"#;
        let state = decode_state(blob).unwrap();
        assert_eq!(state.stats(LearningDomain::Debt).attempts, 3);
        assert_eq!(state.stats(LearningDomain::Saving), &DomainStats::default());
        assert!((state.exploration_rate - 0.2).abs() < f64::EPSILON);
        assert_eq!(state.total_interactions, 3);
        assert!(decode_state("[1, 2]").is_none());
    }

    #[test]
    fn test_decode_state_keeps_counters_beside_a_malformed_field() {
        let blob = r#"{
            "domain_stats": {
                "debt": {
                    "attempts": 3.0,
                    "successes": 1,
                    "streak_incorrect": 2,
                    "last_score": 0.25,
                    "last_attempt_time": "never",
                    "recent_scores": [0.5, "oops", 0.25]
                },
                "credit": {"attempts": 2.5, "successes": -1, "total_score": "high"}
            },
            "total_interactions": 3.0
        }"#;
        let state = decode_state(blob).unwrap();

        let debt = state.stats(LearningDomain::Debt);
        assert_eq!(debt.attempts, 3);
        assert_eq!(debt.successes, 1);
        assert_eq!(debt.streak_incorrect, 2);
        assert!(debt.last_attempt_time.is_none());
        assert_eq!(debt.recent_scores, vec![0.5, 0.25]);
        assert_eq!(state.total_interactions, 3);

        let credit = state.stats(LearningDomain::Credit);
        assert_eq!(credit.attempts, 0);
        assert_eq!(credit.successes, 0);
        assert!(credit.total_score.abs() < f64::EPSILON);
    }

    #[test]
    fn test_whole_number_accepts_integral_floats_only() {
        assert_eq!(whole_number(&serde_json::json!(7)), Some(7));
        assert_eq!(whole_number(&serde_json::json!(7.0)), Some(7));
        assert_eq!(whole_number(&serde_json::json!(7.5)), None);
        assert_eq!(whole_number(&serde_json::json!(-1.0)), None);
        assert_eq!(whole_number(&serde_json::json!("7")), None);
    }

    #[test]
    fn test_decode_state_round_trip_is_idempotent() {
        let mut state = BanditState::default();
        let now = Utc::now();
        state.apply_outcome(LearningDomain::Investing, 0.123_456_789, true, Some(12.5), now);
        state.apply_outcome(LearningDomain::Debt, 0.3, false, None, now);

        let first = serde_json::to_string(&state).unwrap();
        let decoded = decode_state(&first).unwrap();
        let second = serde_json::to_string(&decoded).unwrap();
        assert_eq!(first, second);
        assert_eq!(decoded, state);
    }
}
