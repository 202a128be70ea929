//! Turns ranked domains into concrete, deduplicated recommendations.
//!
//! The assembler borrows the caller's catalog and completion ledger and a
//! snapshot of the learner's bandit state. It never mutates any of them and
//! never fails: missing content simply yields fewer (or no) entries.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::cmp::Ordering;
use std::collections::HashSet;

use super::bandit_scorer;
use crate::domain::models::{
    AdaptiveRecommendation, BanditState, Catalog, CompletionLedger, LearningDomain, LearningUnit,
    UnitKind,
};

/// Domains requested from the scorer before filtering.
pub const DEFAULT_CANDIDATE_DOMAINS: usize = 5;
/// Added to the domain score when steering a struggling learner to a lesson.
pub const ATTENTION_BOOST: f64 = 0.2;
/// Fixed priority of remedial review entries.
pub const REVIEW_PRIORITY: f64 = 0.7;
/// Decayed score under which a practised domain is offered a review.
pub const REVIEW_DECAYED_THRESHOLD: f64 = 0.6;
/// Attempts required before a low decayed score triggers a review.
pub const REVIEW_MIN_ATTEMPTS: u32 = 2;
/// Uncompleted units per domain in a learning path.
pub const PATH_UNITS_PER_DOMAIN: usize = 2;
/// Domains covered by a learning path with no explicit target.
pub const PATH_WEAKEST_DOMAINS: usize = 3;

/// Builds recommendation lists against a catalog and completion ledger.
pub struct RecommendationAssembler<'a, L: CompletionLedger + ?Sized> {
    catalog: &'a Catalog,
    ledger: &'a L,
    candidate_domains: usize,
}

impl<'a, L: CompletionLedger + ?Sized> RecommendationAssembler<'a, L> {
    pub fn new(catalog: &'a Catalog, ledger: &'a L) -> Self {
        Self {
            catalog,
            ledger,
            candidate_domains: DEFAULT_CANDIDATE_DOMAINS,
        }
    }

    #[must_use]
    pub fn with_candidate_domains(mut self, candidate_domains: usize) -> Self {
        self.candidate_domains = candidate_domains;
        self
    }

    /// Up to `count` recommendations across the best-scoring domains, plus
    /// review entries for domains where the learner is slipping.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        state: &BanditState,
        count: usize,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<AdaptiveRecommendation> {
        if self.catalog.is_empty() || count == 0 {
            return Vec::new();
        }

        let ranked = bandit_scorer::score_domains(state, &[], self.candidate_domains, now, rng);
        let mut used: HashSet<String> = HashSet::new();
        let mut picks = Vec::new();

        for scored in &ranked {
            let stats = state.stats(scored.domain);

            let strengthen = if stats.needs_attention() {
                self.first_open_unit(scored.domain, &used, |u| u.kind == UnitKind::Lesson)
            } else {
                None
            };

            let pick = if let Some(unit) = strengthen {
                AdaptiveRecommendation::for_unit(
                    unit,
                    scored.score + ATTENTION_BOOST,
                    format!("Strengthen your {} skills", scored.domain.display_name()),
                    scored.is_exploration,
                )
            } else if let Some(unit) = self.first_open_unit(scored.domain, &used, |u| u.kind != UnitKind::Review) {
                AdaptiveRecommendation::for_unit(unit, scored.score, scored.reason.message(), scored.is_exploration)
            } else {
                tracing::trace!(domain = %scored.domain, "no open units left in domain");
                continue;
            };

            used.insert(pick.id.clone());
            picks.push(pick);
        }

        for (domain, stats) in state.domain_stats.iter() {
            let slipping = stats.needs_attention()
                || (stats.decayed_score() < REVIEW_DECAYED_THRESHOLD && stats.attempts >= REVIEW_MIN_ATTEMPTS);
            if !slipping {
                continue;
            }

            let review = self
                .catalog
                .units_in(domain)
                .filter(|u| u.kind != UnitKind::Review && self.ledger.is_completed(&u.id) && !used.contains(&u.id))
                .map(|u| {
                    AdaptiveRecommendation::review_of(
                        u,
                        REVIEW_PRIORITY,
                        format!("Review {} to reinforce what you learned", u.title),
                    )
                })
                .find(|r| !used.contains(&r.id));

            if let Some(review) = review {
                used.insert(review.id.clone());
                picks.push(review);
            }
        }

        picks.sort_by(|a, b| b.priority.partial_cmp(&a.priority).unwrap_or(Ordering::Equal));
        picks.truncate(count);

        tracing::debug!(returned = picks.len(), requested = count, "assembled recommendations");
        picks
    }

    /// Follow-up after the learner failed `current_unit_id` in `domain`.
    ///
    /// Other open lessons in the same domain come first at `1.0 - 0.1 * i`;
    /// remaining slots are filled from the scorer with `domain` excluded.
    pub fn next_after_failure<R: Rng + ?Sized>(
        &self,
        state: &BanditState,
        domain: LearningDomain,
        current_unit_id: &str,
        count: usize,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<AdaptiveRecommendation> {
        if self.catalog.is_empty() || count == 0 {
            return Vec::new();
        }

        let mut used: HashSet<String> = HashSet::from([current_unit_id.to_string()]);
        let mut picks: Vec<AdaptiveRecommendation> = Vec::new();

        let same_domain = self
            .catalog
            .units_in(domain)
            .filter(|u| u.kind == UnitKind::Lesson && self.is_open(u, &used))
            .take(count);
        for (i, unit) in same_domain.enumerate() {
            picks.push(AdaptiveRecommendation::for_unit(
                unit,
                1.0 - 0.1 * i as f64,
                format!("Build a stronger base in {}", domain.display_name()),
                false,
            ));
        }
        used.extend(picks.iter().map(|p| p.id.clone()));

        if picks.len() < count {
            let ranked = bandit_scorer::score_domains(state, &[domain], self.candidate_domains, now, rng);
            for scored in ranked {
                if picks.len() >= count {
                    break;
                }
                if let Some(unit) = self.first_open_unit(scored.domain, &used, |u| u.kind != UnitKind::Review) {
                    let pick = AdaptiveRecommendation::for_unit(
                        unit,
                        scored.score,
                        "Switch it up with a different topic",
                        scored.is_exploration,
                    );
                    used.insert(pick.id.clone());
                    picks.push(pick);
                }
            }
        }

        picks.truncate(count);
        picks
    }

    /// A short study path: up to two open units per domain, lessons first.
    ///
    /// Without a target the three domains with the lowest decayed score are
    /// used. Priorities start at 1.0 and fall by 0.1 per entry.
    pub fn learning_path(&self, state: &BanditState, target: Option<LearningDomain>) -> Vec<AdaptiveRecommendation> {
        if self.catalog.is_empty() {
            return Vec::new();
        }

        let domains: Vec<LearningDomain> = target.map_or_else(|| weakest_domains(state, PATH_WEAKEST_DOMAINS), |d| vec![d]);

        let mut path = Vec::new();
        for domain in domains {
            let mut open: Vec<&LearningUnit> = self
                .catalog
                .units_in(domain)
                .filter(|u| u.kind != UnitKind::Review && !self.ledger.is_completed(&u.id))
                .collect();
            open.sort_by_key(|u| path_rank(u.kind));

            for unit in open.into_iter().take(PATH_UNITS_PER_DOMAIN) {
                if path.iter().any(|p: &AdaptiveRecommendation| p.id == unit.id) {
                    continue;
                }
                let priority = 1.0 - 0.1 * path.len() as f64;
                path.push(AdaptiveRecommendation::for_unit(
                    unit,
                    priority,
                    format!("Next step in your {} path", domain.display_name()),
                    false,
                ));
            }
        }

        path
    }

    fn is_open(&self, unit: &LearningUnit, used: &HashSet<String>) -> bool {
        !self.ledger.is_completed(&unit.id) && !used.contains(&unit.id)
    }

    fn first_open_unit(
        &self,
        domain: LearningDomain,
        used: &HashSet<String>,
        accept: impl Fn(&LearningUnit) -> bool,
    ) -> Option<&'a LearningUnit> {
        let catalog: &'a Catalog = self.catalog;
        catalog
            .units_in(domain)
            .find(|u| accept(*u) && self.is_open(u, used))
    }
}

/// Lessons sort before quizzes, quizzes before challenges.
const fn path_rank(kind: UnitKind) -> u8 {
    match kind {
        UnitKind::Lesson => 0,
        UnitKind::Quiz => 1,
        UnitKind::Challenge => 2,
        UnitKind::Review => 3,
    }
}

/// The `n` domains with the lowest decayed score; ties keep canonical order.
fn weakest_domains(state: &BanditState, n: usize) -> Vec<LearningDomain> {
    let mut scored: Vec<(LearningDomain, f64)> = state
        .domain_stats
        .iter()
        .map(|(d, s)| (d, s.decayed_score()))
        .collect();
    scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    scored.into_iter().take(n).map(|(d, _)| d).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog() -> Catalog {
        let mut units = Vec::new();
        for domain in LearningDomain::ALL {
            let d = domain.as_str();
            units.push(LearningUnit::new(format!("{d}-quiz"), format!("{d} quiz"), domain, UnitKind::Quiz, 6));
            units.push(LearningUnit::new(format!("{d}-1"), format!("{d} one"), domain, UnitKind::Lesson, 10));
            units.push(LearningUnit::new(format!("{d}-2"), format!("{d} two"), domain, UnitKind::Lesson, 12));
        }
        Catalog::new(units)
    }

    fn completed(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    fn struggling_debt() -> BanditState {
        let mut state = BanditState::default();
        let now = Utc::now();
        for _ in 0..3 {
            state.apply_outcome(LearningDomain::Debt, 0.2, false, None, now);
        }
        state
    }

    #[test]
    fn test_generate_empty_catalog() {
        let ledger = completed(&[]);
        let catalog = Catalog::default();
        let assembler = RecommendationAssembler::new(&catalog, &ledger);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(assembler.generate(&BanditState::default(), 5, Utc::now(), &mut rng).is_empty());
    }

    #[test]
    fn test_generate_one_unit_per_domain_without_duplicates() {
        let catalog = catalog();
        let ledger = completed(&["budgeting-quiz"]);
        let assembler = RecommendationAssembler::new(&catalog, &ledger);
        let mut rng = StdRng::seed_from_u64(5);

        let recs = assembler.generate(&BanditState::default(), 5, Utc::now(), &mut rng);
        assert_eq!(recs.len(), 5);
        let ids: HashSet<&str> = recs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), recs.len());
        assert!(!ids.contains("budgeting-quiz"));
        assert!(ids.contains("budgeting-1"));
        assert!(recs.windows(2).all(|w| w[0].priority >= w[1].priority));
    }

    #[test]
    fn test_struggling_domain_gets_lesson_and_review() {
        let catalog = catalog();
        let ledger = completed(&["debt-1"]);
        let assembler = RecommendationAssembler::new(&catalog, &ledger);
        let mut rng = StdRng::seed_from_u64(8);

        let recs = assembler.generate(&struggling_debt(), 10, Utc::now(), &mut rng);

        let debt_pick = recs.iter().find(|r| r.domain == LearningDomain::Debt && r.kind != UnitKind::Review).unwrap();
        assert_eq!(debt_pick.id, "debt-2");
        assert!(debt_pick.reason.starts_with("Strengthen"));

        let review = recs.iter().find(|r| r.kind == UnitKind::Review).unwrap();
        assert_eq!(review.id, "review-debt-1");
        assert!((review.priority - REVIEW_PRIORITY).abs() < f64::EPSILON);
        assert_eq!(review.estimated_minutes, 5);
        assert_eq!(recs.iter().filter(|r| r.kind == UnitKind::Review).count(), 1);
    }

    #[test]
    fn test_generate_respects_count() {
        let catalog = catalog();
        let ledger = completed(&["debt-1"]);
        let assembler = RecommendationAssembler::new(&catalog, &ledger);
        let mut rng = StdRng::seed_from_u64(13);
        assert_eq!(assembler.generate(&struggling_debt(), 2, Utc::now(), &mut rng).len(), 2);
        assert!(assembler.generate(&struggling_debt(), 0, Utc::now(), &mut rng).is_empty());
    }

    #[test]
    fn test_exhausted_domain_does_not_block_others() {
        let catalog = catalog();
        let ledger = completed(&["credit-quiz", "credit-1", "credit-2"]);
        let assembler = RecommendationAssembler::new(&catalog, &ledger);
        let mut rng = StdRng::seed_from_u64(21);

        let recs = assembler.generate(&BanditState::default(), 5, Utc::now(), &mut rng);
        assert_eq!(recs.len(), 4);
        assert!(recs.iter().all(|r| r.domain != LearningDomain::Credit));
    }

    #[test]
    fn test_next_after_failure_prefers_same_domain_lessons() {
        let catalog = catalog();
        let ledger = completed(&[]);
        let assembler = RecommendationAssembler::new(&catalog, &ledger);
        let mut rng = StdRng::seed_from_u64(34);

        let recs = assembler.next_after_failure(&BanditState::default(), LearningDomain::Debt, "debt-1", 3, Utc::now(), &mut rng);
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].id, "debt-2");
        assert!((recs[0].priority - 1.0).abs() < f64::EPSILON);
        assert!(recs[1..].iter().all(|r| r.domain != LearningDomain::Debt));
        assert!(recs.iter().all(|r| r.id != "debt-1"));
    }

    #[test]
    fn test_catalog_review_units_are_never_picked_as_content() {
        let units = vec![
            LearningUnit::new("debt-recap", "Debt recap", LearningDomain::Debt, UnitKind::Review, 5),
            LearningUnit::new("debt-1", "Debt one", LearningDomain::Debt, UnitKind::Lesson, 10),
            LearningUnit::new("credit-recap", "Credit recap", LearningDomain::Credit, UnitKind::Review, 5),
        ];
        let catalog = Catalog::new(units);
        let ledger = completed(&["debt-1", "debt-recap"]);
        let assembler = RecommendationAssembler::new(&catalog, &ledger);
        let mut rng = StdRng::seed_from_u64(55);

        let recs = assembler.generate(&struggling_debt(), 10, Utc::now(), &mut rng);
        let ids: Vec<&str> = recs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["review-debt-1"]);

        let after = assembler.next_after_failure(&BanditState::default(), LearningDomain::Debt, "debt-1", 3, Utc::now(), &mut rng);
        assert!(after.iter().all(|r| r.id != "credit-recap" && r.id != "debt-recap"));
    }

    #[test]
    fn test_learning_path_for_target_domain() {
        let catalog = catalog();
        let ledger = completed(&["saving-1"]);
        let assembler = RecommendationAssembler::new(&catalog, &ledger);

        let path = assembler.learning_path(&BanditState::default(), Some(LearningDomain::Saving));
        let ids: Vec<&str> = path.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["saving-2", "saving-quiz"]);
        assert!((path[0].priority - 1.0).abs() < f64::EPSILON);
        assert!(path[0].priority > path[1].priority);
    }

    #[test]
    fn test_learning_path_targets_weakest_domains() {
        let catalog = catalog();
        let ledger = completed(&[]);
        let assembler = RecommendationAssembler::new(&catalog, &ledger);
        let mut state = BanditState::default();
        let now = Utc::now();
        state.apply_outcome(LearningDomain::Investing, 0.1, false, None, now);
        state.apply_outcome(LearningDomain::Budgeting, 0.9, true, None, now);

        let path = assembler.learning_path(&state, None);
        assert_eq!(path.len(), 6);
        assert_eq!(path[0].domain, LearningDomain::Investing);
        assert!(path.iter().all(|r| r.domain != LearningDomain::Budgeting));
        assert!(path.windows(2).all(|w| w[0].priority > w[1].priority));
    }
}
