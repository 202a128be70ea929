mod common;

use chrono::Utc;
use mentor::domain::models::{BanditState, LearningDomain, UnitKind};
use mentor::services::RecommendationAssembler;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeSet, HashSet};

fn history() -> impl Strategy<Value = Vec<(LearningDomain, f64, bool)>> {
    prop::collection::vec(
        (prop::sample::select(LearningDomain::ALL.to_vec()), 0.0f64..=1.0, any::<bool>()),
        0..40,
    )
}

fn completed() -> impl Strategy<Value = BTreeSet<String>> {
    let ids: Vec<String> = common::sample_catalog().units.into_iter().map(|u| u.id).collect();
    prop::sample::subsequence(ids.clone(), 0..=ids.len()).prop_map(|v| v.into_iter().collect())
}

fn build_state(history: &[(LearningDomain, f64, bool)]) -> BanditState {
    let now = Utc::now();
    let mut state = BanditState::new(now);
    for (domain, score, passed) in history {
        state.apply_outcome(*domain, *score, *passed, None, now);
    }
    state
}

proptest! {
    /// Property: Generated lists are bounded, unique and skip completed units
    #[test]
    fn prop_generate_is_deduplicated_and_bounded(
        seed in any::<u64>(),
        history in history(),
        ledger in completed(),
        count in 0usize..12,
    ) {
        let catalog = common::sample_catalog();
        let state = build_state(&history);
        let assembler = RecommendationAssembler::new(&catalog, &ledger);

        let recs = assembler.generate(&state, count, Utc::now(), &mut StdRng::seed_from_u64(seed));

        prop_assert!(recs.len() <= count);
        let ids: HashSet<&str> = recs.iter().map(|r| r.id.as_str()).collect();
        prop_assert_eq!(ids.len(), recs.len());

        for rec in &recs {
            if rec.kind == UnitKind::Review {
                let original = rec.id.strip_prefix("review-").unwrap();
                prop_assert!(ledger.contains(original));
            } else {
                prop_assert!(!ledger.contains(&rec.id));
            }
        }

        for pair in recs.windows(2) {
            prop_assert!(pair[0].priority >= pair[1].priority);
        }
    }

    /// Property: After-failure never repeats the failed unit or exceeds the count
    #[test]
    fn prop_after_failure_excludes_current(
        seed in any::<u64>(),
        history in history(),
        ledger in completed(),
        count in 0usize..8,
        domain in prop::sample::select(LearningDomain::ALL.to_vec()),
    ) {
        let catalog = common::sample_catalog();
        let state = build_state(&history);
        let current = format!("{}-101", domain.as_str());

        let recs = RecommendationAssembler::new(&catalog, &ledger).next_after_failure(
            &state,
            domain,
            &current,
            count,
            Utc::now(),
            &mut StdRng::seed_from_u64(seed),
        );

        prop_assert!(recs.len() <= count);
        prop_assert!(recs.iter().all(|r| r.id != current));
        let ids: HashSet<&str> = recs.iter().map(|r| r.id.as_str()).collect();
        prop_assert_eq!(ids.len(), recs.len());
    }

    /// Property: Learning path priorities strictly decrease from 1.0
    #[test]
    fn prop_learning_path_priorities_decrease(
        history in history(),
        ledger in completed(),
        target in prop::option::of(prop::sample::select(LearningDomain::ALL.to_vec())),
    ) {
        let catalog = common::sample_catalog();
        let state = build_state(&history);

        let path = RecommendationAssembler::new(&catalog, &ledger).learning_path(&state, target);

        prop_assert!(path.len() <= 6);
        if let Some(first) = path.first() {
            prop_assert!((first.priority - 1.0).abs() < 1e-12);
        }
        for pair in path.windows(2) {
            prop_assert!(pair[0].priority > pair[1].priority);
        }
        if let Some(domain) = target {
            prop_assert!(path.iter().all(|r| r.domain == domain));
        }
    }
}
