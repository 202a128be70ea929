//! Service layer: sampling, scoring, state management and assembly.

pub mod bandit_manager;
pub mod bandit_scorer;
pub mod recommendation_assembler;
pub mod sampling;

pub use bandit_manager::{decode_state, BanditStateManager};
pub use bandit_scorer::{score_domains, ScoreBreakdown};
pub use recommendation_assembler::RecommendationAssembler;
