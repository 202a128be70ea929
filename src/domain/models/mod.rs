//! Domain models for the recommendation core.

pub mod bandit;
pub mod catalog;
pub mod config;
pub mod learning_domain;
pub mod performance;
pub mod recommendation;

pub use bandit::{
    exploration_rate_for, BanditRecommendation, BanditState, RecommendationReason,
    INITIAL_EXPLORATION_RATE, MAX_EXPLORATION_RATE, MIN_EXPLORATION_RATE,
};
pub use catalog::{Catalog, CompletionLedger, LearningUnit, UnitKind};
pub use config::{AssemblerConfig, BanditConfig, Config, DatabaseConfig, LoggingConfig};
pub use learning_domain::{DomainMap, LearningDomain, DOMAIN_COUNT};
pub use performance::{decayed_score, DomainPerformance, DomainStats, RECENT_WINDOW};
pub use recommendation::AdaptiveRecommendation;
