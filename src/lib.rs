//! Mentor - adaptive learning recommendations
//!
//! Mentor tracks how a learner performs across personal-finance domains and
//! uses a Thompson-sampling bandit to decide what they should study next.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Learning domains, performance statistics,
//!   bandit state, catalog and recommendation models, repository ports
//! - **Service Layer** (`services`): Random variate sampling, domain scoring,
//!   state management and recommendation assembly
//! - **Adapters** (`adapters`): `SQLite` persistence for bandit state
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mentor::{BanditStateManager, InMemoryBanditStateRepository, LearningDomain};
//!
//! #[tokio::main]
//! async fn main() {
//!     let repo = Arc::new(InMemoryBanditStateRepository::new());
//!     let manager = BanditStateManager::load(repo, "learner-1", 3).await;
//!     manager.record_outcome(LearningDomain::Debt, 0.4, false, None).await;
//!     let next = manager.get_recommendations(None, &[]).await;
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AdaptiveRecommendation, BanditRecommendation, BanditState, Catalog, CompletionLedger, Config,
    DomainMap, DomainPerformance, DomainStats, LearningDomain, LearningUnit, RecommendationReason,
    UnitKind,
};
pub use domain::ports::{BanditStateRepository, InMemoryBanditStateRepository};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{BanditStateManager, RecommendationAssembler};
