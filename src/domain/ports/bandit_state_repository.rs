//! Persistence port for learner bandit state.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Durable key-value storage for serialized bandit state.
///
/// The repository treats the state as an opaque blob keyed by learner; the
/// manager owns encoding, decoding and recovery from bad data.
#[async_trait]
pub trait BanditStateRepository: Send + Sync {
    /// Load the stored blob for `learner_id`, or `None` if nothing was saved.
    async fn load(&self, learner_id: &str) -> DomainResult<Option<String>>;

    /// Persist or replace the blob for `learner_id`.
    async fn save(&self, learner_id: &str, blob: &str) -> DomainResult<()>;
}
