//! In-memory bandit state repository.
//!
//! Used by tests and by callers that do not need state to outlive the
//! process.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::BanditStateRepository;
use crate::domain::errors::{DomainError, DomainResult};

/// A repository that keeps blobs in a map.
#[derive(Debug, Default)]
pub struct InMemoryBanditStateRepository {
    blobs: RwLock<HashMap<String, String>>,
    fail_saves: AtomicBool,
    save_count: AtomicUsize,
}

impl InMemoryBanditStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a stored blob, e.g. to simulate state left by an older build.
    pub async fn insert_raw(&self, learner_id: &str, blob: impl Into<String>) {
        self.blobs.write().await.insert(learner_id.to_string(), blob.into());
    }

    pub async fn raw(&self, learner_id: &str) -> Option<String> {
        self.blobs.read().await.get(learner_id).cloned()
    }

    /// Make every subsequent save fail until toggled back.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::Release);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::Acquire)
    }
}

#[async_trait]
impl BanditStateRepository for InMemoryBanditStateRepository {
    async fn load(&self, learner_id: &str) -> DomainResult<Option<String>> {
        Ok(self.blobs.read().await.get(learner_id).cloned())
    }

    async fn save(&self, learner_id: &str, blob: &str) -> DomainResult<()> {
        if self.fail_saves.load(Ordering::Acquire) {
            return Err(DomainError::DatabaseError("simulated write failure".to_string()));
        }
        self.blobs.write().await.insert(learner_id.to_string(), blob.to_string());
        self.save_count.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}
