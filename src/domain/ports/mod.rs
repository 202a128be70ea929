//! Ports implemented by adapters outside the domain.

pub mod bandit_state_repository;
pub mod in_memory_bandit_state;

pub use bandit_state_repository::BanditStateRepository;
pub use in_memory_bandit_state::InMemoryBanditStateRepository;
