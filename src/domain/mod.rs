//! Domain layer for the recommendation core
//!
//! This module contains the learner model, the catalog contracts and the
//! persistence port.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
