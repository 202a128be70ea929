//! Adapters implementing domain ports.

pub mod sqlite;
