//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across multiple integration
//! test files.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use mentor::domain::models::{Catalog, LearningDomain, LearningUnit, UnitKind};

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Write `contents` to `name` inside `dir`, returning the full path.
pub fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write fixture");
    path
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Two lessons and a quiz per domain, in study order.
pub fn sample_catalog() -> Catalog {
    let mut units = Vec::new();
    for domain in LearningDomain::ALL {
        let slug = domain.as_str();
        units.push(LearningUnit::new(
            format!("{slug}-101"),
            format!("{} basics", domain.display_name()),
            domain,
            UnitKind::Lesson,
            10,
        ));
        units.push(LearningUnit::new(
            format!("{slug}-102"),
            format!("{} in practice", domain.display_name()),
            domain,
            UnitKind::Lesson,
            15,
        ));
        units.push(LearningUnit::new(
            format!("{slug}-quiz"),
            format!("{} check-in", domain.display_name()),
            domain,
            UnitKind::Quiz,
            5,
        ));
    }
    Catalog::new(units)
}

/// The same catalog rendered as YAML.
pub const SAMPLE_CATALOG_YAML: &str = r"
units:
  - id: budgeting-101
    title: Budgeting basics
    domain: budgeting
    kind: lesson
    estimated_minutes: 10
  - id: budgeting-quiz
    title: Budgeting check-in
    domain: budgeting
    kind: quiz
    estimated_minutes: 5
  - id: debt-101
    title: Debt basics
    domain: debt
    kind: lesson
    estimated_minutes: 12
  - id: debt-102
    title: Paying down debt
    domain: debt
    kind: lesson
    estimated_minutes: 15
  - id: saving-101
    title: Saving basics
    domain: saving
    kind: lesson
    estimated_minutes: 8
";
