//! Command handlers and the application context they share.

pub mod learner;
pub mod recommend;

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use crate::adapters::sqlite::{initialize_database, PoolConfig, SqliteBanditStateRepository};
use crate::cli::Commands;
use crate::domain::models::{Catalog, Config};
use crate::domain::ports::BanditStateRepository;
use crate::services::BanditStateManager;

/// Everything a command needs: validated configuration and the learner's state.
pub struct AppContext {
    pub config: Config,
    pub manager: BanditStateManager,
}

impl AppContext {
    /// Open the configured database and load the learner's bandit state.
    pub async fn open(config: Config) -> Result<Self> {
        let url = format!("sqlite:{}", config.database.path);
        let pool_config = PoolConfig {
            max_connections: config.database.max_connections,
            ..PoolConfig::default()
        };
        let pool = initialize_database(&url, Some(pool_config))
            .await
            .with_context(|| format!("Failed to initialize database at {}", config.database.path))?;

        let repository: Arc<dyn BanditStateRepository> = Arc::new(SqliteBanditStateRepository::new(pool));
        Ok(Self::with_repository(config, repository).await)
    }

    /// Build a context over an arbitrary repository.
    pub async fn with_repository(config: Config, repository: Arc<dyn BanditStateRepository>) -> Self {
        let manager = BanditStateManager::load(
            repository,
            config.learner_id.clone(),
            config.bandit.default_recommendation_count,
        )
        .await;
        Self { config, manager }
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        load_catalog(Path::new(&self.config.catalog_path))
    }

    pub fn load_ledger(&self) -> Result<BTreeSet<String>> {
        load_ledger(Path::new(&self.config.ledger_path))
    }
}

/// Read a YAML catalog. A missing file is an empty catalog.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "catalog file not found, using an empty catalog");
        return Ok(Catalog::default());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let catalog = Catalog::from_yaml(&raw)
        .with_context(|| format!("Failed to parse catalog {}", path.display()))?;

    tracing::debug!(path = %path.display(), units = catalog.len(), "catalog loaded");
    Ok(catalog)
}

/// Read the YAML list of completed unit ids. A missing or empty file means
/// nothing has been completed yet.
pub fn load_ledger(path: &Path) -> Result<BTreeSet<String>> {
    if !path.exists() {
        return Ok(BTreeSet::new());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read completion ledger {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(BTreeSet::new());
    }

    let ids: Vec<String> = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse completion ledger {}", path.display()))?;
    Ok(ids.into_iter().collect())
}

/// Run one command. After a command that changed the learner's state, wait
/// for that state to reach the repository.
pub async fn execute(command: Commands, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let mutates = command.mutates_state();
    match command {
        Commands::Record { domain, score, failed, time_spent } => {
            learner::handle_record(ctx, domain, score, !failed, time_spent, json_mode).await?;
        }
        Commands::Stats { domain } => learner::handle_stats(ctx, domain, json_mode).await?,
        Commands::Reset => learner::handle_reset(ctx, json_mode).await?,
        Commands::Recommend { count, exclude } => {
            recommend::handle_recommend(ctx, count, &exclude, json_mode).await?;
        }
        Commands::Plan { count } => recommend::handle_plan(ctx, count, json_mode).await?,
        Commands::AfterFailure { domain, unit_id, count } => {
            recommend::handle_after_failure(ctx, domain, &unit_id, count, json_mode).await?;
        }
        Commands::Path { domain } => recommend::handle_path(ctx, domain, json_mode).await?,
    }

    if mutates {
        ctx.manager
            .flush()
            .await
            .context("Failed to save learner state")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_files_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = load_catalog(&dir.path().join("nope.yaml")).unwrap();
        assert!(catalog.is_empty());
        let ledger = load_ledger(&dir.path().join("nope.yaml")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_load_ledger_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "- budget-101\n- save-101\n- budget-101").unwrap();

        let ledger = load_ledger(file.path()).unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(ledger.contains("save-101"));
    }

    #[test]
    fn test_load_catalog_rejects_bad_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "units:\n  - id: x\n    domain: astrology").unwrap();

        assert!(load_catalog(file.path()).is_err());
    }
}
