//! Recommendation commands: ranked domains and concrete study units.

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;

use super::AppContext;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{AdaptiveRecommendation, BanditRecommendation, LearningDomain};
use crate::services::RecommendationAssembler;

#[derive(Debug, Serialize)]
pub struct DomainRankingOutput {
    pub recommendations: Vec<BanditRecommendation>,
    pub total: usize,
}

impl CommandOutput for DomainRankingOutput {
    fn to_human(&self) -> String {
        if self.recommendations.is_empty() {
            return "No domains to recommend.".to_string();
        }

        format!(
            "Top {} domain(s) to study next:\n{}",
            self.total,
            TableFormatter::new().format_domains(&self.recommendations)
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct UnitListOutput {
    #[serde(skip)]
    pub heading: String,
    pub recommendations: Vec<AdaptiveRecommendation>,
    pub total: usize,
    pub total_minutes: u32,
}

impl UnitListOutput {
    fn new(heading: impl Into<String>, recommendations: Vec<AdaptiveRecommendation>) -> Self {
        Self {
            heading: heading.into(),
            total: recommendations.len(),
            total_minutes: recommendations.iter().map(|r| r.estimated_minutes).sum(),
            recommendations,
        }
    }
}

impl CommandOutput for UnitListOutput {
    fn to_human(&self) -> String {
        if self.recommendations.is_empty() {
            return "Nothing to suggest right now. Check the catalog or your completed units.".to_string();
        }

        format!(
            "{}\n{}\n\n{} unit(s), about {} minute(s)",
            self.heading,
            TableFormatter::new().format_recommendations(&self.recommendations),
            self.total,
            self.total_minutes,
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Handle the recommend command
pub async fn handle_recommend(
    ctx: &AppContext,
    count: Option<usize>,
    exclude: &[LearningDomain],
    json: bool,
) -> Result<()> {
    let recommendations = ctx.manager.get_recommendations(count, exclude).await;

    output(
        &DomainRankingOutput {
            total: recommendations.len(),
            recommendations,
        },
        json,
    );
    Ok(())
}

/// Handle the plan command
pub async fn handle_plan(ctx: &AppContext, count: Option<usize>, json: bool) -> Result<()> {
    let catalog = ctx.load_catalog()?;
    let ledger = ctx.load_ledger()?;
    let state = ctx.manager.snapshot().await;
    let count = count.unwrap_or(ctx.config.assembler.default_count);

    let recommendations = RecommendationAssembler::new(&catalog, &ledger)
        .with_candidate_domains(ctx.config.assembler.candidate_domains)
        .generate(&state, count, Utc::now(), &mut rand::thread_rng());

    output(&UnitListOutput::new("Recommended next:", recommendations), json);
    Ok(())
}

/// Handle the after-failure command
pub async fn handle_after_failure(
    ctx: &AppContext,
    domain: LearningDomain,
    unit_id: &str,
    count: usize,
    json: bool,
) -> Result<()> {
    let catalog = ctx.load_catalog()?;
    let ledger = ctx.load_ledger()?;
    let state = ctx.manager.snapshot().await;

    if catalog.find(unit_id).is_none() {
        tracing::debug!(unit_id, "failed unit is not in the catalog");
    }

    let recommendations = RecommendationAssembler::new(&catalog, &ledger)
        .with_candidate_domains(ctx.config.assembler.candidate_domains)
        .next_after_failure(&state, domain, unit_id, count, Utc::now(), &mut rand::thread_rng());

    output(
        &UnitListOutput::new(format!("Try one of these after {unit_id}:"), recommendations),
        json,
    );
    Ok(())
}

/// Handle the path command
pub async fn handle_path(ctx: &AppContext, domain: Option<LearningDomain>, json: bool) -> Result<()> {
    let catalog = ctx.load_catalog()?;
    let ledger = ctx.load_ledger()?;
    let state = ctx.manager.snapshot().await;

    let path = RecommendationAssembler::new(&catalog, &ledger).learning_path(&state, domain);

    let heading = match domain {
        Some(domain) => format!("Learning path for {}:", domain.display_name()),
        None => "Learning path through your weakest areas:".to_string(),
    };
    output(&UnitListOutput::new(heading, path), json);
    Ok(())
}
