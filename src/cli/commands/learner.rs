//! Learner commands: record outcomes, inspect and reset performance.

use anyhow::Result;
use serde::Serialize;

use super::AppContext;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{DomainPerformance, LearningDomain};

#[derive(Debug, Serialize)]
pub struct RecordOutput {
    pub success: bool,
    pub passed: bool,
    pub performance: DomainPerformance,
}

impl CommandOutput for RecordOutput {
    fn to_human(&self) -> String {
        let perf = &self.performance;
        let mut lines = vec![format!(
            "Recorded {} attempt in {} (score {:.2})",
            if self.passed { "a passed" } else { "a failed" },
            perf.domain.display_name(),
            perf.last_score,
        )];
        lines.push(format!(
            "  Attempts: {}  Success rate: {:.0}%  Recent: {:.2}",
            perf.total_attempts,
            perf.success_rate * 100.0,
            perf.decayed_score,
        ));
        if perf.needs_attention {
            lines.push("  This area needs some extra attention.".to_string());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct StatsOutput {
    pub learner_id: String,
    pub domains: Vec<DomainPerformance>,
    pub total_attempts: u32,
    pub total_time_seconds: f64,
}

impl StatsOutput {
    fn new(learner_id: &str, domains: Vec<DomainPerformance>) -> Self {
        Self {
            learner_id: learner_id.to_string(),
            total_attempts: domains.iter().map(|d| d.total_attempts).sum(),
            total_time_seconds: domains.iter().map(|d| d.total_time_seconds).sum(),
            domains,
        }
    }
}

impl CommandOutput for StatsOutput {
    fn to_human(&self) -> String {
        if self.total_attempts == 0 {
            return format!("No activity recorded yet for learner '{}'.", self.learner_id);
        }

        let mut lines = vec![format!("Performance for learner '{}':", self.learner_id)];
        lines.push(TableFormatter::new().format_performance(&self.domains));
        lines.push(format!(
            "\n{} attempt(s), {:.1} minute(s) of study",
            self.total_attempts,
            self.total_time_seconds / 60.0,
        ));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct ResetOutput {
    pub success: bool,
    pub message: String,
}

impl CommandOutput for ResetOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Handle the record command
pub async fn handle_record(
    ctx: &AppContext,
    domain: LearningDomain,
    score: f64,
    passed: bool,
    time_spent_seconds: Option<f64>,
    json: bool,
) -> Result<()> {
    let performance = ctx
        .manager
        .record_outcome(domain, score, passed, time_spent_seconds)
        .await;

    output(
        &RecordOutput {
            success: true,
            passed,
            performance,
        },
        json,
    );
    Ok(())
}

/// Handle the stats command
pub async fn handle_stats(ctx: &AppContext, domain: Option<LearningDomain>, json: bool) -> Result<()> {
    let domains = match domain {
        Some(domain) => vec![ctx.manager.get_category_performance(domain).await],
        None => ctx.manager.get_all_performance_stats().await,
    };

    output(&StatsOutput::new(ctx.manager.learner_id(), domains), json);
    Ok(())
}

/// Handle the reset command
pub async fn handle_reset(ctx: &AppContext, json: bool) -> Result<()> {
    ctx.manager.reset().await;

    output(
        &ResetOutput {
            success: true,
            message: format!("Cleared all progress for learner '{}'.", ctx.manager.learner_id()),
        },
        json,
    );
    Ok(())
}
