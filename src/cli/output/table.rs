//! Table output formatting for CLI commands
//!
//! Renders ranked domains, concrete recommendations and performance stats
//! with comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use super::truncate;
use crate::domain::models::{AdaptiveRecommendation, BanditRecommendation, DomainPerformance, UnitKind};

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self { use_colors, max_width }
    }

    /// Ranked domains from the scorer
    pub fn format_domains(&self, ranked: &[BanditRecommendation]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["#", "Domain", "Score", "Confidence", "Reason", "Explore"]));

        for (i, rec) in ranked.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(rec.domain.display_name()),
                Cell::new(format!("{:.3}", rec.score)),
                Cell::new(format!("{:.0}%", rec.confidence * 100.0)),
                Cell::new(rec.reason.message()),
                self.flag_cell(rec.is_exploration),
            ]);
        }

        table.to_string()
    }

    /// Concrete units from the assembler
    pub fn format_recommendations(&self, recs: &[AdaptiveRecommendation]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["Priority", "Unit", "Kind", "Domain", "Minutes", "Reason"]));

        for rec in recs {
            let kind_cell = if self.use_colors {
                Cell::new(rec.kind).fg(kind_color(rec.kind))
            } else {
                Cell::new(rec.kind)
            };

            table.add_row(vec![
                Cell::new(format!("{:.2}", rec.priority)),
                Cell::new(truncate(&rec.title, 40)),
                kind_cell,
                Cell::new(rec.domain.display_name()),
                Cell::new(rec.estimated_minutes),
                Cell::new(truncate(&rec.reason, 48)),
            ]);
        }

        table.to_string()
    }

    /// Per-domain performance summary
    pub fn format_performance(&self, stats: &[DomainPerformance]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&[
            "Domain", "Attempts", "Success", "Average", "Recent", "Streak", "Last Seen", "Attention",
        ]));

        for perf in stats {
            let streak = if perf.streak_correct > 0 {
                format!("+{}", perf.streak_correct)
            } else if perf.streak_incorrect > 0 {
                format!("-{}", perf.streak_incorrect)
            } else {
                "-".to_string()
            };

            let last_seen = perf
                .hours_since_last_attempt
                .map_or_else(|| "never".to_string(), |h| format!("{h:.1}h ago"));

            let attention = if perf.needs_attention && self.use_colors {
                Cell::new("yes").fg(Color::Red)
            } else if perf.needs_attention {
                Cell::new("yes")
            } else {
                Cell::new("")
            };

            table.add_row(vec![
                Cell::new(perf.domain.display_name()),
                Cell::new(perf.total_attempts),
                Cell::new(format!("{:.0}%", perf.success_rate * 100.0)),
                Cell::new(format!("{:.2}", perf.average_score)),
                Cell::new(format!("{:.2}", perf.decayed_score)),
                Cell::new(streak),
                Cell::new(last_seen),
                attention,
            ]);
        }

        table.to_string()
    }

    fn flag_cell(&self, flag: bool) -> Cell {
        match (flag, self.use_colors) {
            (true, true) => Cell::new("yes").fg(Color::Cyan),
            (true, false) => Cell::new("yes"),
            (false, _) => Cell::new(""),
        }
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|t| Cell::new(t).add_attribute(Attribute::Bold))
        .collect()
}

const fn kind_color(kind: UnitKind) -> Color {
    match kind {
        UnitKind::Lesson => Color::Green,
        UnitKind::Quiz => Color::Yellow,
        UnitKind::Challenge => Color::Magenta,
        UnitKind::Review => Color::Blue,
    }
}

fn supports_color() -> bool {
    // Respect NO_COLOR environment variable
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{LearningDomain, LearningUnit, RecommendationReason};

    fn plain() -> TableFormatter {
        TableFormatter::with_config(false, Some(160))
    }

    #[test]
    fn test_format_domains_lists_every_entry() {
        let ranked = vec![
            BanditRecommendation {
                domain: LearningDomain::Debt,
                score: 1.234,
                reason: RecommendationReason::Practice,
                is_exploration: true,
                confidence: 0.5,
            },
            BanditRecommendation {
                domain: LearningDomain::Saving,
                score: 0.5,
                reason: RecommendationReason::Discover,
                is_exploration: false,
                confidence: 0.1,
            },
        ];

        let rendered = plain().format_domains(&ranked);
        assert!(rendered.contains("Debt Management"));
        assert!(rendered.contains("1.234"));
        assert!(rendered.contains("Discover something new"));
    }

    #[test]
    fn test_format_recommendations_shows_kind() {
        let unit = LearningUnit::new("b-1", "Build a budget", LearningDomain::Budgeting, UnitKind::Quiz, 12);
        let recs = vec![AdaptiveRecommendation::review_of(&unit, 0.7, "Review it")];

        let rendered = plain().format_recommendations(&recs);
        assert!(rendered.contains("Review: Build a budget"));
        assert!(rendered.contains("review"));
        assert!(rendered.contains("0.70"));
    }
}
