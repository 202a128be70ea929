//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::models::LearningDomain;

#[derive(Parser, Debug)]
#[command(name = "mentor")]
#[command(about = "Mentor - adaptive learning recommendations", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .mentor/config.yaml plus .mentor/local.yaml)
    #[arg(short, long, global = true, env = "MENTOR_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record the outcome of an activity in a domain
    Record {
        /// Domain the activity belongs to (budgeting, saving, debt, investing, credit)
        domain: LearningDomain,

        /// Score between 0 and 1; out-of-range values are clamped
        #[arg(allow_negative_numbers = true)]
        score: f64,

        /// Mark the activity as failed
        #[arg(long)]
        failed: bool,

        /// Seconds spent on the activity
        #[arg(short, long)]
        time_spent: Option<f64>,
    },

    /// Rank domains worth studying next
    Recommend {
        /// Number of domains to return
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Domains to leave out (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        exclude: Vec<LearningDomain>,
    },

    /// Show performance statistics
    Stats {
        /// Show a single domain
        domain: Option<LearningDomain>,
    },

    /// Clear all recorded performance for the learner
    Reset,

    /// Concrete units to study next, drawn from the catalog
    Plan {
        /// Number of units to return
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Follow-up units after failing one
    AfterFailure {
        /// Domain of the failed unit
        domain: LearningDomain,

        /// Id of the failed unit
        unit_id: String,

        /// Number of units to return
        #[arg(short = 'n', long, default_value = "3")]
        count: usize,
    },

    /// A short study path through one domain or the weakest ones
    Path {
        /// Target domain; omitted means the weakest domains
        domain: Option<LearningDomain>,
    },
}

impl Commands {
    /// Whether running the command changes the learner's stored state.
    pub fn mutates_state(&self) -> bool {
        matches!(self, Self::Record { .. } | Self::Reset)
    }
}
