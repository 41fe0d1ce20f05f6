//! End-to-end pipeline: load, enrich, join, then run every analysis.
//!
//! # Error Handling Strategy
//!
//! - **Loading**: unreadable files, parse thresholds, bad timestamps and ambiguous role tables
//!   stop the run, since every analysis depends on them
//! - **Join**: messages from authors without a role are dropped and counted, not raised
//! - **Analyses**: each analysis step either succeeds completely or fails on its own with an
//!   [`AnalysisError`]. A failing step is logged and recorded in
//!   [`PipelineReport::failures`]; the other steps still run and are still reported
//!
//! No step ever produces a partial result.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::activity::{
    CalendarCount, QuarterShare, RoleLength, average_length_per_role, media_share_per_quarter,
    messages_per_month, messages_per_weekday,
};
use crate::analysis::{
    LatencyBoundaries, ReactionAnalyzer, ReactionReport, ReplyGraph, ReplyGraphAnalyzer,
};
use crate::clustering::{ClusterOptions, Clustering, cluster, corpus_from_messages};
use crate::config::Config;
use crate::enrichment::{Markers, enrich};
use crate::error::AnalysisError;
use crate::models::{EnrichedMessage, Message};
use crate::parsers::{parse_messages_file, parse_roles_file};
use crate::roles::{JoinOutcome, RoleTable, join};

/// Enriched and role-joined messages, ready for analysis
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Every message, rostered or not, in export order
    pub enriched: Vec<EnrichedMessage>,
    pub joined: JoinOutcome,
    pub roles: RoleTable,
    /// Row and column order for role-indexed output
    pub taxonomy: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub messages: usize,
    pub authors: usize,
    pub roled_messages: usize,
    pub dropped_messages: usize,
    pub unrostered_authors: Vec<String>,
    pub roles: usize,
    pub media_messages: usize,
    pub payment_messages: usize,
    pub first_message: Option<NaiveDateTime>,
    pub last_message: Option<NaiveDateTime>,
}

/// An analysis step that refused to produce a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepFailure {
    pub step: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityReport {
    pub length_per_role: Vec<RoleLength>,
    pub media_per_quarter: Vec<QuarterShare>,
    pub per_weekday: Vec<CalendarCount>,
    pub per_month: Vec<CalendarCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub stats: DatasetStats,
    pub activity: ActivityReport,
    pub reactions: Option<ReactionReport>,
    pub reply_graph: Option<ReplyGraph>,
    pub clustering: Option<Clustering>,
    pub failures: Vec<StepFailure>,
}

impl Dataset {
    /// Enrich and join already-parsed inputs
    pub fn from_parts(
        messages: &[Message],
        roles: RoleTable,
        markers: &Markers,
        role_order: &[String],
    ) -> Result<Self> {
        let enriched = enrich(messages, markers)?;
        let joined = join(enriched.clone(), &roles);
        let taxonomy =
            if role_order.is_empty() { roles.roles().to_vec() } else { role_order.to_vec() };
        Ok(Self { enriched, joined, roles, taxonomy })
    }

    /// Parse the configured input files and prepare the dataset
    pub fn load(config: &Config) -> Result<Self> {
        let messages = parse_messages_file(&config.messages_file)?;
        let entries = parse_roles_file(&config.roles_file)?;
        let roles = RoleTable::from_entries(entries).with_context(|| {
            format!("Role table {} is ambiguous", config.roles_file.display())
        })?;
        info!(
            "Loaded {} messages and {} role assignments across {} roles",
            messages.len(),
            roles.len(),
            roles.roles().len()
        );
        Self::from_parts(&messages, roles, &config.markers(), &config.role_order)
            .with_context(|| format!("Failed to prepare {}", config.messages_file.display()))
    }

    pub fn stats(&self) -> DatasetStats {
        let authors: BTreeSet<&str> = self.enriched.iter().map(|m| m.author.as_str()).collect();
        DatasetStats {
            messages: self.enriched.len(),
            authors: authors.len(),
            roled_messages: self.joined.messages.len(),
            dropped_messages: self.joined.dropped,
            unrostered_authors: self.joined.unrostered_authors.clone(),
            roles: self.taxonomy.len(),
            media_messages: self.enriched.iter().filter(|m| m.has_media).count(),
            payment_messages: self.enriched.iter().filter(|m| m.has_payment_link).count(),
            first_message: self.enriched.iter().map(|m| m.timestamp).min(),
            last_message: self.enriched.iter().map(|m| m.timestamp).max(),
        }
    }

    pub fn activity(&self) -> ActivityReport {
        ActivityReport {
            length_per_role: average_length_per_role(&self.joined.messages),
            media_per_quarter: media_share_per_quarter(&self.enriched),
            per_weekday: messages_per_weekday(&self.enriched),
            per_month: messages_per_month(&self.enriched),
        }
    }

    pub fn reactions(&self, boundaries: LatencyBoundaries) -> Result<ReactionReport, AnalysisError> {
        ReactionAnalyzer::new(boundaries).analyze(&self.joined.messages)
    }

    pub fn reply_graph(&self) -> Result<ReplyGraph, AnalysisError> {
        ReplyGraphAnalyzer::new(self.taxonomy.clone()).analyze(&self.joined.messages)
    }

    /// Cluster every author in the export; authorship style does not depend on the roster
    pub fn clustering(&self, options: &ClusterOptions) -> Result<Clustering, AnalysisError> {
        cluster(&corpus_from_messages(&self.enriched), options)
    }
}

fn record<T>(
    step: &str,
    result: Result<T, AnalysisError>,
    failures: &mut Vec<StepFailure>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{} analysis skipped: {}", step, e);
            failures.push(StepFailure { step: step.to_string(), error: e.to_string() });
            None
        }
    }
}

/// Run every analysis over a prepared dataset
pub fn analyze(dataset: &Dataset, config: &Config) -> Result<PipelineReport> {
    let mut failures = Vec::new();

    let reactions = record("reactions", dataset.reactions(config.boundaries()?), &mut failures);
    let reply_graph = record("reply_graph", dataset.reply_graph(), &mut failures);
    let clustering =
        record("clustering", dataset.clustering(&config.cluster_options()), &mut failures);

    Ok(PipelineReport {
        stats: dataset.stats(),
        activity: dataset.activity(),
        reactions,
        reply_graph,
        clustering,
        failures,
    })
}

/// Load the configured inputs and run every analysis
pub fn run_pipeline(config: &Config) -> Result<PipelineReport> {
    let dataset = Dataset::load(config)?;
    let report = analyze(&dataset, config)?;
    info!(
        "Pipeline finished: {} of 3 analyses succeeded, {} message(s) dropped by the role join",
        3 - report.failures.len(),
        report.stats.dropped_messages
    );
    Ok(report)
}

/// Run the pipeline and write every report into `output_folder`, returning the report and
/// the paths written
pub fn run_and_write(
    config: &Config,
    output_folder: &Path,
) -> Result<(PipelineReport, Vec<PathBuf>)> {
    let report = run_pipeline(config)?;
    let written = crate::report::write_report(&report, output_folder)?;
    Ok((report, written))
}
