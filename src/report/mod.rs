//! Report files: one CSV table per analysis plus `report.json` with everything.
//!
//! Each file is written to a temporary sibling first and renamed into place, so a crashed run
//! never leaves a half-written table behind. Tables for analyses that failed are not written.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::analysis::{ReactionReport, ReplyGraph};
use crate::clustering::Clustering;
use crate::pipeline::PipelineReport;

pub const REACTIONS_FILENAME: &str = "reactions.csv";
pub const REPLY_MATRIX_FILENAME: &str = "reply_matrix.csv";
pub const REPLY_COUNTS_FILENAME: &str = "reply_counts.csv";
pub const ROLE_SUMMARY_FILENAME: &str = "role_summary.csv";
pub const CLUSTERS_FILENAME: &str = "clusters.csv";
pub const REPORT_FILENAME: &str = "report.json";

fn write_atomic(folder: &Path, name: &str, contents: &[u8]) -> Result<PathBuf> {
    let path = folder.join(name);
    let temp = folder.join(format!("{}.tmp", name));
    fs::write(&temp, contents).with_context(|| format!("Failed to write {}", temp.display()))?;
    fs::rename(&temp, &path).with_context(|| format!("Failed to rename {}", temp.display()))?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer.into_inner().map_err(|e| anyhow::anyhow!("Failed to flush CSV buffer: {}", e))
}

pub fn reactions_csv(report: &ReactionReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "bucket",
        "lower",
        "upper",
        "count",
        "percentage",
        "cumulative_percentage",
    ])?;
    for bucket in &report.buckets {
        writer.write_record([
            bucket.label.clone(),
            bucket.lower.to_string(),
            bucket.upper.to_string(),
            bucket.count.to_string(),
            bucket.percentage.to_string(),
            bucket.cumulative_percentage.to_string(),
        ])?;
    }
    finish(writer)
}

/// Row-normalised reply matrix; rows without replies have empty cells
pub fn reply_matrix_csv(graph: &ReplyGraph) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(std::iter::once("role").chain(graph.roles.iter().map(String::as_str)))?;
    for (role, row) in graph.roles.iter().zip(&graph.percentages) {
        let cells: Vec<String> = match row {
            Some(values) => values.iter().map(f64::to_string).collect(),
            None => vec![String::new(); graph.roles.len()],
        };
        writer.write_record(std::iter::once(role.clone()).chain(cells))?;
    }
    finish(writer)
}

pub fn reply_counts_csv(graph: &ReplyGraph) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(std::iter::once("role").chain(graph.roles.iter().map(String::as_str)))?;
    for (role, row) in graph.roles.iter().zip(&graph.counts) {
        let cells = row.iter().map(u64::to_string);
        writer.write_record(std::iter::once(role.clone()).chain(cells))?;
    }
    finish(writer)
}

pub fn role_summary_csv(graph: &ReplyGraph) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for summary in &graph.summary {
        writer.serialize(summary)?;
    }
    finish(writer)
}

pub fn clusters_csv(clustering: &Clustering) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for point in &clustering.points {
        writer.serialize(point)?;
    }
    finish(writer)
}

/// Write every table of `report` into `folder`, creating it when missing.
///
/// Returns the written paths in write order.
pub fn write_report(report: &PipelineReport, folder: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(folder)
        .with_context(|| format!("Failed to create output folder {}", folder.display()))?;

    let mut written = Vec::new();
    if let Some(reactions) = &report.reactions {
        written.push(write_atomic(folder, REACTIONS_FILENAME, &reactions_csv(reactions)?)?);
    }
    if let Some(graph) = &report.reply_graph {
        written.push(write_atomic(folder, REPLY_MATRIX_FILENAME, &reply_matrix_csv(graph)?)?);
        written.push(write_atomic(folder, REPLY_COUNTS_FILENAME, &reply_counts_csv(graph)?)?);
        written.push(write_atomic(folder, ROLE_SUMMARY_FILENAME, &role_summary_csv(graph)?)?);
    }
    if let Some(clustering) = &report.clustering {
        written.push(write_atomic(folder, CLUSTERS_FILENAME, &clusters_csv(clustering)?)?);
    }

    let json = serde_json::to_vec_pretty(report).context("Failed to serialize report")?;
    written.push(write_atomic(folder, REPORT_FILENAME, &json)?);

    info!("Wrote {} report file(s) to {}", written.len(), folder.display());
    Ok(written)
}
