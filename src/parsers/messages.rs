use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use tracing::info;

use super::tolerance::ErrorBudget;
use crate::models::Message;
use crate::utils::open_input_file;

/// Tabular formats accepted for message and role files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// A single JSON array of records
    Json,
    /// One JSON record per line
    JsonLines,
    /// Comma-separated with a header row
    Csv,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension =
            path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(Self::Json),
            "jsonl" => Ok(Self::JsonLines),
            "csv" => Ok(Self::Csv),
            _ => bail!(
                "Unsupported file format for {}: only .json, .jsonl and .csv are supported",
                path.display()
            ),
        }
    }
}

/// Parse a chat export into messages, preserving file order
pub fn parse_messages_file(path: &Path) -> Result<Vec<Message>> {
    let messages: Vec<Message> = parse_records(path)?;
    info!("Loaded {} messages from {}", messages.len(), path.display());
    Ok(messages)
}

/// Read every record of a JSON, JSONL or CSV file.
///
/// JSON arrays are all-or-nothing. JSONL lines and CSV rows that fail to parse are skipped
/// with a warning, subject to the [`ErrorBudget`] thresholds.
pub(crate) fn parse_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let format = InputFormat::from_path(path)?;
    let file = open_input_file(path)?;
    let reader = BufReader::new(file);
    let label = path.display().to_string();

    match format {
        InputFormat::Json => serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse JSON array in {}", label)),
        InputFormat::JsonLines => parse_json_lines(reader, &label),
        InputFormat::Csv => parse_csv(reader, &label),
    }
}

fn parse_json_lines<T: DeserializeOwned>(reader: impl BufRead, label: &str) -> Result<Vec<T>> {
    let mut records = Vec::new();
    let mut budget = ErrorBudget::new(label);

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line from {}", label))?;

        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<T>(&line) {
            Ok(record) => {
                records.push(record);
                budget.record_ok();
            }
            Err(e) => budget.record_err(line_num + 1, e)?,
        }
    }

    budget.finish()?;
    if budget.skipped() > 0 {
        info!("Parsed {}: {} records ({} skipped)", label, records.len(), budget.skipped());
    }
    Ok(records)
}

fn parse_csv<T: DeserializeOwned>(reader: impl Read, label: &str) -> Result<Vec<T>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let mut records = Vec::new();
    let mut budget = ErrorBudget::new(label);

    for (row_num, row) in csv_reader.deserialize::<T>().enumerate() {
        match row {
            Ok(record) => {
                records.push(record);
                budget.record_ok();
            }
            // Header is line 1
            Err(e) => budget.record_err(row_num + 2, e)?,
        }
    }

    budget.finish()?;
    if budget.skipped() > 0 {
        info!("Parsed {}: {} records ({} skipped)", label, records.len(), budget.skipped());
    }
    Ok(records)
}
