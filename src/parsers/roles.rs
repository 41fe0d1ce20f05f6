use std::path::Path;

use anyhow::Result;
use tracing::info;

use super::messages::parse_records;
use crate::models::RoleEntry;

/// Parse the author to role table (JSON, JSONL or CSV)
pub fn parse_roles_file(path: &Path) -> Result<Vec<RoleEntry>> {
    let entries: Vec<RoleEntry> = parse_records(path)?;
    info!("Loaded {} role entries from {}", entries.len(), path.display());
    Ok(entries)
}
