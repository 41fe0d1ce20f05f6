//! Who replies to whom, by role.
//!
//! Rows are the responder's role, columns the role of the author they replied to. Row
//! and column order follow the caller's role taxonomy.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::models::{ReplyRecord, RoledMessage, collect_replies};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSummary {
    pub role: String,
    /// Distinct authors holding the role
    pub authors: usize,
    /// All roled messages sent by those authors, replies or not
    pub messages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyGraph {
    pub roles: Vec<String>,
    /// `counts[responder][replied_to]`
    pub counts: Vec<Vec<u64>>,
    /// Row-normalised counts; `None` for responder roles that never replied
    pub percentages: Vec<Option<Vec<f64>>>,
    pub summary: Vec<RoleSummary>,
    pub replies: Vec<ReplyRecord>,
    /// Replies to an author without a role, which have no column to land in
    pub unattributed_replies: usize,
}

impl ReplyGraph {
    pub fn row_total(&self, row: usize) -> u64 {
        self.counts.get(row).map(|r| r.iter().sum()).unwrap_or(0)
    }
}

/// Builds the role to role reply matrix for a fixed role taxonomy
#[derive(Debug, Clone)]
pub struct ReplyGraphAnalyzer {
    roles: Vec<String>,
    positions: HashMap<String, usize>,
}

impl ReplyGraphAnalyzer {
    pub fn new(roles: Vec<String>) -> Self {
        let mut positions = HashMap::with_capacity(roles.len());
        for (i, role) in roles.iter().enumerate() {
            positions.entry(role.clone()).or_insert(i);
        }
        Self { roles, positions }
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    fn position(&self, role: &str) -> Result<usize, AnalysisError> {
        self.positions.get(role).copied().ok_or_else(|| AnalysisError::UnknownRole(role.to_string()))
    }

    /// Count replies per (responder role, replied-to role), normalise each row and summarise
    /// authors and messages per role.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnknownRole`] when any message's role, or a reply's
    /// replied-to role, is missing from the taxonomy.
    pub fn analyze(&self, messages: &[RoledMessage]) -> Result<ReplyGraph, AnalysisError> {
        let n = self.roles.len();

        let mut authors: Vec<BTreeSet<&str>> = vec![BTreeSet::new(); n];
        let mut message_counts = vec![0usize; n];
        for message in messages {
            let row = self.position(&message.role)?;
            authors[row].insert(message.author());
            message_counts[row] += 1;
        }

        let replies = collect_replies(messages);
        let mut counts = vec![vec![0u64; n]; n];
        let mut unattributed_replies = 0;
        for reply in &replies {
            let row = self.position(&reply.role)?;
            match reply.prev_role.as_deref() {
                Some(prev_role) => counts[row][self.position(prev_role)?] += 1,
                None => unattributed_replies += 1,
            }
        }

        let percentages = counts
            .iter()
            .map(|row| {
                let total: u64 = row.iter().sum();
                (total > 0).then(|| row.iter().map(|&c| c as f64 / total as f64).collect())
            })
            .collect();

        let summary = self
            .roles
            .iter()
            .enumerate()
            .map(|(i, role)| RoleSummary {
                role: role.clone(),
                authors: authors[i].len(),
                messages: message_counts[i],
            })
            .collect();

        if unattributed_replies > 0 {
            info!(
                "{} replies went to authors without a role and are not in the matrix",
                unattributed_replies
            );
        }
        debug!("Reply matrix built over {} roles from {} replies", n, replies.len());

        Ok(ReplyGraph {
            roles: self.roles.clone(),
            counts,
            percentages,
            summary,
            replies,
            unattributed_replies,
        })
    }
}
