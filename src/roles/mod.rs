//! Author to role join.
//!
//! Messages from authors missing from the role table are dropped (inner join). This is
//! expected for exports that include former members or guests, so it is reported as a
//! dropped-row count rather than raised as an error.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::models::{EnrichedMessage, RoleEntry, RoledMessage};

/// Unambiguous author to role mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleTable {
    roles_by_author: HashMap<String, String>,
    /// Distinct roles in first-seen order
    roles: Vec<String>,
}

impl RoleTable {
    /// Build the table, rejecting authors mapped to two different roles.
    ///
    /// Repeated rows that agree on the role are accepted.
    pub fn from_entries(
        entries: impl IntoIterator<Item = RoleEntry>,
    ) -> Result<Self, AnalysisError> {
        let mut table = Self::default();
        for entry in entries {
            if let Some(existing) = table.roles_by_author.get(&entry.author) {
                if *existing != entry.role {
                    return Err(AnalysisError::DuplicateRoleMapping {
                        author: entry.author,
                        first: existing.clone(),
                        second: entry.role,
                    });
                }
                continue;
            }
            if !table.roles.contains(&entry.role) {
                table.roles.push(entry.role.clone());
            }
            table.roles_by_author.insert(entry.author, entry.role);
        }
        Ok(table)
    }

    pub fn role_of(&self, author: &str) -> Option<&str> {
        self.roles_by_author.get(author).map(String::as_str)
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn len(&self) -> usize {
        self.roles_by_author.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles_by_author.is_empty()
    }
}

/// Result of joining messages against a [`RoleTable`]
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    pub messages: Vec<RoledMessage>,
    /// Messages dropped because their author has no role
    pub dropped: usize,
    /// Authors without a role, sorted
    pub unrostered_authors: Vec<String>,
}

impl JoinOutcome {
    /// Share of input rows kept, as a percentage
    pub fn retained_pct(&self) -> f64 {
        let total = self.messages.len() + self.dropped;
        if total == 0 { 100.0 } else { self.messages.len() as f64 / total as f64 * 100.0 }
    }
}

/// Attach roles to enriched messages, keeping input order.
///
/// `prev_role` is the role of the previous message's author as recorded during enrichment,
/// which may be an author that is itself dropped from the output.
pub fn join(messages: Vec<EnrichedMessage>, roles: &RoleTable) -> JoinOutcome {
    let mut kept = Vec::with_capacity(messages.len());
    let mut dropped = 0;
    let mut unrostered: Vec<String> = Vec::new();

    for message in messages {
        let Some(role) = roles.role_of(&message.author) else {
            dropped += 1;
            if !unrostered.contains(&message.author) {
                unrostered.push(message.author.clone());
            }
            continue;
        };
        let prev_role = message.prev_author().and_then(|a| roles.role_of(a)).map(str::to_string);
        kept.push(RoledMessage { role: role.to_string(), prev_role, message });
    }
    unrostered.sort();

    let outcome = JoinOutcome { messages: kept, dropped, unrostered_authors: unrostered };
    info!(
        "Role join kept {} messages ({:.1}% of rows), dropped {} from {} unrostered author(s)",
        outcome.messages.len(),
        outcome.retained_pct(),
        outcome.dropped,
        outcome.unrostered_authors.len()
    );
    debug!("Unrostered authors: {:?}", outcome.unrostered_authors);
    outcome
}
