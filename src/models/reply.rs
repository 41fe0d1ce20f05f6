use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::message::RoledMessage;

/// A roled message whose author differs from the preceding message's author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyRecord {
    /// Position in the roled message sequence
    pub index: usize,
    pub author: String,
    pub prev_author: String,
    pub role: String,
    pub prev_role: Option<String>,
    pub timestamp: NaiveDateTime,
    pub minutes_since_prev: f64,
}

impl ReplyRecord {
    /// Returns `None` for the first message and for same-author follow-ups
    pub fn from_roled(index: usize, message: &RoledMessage) -> Option<Self> {
        if !message.is_reply() {
            return None;
        }
        let previous = message.message.previous.as_ref()?;
        Some(Self {
            index,
            author: message.message.author.clone(),
            prev_author: previous.author.clone(),
            role: message.role.clone(),
            prev_role: message.prev_role.clone(),
            timestamp: message.message.timestamp,
            minutes_since_prev: previous.minutes_since,
        })
    }
}

/// Filter a roled sequence down to its reply records, preserving order
pub fn collect_replies(messages: &[RoledMessage]) -> Vec<ReplyRecord> {
    messages.iter().enumerate().filter_map(|(i, m)| ReplyRecord::from_roled(i, m)).collect()
}
