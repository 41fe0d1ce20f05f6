//! Descriptive activity statistics behind the bar charts and the media time series.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::models::message::{month_name, weekday_name};
use crate::models::{EnrichedMessage, RoledMessage};

/// Window of the trailing media-share average, in quarters
pub const ROLLING_WINDOW: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleLength {
    pub role: String,
    pub mean_length: f64,
    /// Messages with text that went into the mean
    pub messages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterShare {
    pub year: i32,
    pub quarter: u32,
    pub messages: usize,
    /// Percentage of messages in the quarter that are media placeholders
    pub media_pct: f64,
    /// Trailing mean of `media_pct` over the last four observed quarters
    pub rolling_avg: Option<f64>,
}

impl QuarterShare {
    pub fn label(&self) -> String {
        format!("{}Q{}", self.year, self.quarter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCount {
    pub label: String,
    pub messages: usize,
}

/// Mean message length per role, longest first.
///
/// Messages without text are left out of the mean rather than counted as zero.
pub fn average_length_per_role(messages: &[RoledMessage]) -> Vec<RoleLength> {
    let mut totals: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for message in messages {
        if let Some(length) = message.message.message_length {
            let entry = totals.entry(message.role.as_str()).or_default();
            entry.0 += length;
            entry.1 += 1;
        }
    }

    let mut lengths: Vec<RoleLength> = totals
        .into_iter()
        .map(|(role, (sum, count))| RoleLength {
            role: role.to_string(),
            mean_length: sum as f64 / count as f64,
            messages: count,
        })
        .collect();
    lengths.sort_by(|a, b| {
        b.mean_length.total_cmp(&a.mean_length).then_with(|| a.role.cmp(&b.role))
    });
    lengths
}

/// Media share per calendar quarter in chronological order, with a trailing rolling mean
pub fn media_share_per_quarter(messages: &[EnrichedMessage]) -> Vec<QuarterShare> {
    let mut per_quarter: BTreeMap<(i32, u32), (usize, usize)> = BTreeMap::new();
    for message in messages {
        let key = (message.calendar.year, message.calendar.quarter());
        let entry = per_quarter.entry(key).or_default();
        entry.0 += 1;
        if message.has_media {
            entry.1 += 1;
        }
    }

    let mut shares: Vec<QuarterShare> = per_quarter
        .into_iter()
        .map(|((year, quarter), (total, media))| QuarterShare {
            year,
            quarter,
            messages: total,
            media_pct: media as f64 / total as f64 * 100.0,
            rolling_avg: None,
        })
        .collect();

    for end in ROLLING_WINDOW..=shares.len() {
        let window = &shares[end - ROLLING_WINDOW..end];
        let mean = window.iter().map(|s| s.media_pct).sum::<f64>() / ROLLING_WINDOW as f64;
        shares[end - 1].rolling_avg = Some(mean);
    }
    shares
}

/// Message counts per weekday, Monday first
pub fn messages_per_weekday(messages: &[EnrichedMessage]) -> Vec<CalendarCount> {
    let mut counts = [0usize; 7];
    for message in messages {
        counts[message.timestamp.date().weekday().num_days_from_monday() as usize] += 1;
    }
    let mut day = chrono::Weekday::Mon;
    counts
        .iter()
        .map(|&count| {
            let entry = CalendarCount { label: weekday_name(day).to_string(), messages: count };
            day = day.succ();
            entry
        })
        .collect()
}

/// Message counts per calendar month, January first
pub fn messages_per_month(messages: &[EnrichedMessage]) -> Vec<CalendarCount> {
    let mut counts = [0usize; 12];
    for message in messages {
        counts[(message.calendar.month_number - 1) as usize] += 1;
    }
    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| CalendarCount {
            label: month_name(i as u32 + 1).to_string(),
            messages: count,
        })
        .collect()
}
