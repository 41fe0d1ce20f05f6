//! Reaction-time distribution over latency buckets.
//!
//! Buckets are closed on the left: a latency of exactly 1.0 minute belongs to the bucket
//! starting at 1, so `<1 min` holds only replies faster than a minute. The last bucket is
//! also closed on the right so the slowest reply, which sets the final edge, is counted.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AnalysisError;
use crate::models::{ReplyRecord, RoledMessage, collect_replies};

pub const DEFAULT_BOUNDARIES: [f64; 8] = [0.0, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 240.0];

const CUMULATIVE_TOLERANCE: f64 = 1e-9;

/// Validated, strictly ascending latency bucket edges in minutes
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyBoundaries {
    edges: Vec<f64>,
}

impl LatencyBoundaries {
    pub fn new(edges: Vec<f64>) -> Result<Self, AnalysisError> {
        let invalid = |reason: &str| AnalysisError::InvalidBoundaries {
            boundaries: edges.clone(),
            reason: reason.to_string(),
        };

        if edges.len() < 2 {
            return Err(invalid("at least two boundaries are required"));
        }
        if edges.iter().any(|e| !e.is_finite()) {
            return Err(invalid("boundaries must be finite"));
        }
        if edges[0] < 0.0 {
            return Err(invalid("the first boundary must not be negative"));
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(invalid("boundaries must be strictly ascending"));
        }
        Ok(Self { edges })
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Edges extended with the maximum observed latency when it lies past the last edge
    fn covering(&self, max_observed: f64) -> Vec<f64> {
        let mut edges = self.edges.clone();
        if let Some(&last) = edges.last()
            && max_observed > last
        {
            edges.push(max_observed);
        }
        edges
    }
}

impl Default for LatencyBoundaries {
    fn default() -> Self {
        Self { edges: DEFAULT_BOUNDARIES.to_vec() }
    }
}

/// Index of the bucket containing `minutes`, where bucket `i` is `[edges[i], edges[i + 1])`
/// and the last bucket also contains the final edge
pub fn bucket_index(edges: &[f64], minutes: f64) -> Option<usize> {
    let (&first, &last) = (edges.first()?, edges.last()?);
    if minutes.is_nan() || minutes < first || minutes > last || edges.len() < 2 {
        return None;
    }
    if minutes == last {
        return Some(edges.len() - 2);
    }
    edges.windows(2).position(|w| minutes >= w[0] && minutes < w[1])
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketStat {
    pub label: String,
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    /// Fraction of all replies, 0.0 to 1.0
    pub percentage: f64,
    pub cumulative_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionReport {
    pub replies: Vec<ReplyRecord>,
    /// One entry per bucket in bucket order, empty buckets included
    pub buckets: Vec<BucketStat>,
    pub total_replies: usize,
}

impl ReactionReport {
    pub fn bucket_counts(&self) -> Vec<usize> {
        self.buckets.iter().map(|b| b.count).collect()
    }
}

fn format_minutes(value: f64) -> String {
    if value.fract() == 0.0 { format!("{}", value as i64) } else { format!("{:.1}", value) }
}

fn bucket_label(index: usize, lower: f64, upper: f64, open_ended: bool) -> String {
    if open_ended {
        format!(">{} min", format_minutes(lower))
    } else if index == 0 && lower == 0.0 {
        format!("<{} min", format_minutes(upper))
    } else {
        format!("{}-{} min", format_minutes(lower), format_minutes(upper))
    }
}

/// Reaction-time analysis over genuine cross-author replies
#[derive(Debug, Clone, Default)]
pub struct ReactionAnalyzer {
    boundaries: LatencyBoundaries,
}

impl ReactionAnalyzer {
    pub fn new(boundaries: LatencyBoundaries) -> Self {
        Self { boundaries }
    }

    /// Bucket reply latencies and compute count, share and cumulative share per bucket.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::InsufficientData`] when the input contains no replies
    /// - [`AnalysisError::UnbucketedLatency`] when a latency lies below the first boundary
    ///   (a reply timestamped before the message it follows)
    pub fn analyze(&self, messages: &[RoledMessage]) -> Result<ReactionReport, AnalysisError> {
        let replies = collect_replies(messages);
        let total_replies = replies.len();
        if total_replies == 0 {
            return Err(AnalysisError::InsufficientData(format!(
                "no replies among {} messages, latency percentages are undefined",
                messages.len()
            )));
        }

        let max_observed =
            replies.iter().map(|r| r.minutes_since_prev).fold(f64::NEG_INFINITY, f64::max);
        let edges = self.boundaries.covering(max_observed);
        let fixed_len = self.boundaries.edges().len();

        let mut counts = vec![0usize; edges.len() - 1];
        for reply in &replies {
            let bucket = bucket_index(&edges, reply.minutes_since_prev).ok_or(
                AnalysisError::UnbucketedLatency {
                    index: reply.index,
                    minutes: reply.minutes_since_prev,
                },
            )?;
            counts[bucket] += 1;
        }

        let mut cumulative = 0.0;
        let buckets: Vec<BucketStat> = counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let percentage = count as f64 / total_replies as f64;
                cumulative += percentage;
                let (lower, upper) = (edges[i], edges[i + 1]);
                BucketStat {
                    label: bucket_label(i, lower, upper, i + 1 >= fixed_len),
                    lower,
                    upper,
                    count,
                    percentage,
                    cumulative_percentage: cumulative,
                }
            })
            .collect();

        debug_assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), total_replies);
        debug_assert!(buckets
            .last()
            .is_some_and(|b| (b.cumulative_percentage - 1.0).abs() < CUMULATIVE_TOLERANCE));
        debug!("Bucketed {} replies into {} latency buckets", total_replies, buckets.len());

        Ok(ReactionReport { replies, buckets, total_replies })
    }
}
