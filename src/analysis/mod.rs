//! Statistics computed over the roled message stream.
//!
//! - [`reaction`] - Latency buckets for cross-author replies
//! - [`reply_graph`] - Role to role reply matrix and per-role summary
//! - [`activity`] - Message length, media share and calendar counts
//!
//! The reaction and reply-graph analyzers each filter replies on their own, so either can be
//! run and tested without the other.

pub mod activity;
pub mod reaction;
pub mod reply_graph;

pub use reaction::{BucketStat, LatencyBoundaries, ReactionAnalyzer, ReactionReport};
pub use reply_graph::{ReplyGraph, ReplyGraphAnalyzer, RoleSummary};
