//! Chat Insights - Reply dynamics and writing style in group chat exports
//!
//! This library turns an ordered chat export and an author to role table into:
//!
//! - Enriched messages with calendar fields, media/payment flags and previous-message linkage
//! - A reaction-time distribution over latency buckets for cross-author replies
//! - A role to role reply matrix with per-role author and message counts
//! - A 2-D projection of per-author text fragments for stylometric clustering
//!
//! # Example
//!
//! ```no_run
//! use chat_insights::{load_config, run_pipeline};
//!
//! let config = load_config(None)?;
//! let report = run_pipeline(&config)?;
//! println!("Dropped {} messages without a role", report.stats.dropped_messages);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod analysis;
pub mod cli;
pub mod clustering;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod models;
pub mod parsers;
pub mod pipeline;
pub mod report;
pub mod roles;
pub mod utils;

// Re-export commonly used types
pub use analysis::{ReactionAnalyzer, ReplyGraphAnalyzer};
pub use clustering::{ReductionMethod, cluster};
pub use config::{Config, load_config};
pub use enrichment::enrich;
pub use error::AnalysisError;
pub use models::{EnrichedMessage, Message, RoledMessage};
pub use parsers::{parse_messages_file, parse_roles_file};
pub use pipeline::{PipelineReport, run_pipeline};
pub use roles::{RoleTable, join};
pub use utils::format_path_with_tilde;
