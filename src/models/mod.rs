//! Data models for chat transcript analysis.
//!
//! - [`Message`] - One raw row of a chat export
//! - [`EnrichedMessage`] - Message plus calendar fields, marker flags and previous-message linkage
//! - [`RoledMessage`] - Enriched message joined with its author's role
//! - [`ReplyRecord`] - A roled message sent by a different author than the one before it
//! - [`RoleEntry`] - One row of the author to role table
//!
//! Raw rows use serde with custom deserializers for timestamps (see `parsers::deserializers`).

pub mod message;
pub mod reply;
pub mod roles;

pub use message::{CalendarFields, EnrichedMessage, Message, PreviousMessage, RoledMessage};
pub use reply::{ReplyRecord, collect_replies};
pub use roles::RoleEntry;
