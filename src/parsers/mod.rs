//! Parsers for chat exports and role tables
//!
//! # Error Handling Strategy
//!
//! This module follows a **graceful degradation** approach suitable for CLI tools:
//!
//! - **Individual record failures**: Malformed JSONL lines and CSV rows are logged as warnings
//!   and skipped, so a single bad line does not break the whole load.
//!
//! - **Catastrophic failure detection**: If >50% of records fail to parse, or if >100 consecutive
//!   errors occur, the parser returns an error instead of accepting a badly corrupted file.
//!
//! - **Timestamps are not record failures**: A missing or unparseable timestamp keeps the row
//!   with an absent timestamp. Enrichment rejects it with the row position, because silently
//!   dropping a row would shift the reply adjacency of its neighbours.
//!
//! - **Error propagation**: Uses `anyhow::Result` with file context for I/O and format errors.

pub mod deserializers;
pub mod messages;
pub mod roles;
pub mod tolerance;

pub use messages::{InputFormat, parse_messages_file};
pub use roles::parse_roles_file;
