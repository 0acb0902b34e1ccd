//! Stream OpenClaw and inber session transcripts in a readable format.
//!
//! Both logging conventions (nested `message` records and flat events) are
//! normalized into one event shape and rendered as coloured terminal text,
//! with running token and cost totals.

pub mod config;
pub mod listing;
pub mod session_log;
pub mod stream;

pub use session_log::{process_line, ProcessedLine, RenderOptions, Usage};
