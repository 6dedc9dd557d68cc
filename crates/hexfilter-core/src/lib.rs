//! Hex dump extraction for hexfilter
//!
//! This crate recognises hex dump records embedded in log text, tracks the
//! time between them, filters them by description and renders them as
//! aligned output lines.

mod buffer;
mod dialect;
mod engine;
mod error;
mod filter;
mod format;
mod matcher;
mod stream;
mod timestamp;

pub use buffer::ContextBuffer;
pub use dialect::{ADDRESS_DIGITS, Dialect};
pub use engine::{DumpFilter, FilterStats, HexFilter, HexFilterConfig};
pub use error::{Error, Result};
pub use filter::DescriptionFilter;
pub use format::RecordFormatter;
pub use matcher::{MatchOutcome, RawRecord, RecordMatcher, Rejection};
pub use stream::{StreamSummary, filter_stream};
pub use timestamp::{TimestampTracker, TimestampUpdate, parse_timestamp, round_delta};

// Re-export types used in our public API
pub use hexfilter_types::{DialectKind, DumpRecord, OutputLayout};
