//! Shared types for hexfilter
//!
//! This crate contains data structures used across multiple hexfilter crates.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Dump Records
// ============================================================================

/// One recognised hex dump line, split into its columns
#[derive(Clone, Debug, PartialEq)]
pub struct DumpRecord {
    /// Absolute timestamp in seconds, if the log carries timestamps
    pub timestamp: Option<f64>,

    /// Seconds since the previous accepted record (0.0 for the first one)
    pub delta: Option<f64>,

    /// Text between the timestamp and the address, trimmed
    pub description: String,

    /// Eight hex digit address
    pub address: String,

    /// Hex column, space separated values
    pub hex: String,

    /// ASCII rendering column, leading blanks removed
    pub ascii: String,
}

impl DumpRecord {
    pub fn new(address: String, hex: String, ascii: String) -> Self {
        Self {
            timestamp: None,
            delta: None,
            description: String::new(),
            address,
            hex,
            ascii,
        }
    }
}

// ============================================================================
// Output Layout
// ============================================================================

/// Column selection for rendered records
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputLayout {
    /// Suppress the timestamp column
    pub skip_timestamp: bool,

    /// Print the absolute timestamp instead of the delta
    pub absolute_timestamp: bool,

    /// Keep the description column
    pub keep_description: bool,

    /// Omit the ASCII column
    pub skip_ascii: bool,
}

// ============================================================================
// Dialect Selection
// ============================================================================

/// Named hex dump flavours
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// Linux kernel `print_hex_dump` output (lowercase hex)
    #[default]
    Linux,
    /// Mixed-case hex and a more permissive ASCII column
    Generic,
}

impl DialectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" | "kernel" => Ok(Self::Linux),
            "generic" => Ok(Self::Generic),
            other => Err(format!(
                "unknown dialect '{}' (expected 'linux' or 'generic')",
                other
            )),
        }
    }
}
