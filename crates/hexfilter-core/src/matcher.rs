use regex::Regex;
use std::collections::HashSet;

use crate::dialect::Dialect;
use crate::error::{Error, Result};

/// Columns of a recognised record, borrowed from the input line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawRecord<'l> {
    pub timestamp: Option<&'l str>,
    pub description: &'l str,
    pub address: &'l str,
    pub hex: &'l str,
    pub ascii: &'l str,
}

/// Why a line with the record shape was still rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// No double blank between the hex and ASCII columns
    MissingAsciiColumn,
    /// A character outside the dialect's hex set
    InvalidHex,
    /// A character outside the dialect's ASCII set
    InvalidAscii,
}

/// Result of matching one line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchOutcome<'l> {
    /// The line does not look like a dump record at all
    NoMatch,
    /// The line has the record shape but its data columns are malformed
    Rejected(Rejection),
    /// A complete, validated record
    Record(RawRecord<'l>),
}

/// Recognises dump records for one dialect
#[derive(Clone, Debug)]
pub struct RecordMatcher {
    regex: Regex,
    hex_chars: HashSet<char>,
    ascii_chars: HashSet<char>,
}

impl RecordMatcher {
    pub fn new(dialect: &Dialect, has_timestamp: bool) -> Result<Self> {
        dialect.validate()?;
        let regex = Regex::new(&dialect.record_pattern(has_timestamp))
            .map_err(Error::InvalidRecordPattern)?;

        Ok(Self {
            regex,
            hex_chars: dialect.valid_hex_chars.chars().collect(),
            ascii_chars: dialect.valid_ascii_chars.chars().collect(),
        })
    }

    /// Match a line with its terminator already removed
    pub fn match_line<'l>(&self, line: &'l str) -> MatchOutcome<'l> {
        let Some(caps) = self.regex.captures(line) else {
            return MatchOutcome::NoMatch;
        };
        let (Some(address), Some(tail)) = (caps.name("address"), caps.name("tail")) else {
            return MatchOutcome::NoMatch;
        };

        // The hex and ASCII columns are always separated by at least two blanks
        let Some((hex, ascii)) = tail.as_str().split_once("  ") else {
            return MatchOutcome::Rejected(Rejection::MissingAsciiColumn);
        };
        if !hex.chars().all(|c| self.hex_chars.contains(&c)) {
            return MatchOutcome::Rejected(Rejection::InvalidHex);
        }
        let ascii = ascii.trim_start_matches(' ');
        if !ascii.chars().all(|c| self.ascii_chars.contains(&c)) {
            return MatchOutcome::Rejected(Rejection::InvalidAscii);
        }

        MatchOutcome::Record(RawRecord {
            timestamp: caps.name("timestamp").map(|m| m.as_str()),
            description: caps.name("description").map_or("", |m| m.as_str().trim()),
            address: address.as_str(),
            hex,
            ascii,
        })
    }
}
