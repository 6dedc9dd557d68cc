//! Hex dump dialects
//!
//! A dialect describes the character sets and column width of one hex dump
//! flavour. The record regex is derived from it, so adding a dialect means
//! adding a preset here rather than a new parser.

use hexfilter_types::DialectKind;

use crate::error::{Error, Result};

/// Number of address digits in every supported dialect
pub const ADDRESS_DIGITS: usize = 8;

const ASCII_PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;

/// Character sets and alignment for one hex dump flavour
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dialect {
    /// Regex character class body for address digits, e.g. `0-9a-f`
    pub address_digits: String,

    /// Characters allowed in the hex column, including the separator
    pub valid_hex_chars: String,

    /// Characters allowed in the ASCII column
    pub valid_ascii_chars: String,

    /// Widest hex column, in values per line
    pub max_hex_values: usize,
}

impl Dialect {
    /// Linux kernel `print_hex_dump` output
    ///
    /// The kernel prints lowercase hex only and at most 16 values per line.
    pub fn linux_kernel() -> Self {
        Self {
            address_digits: "0-9a-f".to_string(),
            valid_hex_chars: "0123456789abcdef ".to_string(),
            valid_ascii_chars: printable_ascii(false),
            max_hex_values: 16,
        }
    }

    /// Mixed-case hex with blanks allowed in the ASCII column
    pub fn generic() -> Self {
        Self {
            address_digits: "0-9a-fA-F".to_string(),
            valid_hex_chars: "0123456789abcdefABCDEF ".to_string(),
            valid_ascii_chars: printable_ascii(true),
            max_hex_values: 16,
        }
    }

    pub fn from_kind(kind: DialectKind) -> Self {
        match kind {
            DialectKind::Linux => Self::linux_kernel(),
            DialectKind::Generic => Self::generic(),
        }
    }

    /// Override the alignment width
    pub fn with_max_hex_values(mut self, max_hex_values: usize) -> Self {
        self.max_hex_values = max_hex_values;
        self
    }

    /// Reject settings that could never produce a record
    pub fn validate(&self) -> Result<()> {
        if self.address_digits.is_empty()
            || !self
                .address_digits
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(Error::InvalidDialect(format!(
                "address digit class '{}' must be a non-empty range of ASCII alphanumerics",
                self.address_digits
            )));
        }
        if self.valid_hex_chars.trim().is_empty() {
            return Err(Error::InvalidDialect(
                "hex character set has no digits".to_string(),
            ));
        }
        if self.max_hex_values == 0 {
            return Err(Error::InvalidDialect(
                "max_hex_values must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the record regex for this dialect
    ///
    /// Capture groups: `timestamp` (timestamped logs only), `description`,
    /// `address` and `tail`.
    pub fn record_pattern(&self, has_timestamp: bool) -> String {
        let address = format!(
            r"(?P<address>[{}]{{{}}}): (?P<tail>.+)",
            self.address_digits, ADDRESS_DIGITS
        );
        if has_timestamp {
            format!(
                r"^.*?\[\s*(?P<timestamp>[0-9]+\.[0-9]+)\s*\]\s+(?P<description>.*){}",
                address
            )
        } else {
            format!(r"^(?P<description>.*){}", address)
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::linux_kernel()
    }
}

/// ASCII letters, digits and punctuation, optionally with the blank
fn printable_ascii(with_space: bool) -> String {
    let mut chars: String = ('0'..='9')
        .chain('a'..='z')
        .chain('A'..='Z')
        .collect();
    chars.push_str(ASCII_PUNCTUATION);
    if with_space {
        chars.push(' ');
    }
    chars
}
