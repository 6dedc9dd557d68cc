//! Optional TOML config file
//!
//! Every key mirrors a command line flag. Flags given on the command line
//! win over the file; boolean flags can only switch a behaviour on.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use hexfilter_core::{Dialect, DialectKind, HexFilterConfig, OutputLayout};

use crate::Args;

/// Contents of a hexfilter config file
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub dialect: Option<DialectKind>,
    pub skip_timestamps: bool,
    pub abs_timestamps: bool,
    pub rounding: Option<u64>,
    pub no_timestamps: bool,
    pub desc_str: Vec<String>,
    pub desc_str_invert: Vec<String>,
    pub keep_desc_str: bool,
    pub keep_non_hex_before: Option<usize>,
    pub skip_ascii: bool,
    /// Alignment width override for the selected dialect
    pub max_hex_values: Option<usize>,
}

impl FileConfig {
    /// Load and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Combine with command line arguments into the filter settings
    pub fn merge(self, args: &Args) -> HexFilterConfig {
        let kind = args.dialect.or(self.dialect).unwrap_or_default();
        let mut dialect = Dialect::from_kind(kind);
        if let Some(max) = self.max_hex_values {
            dialect = dialect.with_max_hex_values(max);
        }

        let layout = OutputLayout {
            skip_timestamp: args.skip_timestamps || self.skip_timestamps,
            absolute_timestamp: args.abs_timestamps || self.abs_timestamps,
            keep_description: args.keep_desc_str || self.keep_desc_str,
            skip_ascii: args.skip_ascii || self.skip_ascii,
        };

        let include = if args.desc_str.is_empty() {
            self.desc_str
        } else {
            args.desc_str.clone()
        };
        let exclude = if args.desc_str_invert.is_empty() {
            self.desc_str_invert
        } else {
            args.desc_str_invert.clone()
        };

        let mut config = HexFilterConfig::default()
            .with_dialect(dialect)
            .with_layout(layout)
            .with_rounding(args.rounding.or(self.rounding).unwrap_or(0))
            .with_include(include)
            .with_exclude(exclude)
            .with_context_lines(
                args.keep_non_hex_before
                    .or(self.keep_non_hex_before)
                    .unwrap_or(0),
            );
        if args.no_timestamps || self.no_timestamps {
            config = config.without_timestamps();
        }
        config
    }
}
