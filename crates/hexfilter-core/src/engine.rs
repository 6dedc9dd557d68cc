use tracing::{debug, trace};

use hexfilter_types::{DumpRecord, OutputLayout};

use crate::buffer::ContextBuffer;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::filter::DescriptionFilter;
use crate::format::RecordFormatter;
use crate::matcher::{MatchOutcome, RecordMatcher};
use crate::timestamp::TimestampTracker;

/// Pull-based filter interface: feed a line, then collect the output
pub trait DumpFilter {
    /// Feed one raw line, terminator included. Returns true if it held a record.
    fn parse_line(&mut self, line: &str) -> bool;

    /// Formatted form of the record from the last `parse_line`
    ///
    /// Returns `None` if the last line was not a record, or if the record
    /// has already been returned.
    fn formatted_record(&mut self) -> Option<String>;

    /// Buffered context lines, oldest first, or `None` if there are none
    fn drain_context(&mut self) -> Option<String>;
}

/// Settings for one [`HexFilter`]
#[derive(Clone, Debug)]
pub struct HexFilterConfig {
    pub dialect: Dialect,

    /// Whether records carry a `[seconds.micros]` timestamp
    pub has_timestamp: bool,

    pub layout: OutputLayout,

    /// Delta rounding step in microseconds (0 = off)
    pub rounding_micros: u64,

    /// Description patterns, at least one of which must match
    pub include: Vec<String>,

    /// Description patterns, none of which may match
    pub exclude: Vec<String>,

    /// Non-record lines to keep for output before each record
    pub context_lines: usize,
}

impl Default for HexFilterConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            has_timestamp: true,
            layout: OutputLayout::default(),
            rounding_micros: 0,
            include: Vec::new(),
            exclude: Vec::new(),
            context_lines: 0,
        }
    }
}

impl HexFilterConfig {
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Declare that the log has no timestamp field at all
    pub fn without_timestamps(mut self) -> Self {
        self.has_timestamp = false;
        self
    }

    pub fn with_layout(mut self, layout: OutputLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_rounding(mut self, rounding_micros: u64) -> Self {
        self.rounding_micros = rounding_micros;
        self
    }

    pub fn with_include(mut self, patterns: Vec<String>) -> Self {
        self.include = patterns;
        self
    }

    pub fn with_exclude(mut self, patterns: Vec<String>) -> Self {
        self.exclude = patterns;
        self
    }

    pub fn with_context_lines(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }
}

/// Per-stream counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Lines fed in
    pub lines: u64,
    /// Records accepted
    pub records: u64,
    /// Records dropped by the description filter
    pub filtered: u64,
    /// Record-shaped lines with malformed data columns or timestamps
    pub rejected: u64,
}

/// Hex dump extractor for one input stream
///
/// Not thread-safe: every operation takes `&mut self`, so use one filter
/// per stream.
#[derive(Debug)]
pub struct HexFilter {
    matcher: RecordMatcher,
    tracker: TimestampTracker,
    filter: DescriptionFilter,
    context: ContextBuffer,
    formatter: RecordFormatter,
    has_timestamp: bool,

    /// Record from the last `parse_line`, until it is formatted
    pending: Option<DumpRecord>,

    stats: FilterStats,
}

impl HexFilter {
    /// Compile all patterns; invalid configuration fails here
    pub fn new(config: HexFilterConfig) -> Result<Self> {
        let matcher = RecordMatcher::new(&config.dialect, config.has_timestamp)?;
        let filter = DescriptionFilter::new(config.include.as_slice(), config.exclude.as_slice())?;

        let mut layout = config.layout;
        if !config.has_timestamp {
            layout.skip_timestamp = true;
        }

        debug!(
            has_timestamp = config.has_timestamp,
            rounding_micros = config.rounding_micros,
            context_lines = config.context_lines,
            include = ?filter.include_patterns(),
            exclude = ?filter.exclude_patterns(),
            "hex filter configured"
        );

        Ok(Self {
            matcher,
            tracker: TimestampTracker::new(config.rounding_micros),
            filter,
            context: ContextBuffer::new(config.context_lines),
            formatter: RecordFormatter::new(layout, config.dialect.max_hex_values),
            has_timestamp: config.has_timestamp,
            pending: None,
            stats: FilterStats::default(),
        })
    }

    /// Match one raw line and return the record it holds, if any
    ///
    /// Lines that are not accepted records are kept as context.
    pub fn match_line(&mut self, line: &str) -> Option<DumpRecord> {
        self.stats.lines += 1;
        let content = line.trim_end_matches(['\n', '\r']);

        let raw = match self.matcher.match_line(content) {
            MatchOutcome::Record(raw) => raw,
            MatchOutcome::Rejected(reason) => {
                trace!(line = self.stats.lines, ?reason, "malformed dump line");
                self.stats.rejected += 1;
                self.context.push(line);
                return None;
            }
            MatchOutcome::NoMatch => {
                self.context.push(line);
                return None;
            }
        };

        if !self.filter.accepts(raw.description) {
            trace!(
                line = self.stats.lines,
                description = raw.description,
                "record filtered by description"
            );
            self.stats.filtered += 1;
            self.context.push(line);
            return None;
        }

        let mut record = DumpRecord::new(
            raw.address.to_string(),
            raw.hex.to_string(),
            raw.ascii.to_string(),
        );
        record.description = raw.description.to_string();

        if self.has_timestamp {
            let Some(update) = raw.timestamp.and_then(|ts| self.tracker.update(ts)) else {
                trace!(line = self.stats.lines, "unparsable timestamp");
                self.stats.rejected += 1;
                self.context.push(line);
                return None;
            };
            record.timestamp = Some(update.absolute);
            record.delta = Some(update.delta);
        }

        self.stats.records += 1;
        Some(record)
    }

    /// Render a record as one output line, without a trailing newline
    pub fn render(&self, record: &DumpRecord) -> String {
        self.formatter.render(record)
    }

    pub fn stats(&self) -> FilterStats {
        self.stats
    }

    /// Timestamp of the last accepted record
    pub fn previous_timestamp(&self) -> Option<f64> {
        self.tracker.previous()
    }
}

impl DumpFilter for HexFilter {
    fn parse_line(&mut self, line: &str) -> bool {
        self.pending = self.match_line(line);
        self.pending.is_some()
    }

    fn formatted_record(&mut self) -> Option<String> {
        let record = self.pending.take()?;
        Some(self.render(&record))
    }

    fn drain_context(&mut self) -> Option<String> {
        self.context.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn kernel_filter() -> HexFilter {
        HexFilter::new(HexFilterConfig::default()).unwrap()
    }

    #[test]
    fn test_single_record_round_trip() {
        let mut filter = kernel_filter();
        assert!(filter.parse_line("[1.000000] foo 00000010: 01 02 03 04  ....\n"));

        let line = filter.formatted_record().unwrap();
        assert!(line.contains("00000010"));
        assert!(line.contains("01 02 03 04"));
        assert!(line.ends_with("...."));
        assert!(!line.contains("foo"));
        assert_eq!(filter.formatted_record(), None);
    }

    #[test]
    fn test_delta_sequence() {
        let mut filter = kernel_filter();
        let mut out = Vec::new();
        for ts in ["1.000000", "1.000500", "2.000000"] {
            let line = format!("[{}] foo 00000010: 01 02 03 04  ....\n", ts);
            assert!(filter.parse_line(&line));
            out.push(filter.formatted_record().unwrap());
        }
        assert!(out[0].starts_with("[0.000000] "));
        assert!(out[1].starts_with("[0.000500] "));
        assert!(out[2].starts_with("[0.999500] "));
    }

    #[test]
    fn test_absolute_and_rounding() {
        let config = HexFilterConfig::default().with_rounding(1000);
        let mut filter = HexFilter::new(config).unwrap();
        let first = filter.match_line("[1.000000] 00000000: 00  .\n").unwrap();
        let second = filter.match_line("[1.000600] 00000001: 01  .\n").unwrap();
        assert_eq!(first.delta, Some(0.0));
        assert_eq!(format!("{:.6}", second.delta.unwrap()), "0.001000");

        let layout = OutputLayout {
            absolute_timestamp: true,
            ..Default::default()
        };
        let config = HexFilterConfig::default().with_layout(layout).with_rounding(1000);
        let mut filter = HexFilter::new(config).unwrap();
        filter.parse_line("[1.000000] 00000000: 00  .\n");
        filter.parse_line("[1.000600] 00000001: 01  .\n");
        assert!(filter.formatted_record().unwrap().starts_with("[1.000600] "));
    }

    #[test]
    fn test_skip_timestamps_still_tracks() {
        let layout = OutputLayout {
            skip_timestamp: true,
            ..Default::default()
        };
        let mut filter = HexFilter::new(HexFilterConfig::default().with_layout(layout)).unwrap();
        assert!(filter.parse_line("[3.250000] 00000000: 00  .\n"));
        assert!(filter.formatted_record().unwrap().starts_with("00000000: 00"));
        assert_eq!(filter.previous_timestamp(), Some(3.25));
    }

    #[test]
    fn test_bracketed_index_in_description() {
        let layout = OutputLayout {
            keep_description: true,
            ..Default::default()
        };
        let mut filter = HexFilter::new(HexFilterConfig::default().with_layout(layout)).unwrap();
        let record = filter
            .match_line("[   12.500000] ath10k [0] 00000000: 06 00  ..\n")
            .unwrap();
        assert_eq!(record.timestamp, Some(12.5));
        assert_eq!(record.description, "ath10k [0]");

        let next = filter
            .match_line("[   12.750000] ath10k [1] 00000010: 07 00  ..\n")
            .unwrap();
        assert_eq!(next.delta, Some(0.25));
        assert!(filter.render(&next).starts_with("[0.250000] ath10k [1] 00000010: 07 00"));
    }

    #[test]
    fn test_huge_context_capacity() {
        let config = HexFilterConfig::default().with_context_lines(usize::MAX);
        let mut filter = HexFilter::new(config).unwrap();
        assert!(!filter.parse_line("boot\n"));
        assert!(filter.parse_line("[1.000000] 00000000: 00  .\n"));
        assert_eq!(filter.drain_context().as_deref(), Some("boot\n"));
    }

    #[test]
    fn test_description_filter() {
        let config = HexFilterConfig::default().with_include(vec!["sdio".to_string()]);
        let mut filter = HexFilter::new(config).unwrap();
        assert!(filter.parse_line("[1.0] sdio wr 00000000: 06 00  ..\n"));
        assert!(!filter.parse_line("[2.0] usb rd 00000000: 06 00  ..\n"));

        let config = HexFilterConfig::default()
            .with_include(vec!["sdio".to_string()])
            .with_exclude(vec!["sdio".to_string()]);
        let mut filter = HexFilter::new(config).unwrap();
        assert!(!filter.parse_line("[1.0] sdio wr 00000000: 06 00  ..\n"));
        assert_eq!(filter.stats().filtered, 1);
    }

    #[test]
    fn test_filtered_records_do_not_advance_delta() {
        let config = HexFilterConfig::default().with_exclude(vec!["usb".to_string()]);
        let mut filter = HexFilter::new(config).unwrap();
        filter.match_line("[1.0] sdio 00000000: 00  .\n").unwrap();
        assert!(filter.match_line("[1.5] usb 00000000: 00  .\n").is_none());
        let record = filter.match_line("[2.0] sdio 00000010: 00  .\n").unwrap();
        assert_eq!(record.delta, Some(1.0));
    }

    #[test]
    fn test_invalid_hex_is_no_match() {
        let mut filter = kernel_filter();
        assert!(!filter.parse_line("[1.000000] foo 00000010: 01 g1 03 04  ....\n"));
        assert_eq!(filter.formatted_record(), None);
        assert_eq!(filter.stats().rejected, 1);
        assert_eq!(filter.previous_timestamp(), None);
    }

    #[test]
    fn test_context_buffer_fifo() {
        let config = HexFilterConfig::default().with_context_lines(2);
        let mut filter = HexFilter::new(config).unwrap();
        for line in ["A\n", "B\n", "C\n"] {
            assert!(!filter.parse_line(line));
        }
        assert!(filter.parse_line("[1.000000] foo 00000010: 01 02 03 04  ....\n"));
        assert_eq!(filter.drain_context().as_deref(), Some("B\nC\n"));
        assert_eq!(filter.drain_context(), None);
    }

    #[test]
    fn test_no_timestamps_mode() {
        let layout = OutputLayout {
            keep_description: true,
            skip_ascii: true,
            ..Default::default()
        };
        let config = HexFilterConfig::default()
            .without_timestamps()
            .with_layout(layout);
        let mut filter = HexFilter::new(config).unwrap();
        assert!(filter.parse_line("ath10k tx 00000000: 06 00 00 00  ....\n"));
        assert_eq!(
            filter.formatted_record().as_deref(),
            Some("ath10k tx 00000000: 06 00 00 00")
        );
    }

    #[test]
    fn test_second_match_overwrites_pending() {
        let mut filter = kernel_filter();
        assert!(filter.parse_line("[1.0] 00000000: 00  .\n"));
        assert!(filter.parse_line("[2.0] 00000010: 01  .\n"));
        assert!(filter.formatted_record().unwrap().contains("00000010"));
        assert_eq!(filter.formatted_record(), None);

        assert!(filter.parse_line("[3.0] 00000020: 02  .\n"));
        assert!(!filter.parse_line("plain text\n"));
        assert_eq!(filter.formatted_record(), None);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = HexFilterConfig::default().with_exclude(vec!["(".to_string()]);
        assert!(matches!(
            HexFilter::new(config),
            Err(Error::InvalidPattern { .. })
        ));

        let config = HexFilterConfig::default()
            .with_dialect(Dialect::linux_kernel().with_max_hex_values(0));
        assert!(matches!(HexFilter::new(config), Err(Error::InvalidDialect(_))));
    }
}
