use unicode_width::UnicodeWidthStr;

use hexfilter_types::{DumpRecord, OutputLayout};

/// Renders records as aligned output lines
#[derive(Clone, Debug)]
pub struct RecordFormatter {
    layout: OutputLayout,
    max_hex_values: usize,
}

impl RecordFormatter {
    pub fn new(layout: OutputLayout, max_hex_values: usize) -> Self {
        Self {
            layout,
            max_hex_values,
        }
    }

    /// Render one record without a trailing newline
    ///
    /// The ASCII column starts at the same offset for every line, whatever
    /// the number of hex values, as long as the timestamp and description
    /// columns have the same width.
    pub fn render(&self, record: &DumpRecord) -> String {
        let mut out = String::new();

        if let Some(seconds) = self.timestamp_column(record) {
            out.push_str(&format!("[{:.6}] ", seconds));
        }

        if self.layout.keep_description && !record.description.is_empty() {
            out.push_str(&record.description);
            out.push(' ');
        }

        let column_end =
            out.width() + record.address.width() + 1 + self.max_hex_values * 3 + 2;

        out.push_str(&format!("{}: {}", record.address, record.hex));

        if self.layout.skip_ascii {
            return out;
        }

        // Over-long hex columns still get a separator
        let padding = column_end.saturating_sub(out.width()).max(2);
        out.extend(std::iter::repeat_n(' ', padding));
        out.push_str(&record.ascii);
        out
    }

    fn timestamp_column(&self, record: &DumpRecord) -> Option<f64> {
        if self.layout.skip_timestamp {
            return None;
        }
        if self.layout.absolute_timestamp {
            record.timestamp
        } else {
            record.delta
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DumpRecord {
        let mut record = DumpRecord::new(
            "00000010".to_string(),
            "01 02 03 04".to_string(),
            "....".to_string(),
        );
        record.timestamp = Some(1.5);
        record.delta = Some(0.0005);
        record.description = "sdio wr".to_string();
        record
    }

    #[test]
    fn test_render_delta() {
        let formatter = RecordFormatter::new(OutputLayout::default(), 16);
        let line = formatter.render(&sample());
        assert!(line.starts_with("[0.000500] 00000010: 01 02 03 04 "));
        assert!(line.ends_with("...."));
        // "[0.000500] " + address + ": " + 48 hex chars + 2 blanks
        assert_eq!(line.find("...."), Some(11 + 8 + 1 + 48 + 2));
    }

    #[test]
    fn test_render_absolute_with_description() {
        let layout = OutputLayout {
            absolute_timestamp: true,
            keep_description: true,
            ..Default::default()
        };
        let formatter = RecordFormatter::new(layout, 16);
        let line = formatter.render(&sample());
        assert!(line.starts_with("[1.500000] sdio wr 00000010: 01 02 03 04"));
        assert_eq!(line.find("...."), Some(11 + 8 + 8 + 1 + 48 + 2));
    }

    #[test]
    fn test_ascii_column_is_aligned() {
        let formatter = RecordFormatter::new(OutputLayout::default(), 16);
        let mut full = sample();
        full.hex = "00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f".to_string();
        full.ascii = "................".to_string();
        let short = sample();

        let full_line = formatter.render(&full);
        let short_line = formatter.render(&short);
        assert_eq!(full_line.find("...."), short_line.find("...."));
        assert_eq!(short_line.find("...."), Some(70));
        assert!(full_line.contains("0f  ...."));
    }

    #[test]
    fn test_render_skip_timestamp_and_ascii() {
        let layout = OutputLayout {
            skip_timestamp: true,
            skip_ascii: true,
            ..Default::default()
        };
        let formatter = RecordFormatter::new(layout, 16);
        assert_eq!(formatter.render(&sample()), "00000010: 01 02 03 04");
    }

    #[test]
    fn test_render_without_timestamp_field() {
        let formatter = RecordFormatter::new(OutputLayout::default(), 4);
        let mut record = sample();
        record.timestamp = None;
        record.delta = None;
        assert_eq!(formatter.render(&record), "00000010: 01 02 03 04  ....");
    }

    #[test]
    fn test_empty_description_not_printed() {
        let layout = OutputLayout {
            keep_description: true,
            skip_timestamp: true,
            skip_ascii: true,
            ..Default::default()
        };
        let formatter = RecordFormatter::new(layout, 16);
        let mut record = sample();
        record.description.clear();
        assert_eq!(formatter.render(&record), "00000010: 01 02 03 04");
    }

    #[test]
    fn test_wide_description_alignment() {
        let layout = OutputLayout {
            skip_timestamp: true,
            keep_description: true,
            ..Default::default()
        };
        let formatter = RecordFormatter::new(layout, 4);
        let mut record = sample();
        record.description = "通信".to_string();
        // Two double-width characters occupy four columns
        let line = formatter.render(&record);
        let ascii_start = line.find("....").unwrap();
        assert_eq!(line[..ascii_start].width(), 5 + 8 + 1 + 12 + 2);
    }
}
