use std::io::{BufRead, Write};

use tracing::debug;

use crate::engine::DumpFilter;
use crate::error::Result;

/// Totals for one filtered stream
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub lines_read: u64,
    pub records_written: u64,
}

/// Run every line of `reader` through `filter` and write the output
///
/// Each record is preceded by its drained context block, if any. Invalid
/// UTF-8 is decoded lossily rather than aborting the stream.
pub fn filter_stream<F, R, W>(filter: &mut F, mut reader: R, mut writer: W) -> Result<StreamSummary>
where
    F: DumpFilter + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut summary = StreamSummary::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        summary.lines_read += 1;

        let line = String::from_utf8_lossy(&buf);
        if !filter.parse_line(&line) {
            continue;
        }

        if let Some(context) = filter.drain_context() {
            writer.write_all(context.as_bytes())?;
        }
        if let Some(record) = filter.formatted_record() {
            writeln!(writer, "{}", record)?;
            summary.records_written += 1;
        }
    }

    writer.flush()?;
    debug!(
        lines_read = summary.lines_read,
        records_written = summary.records_written,
        "stream finished"
    );

    Ok(summary)
}
