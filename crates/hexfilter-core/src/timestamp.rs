//! Inter-record time deltas
//!
//! The tracker remembers the timestamp of the previous accepted record and
//! turns each new absolute timestamp into a delta, optionally rounded to a
//! fixed number of microseconds.

const MICROS_PER_SEC: f64 = 1_000_000.0;

/// Absolute timestamp and the delta derived from it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimestampUpdate {
    pub absolute: f64,
    pub delta: f64,
}

/// Tracks the previous record's timestamp for one stream
#[derive(Clone, Debug, Default)]
pub struct TimestampTracker {
    previous: Option<f64>,
    rounding_micros: u64,
}

impl TimestampTracker {
    pub fn new(rounding_micros: u64) -> Self {
        Self {
            previous: None,
            rounding_micros,
        }
    }

    /// Parse a raw timestamp and advance the tracker
    ///
    /// Returns `None` (leaving the tracker untouched) when `raw` is not a
    /// finite number. The first record of a stream always has delta 0.
    pub fn update(&mut self, raw: &str) -> Option<TimestampUpdate> {
        let absolute = parse_timestamp(raw)?;
        let delta = match self.previous {
            Some(previous) => round_delta(absolute - previous, self.rounding_micros),
            None => 0.0,
        };
        self.previous = Some(absolute);

        Some(TimestampUpdate { absolute, delta })
    }

    /// Timestamp of the last accepted record
    pub fn previous(&self) -> Option<f64> {
        self.previous
    }
}

/// Parse a kernel style `seconds.micros` timestamp
pub fn parse_timestamp(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Round a positive delta to the nearest multiple of `step_micros`
///
/// Ties round up. Zero and negative deltas pass through unchanged, so a
/// backwards jump in the log stays visible.
pub fn round_delta(delta: f64, step_micros: u64) -> f64 {
    if delta <= 0.0 || step_micros == 0 {
        return delta;
    }

    let step = step_micros as f64;
    let step_secs = step / MICROS_PER_SEC;
    let floored_steps = (delta * MICROS_PER_SEC / step).floor();
    let floored = step_secs * floored_steps;
    let remainder_micros = (delta - floored) * MICROS_PER_SEC;

    if remainder_micros < step / 2.0 {
        floored
    } else {
        floored + step_secs
    }
}
