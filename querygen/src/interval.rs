//! Time intervals and random sub-window sampling.
//!
//! A [`TimeInterval`] is an immutable half-open span `[start, end)` of
//! nanosecond timestamps, the same representation the rest of the crate uses
//! for instants. Every derived window is a new value; nothing here mutates in
//! place.
//!
//! # Example
//!
//! ```rust
//! use querygen::TimeInterval;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let t0 = 1_451_606_400_000_000_000u64; // 2016-01-01T00:00:00Z
//! let horizon = TimeInterval::new(t0, t0 + 2 * 3_600_000_000_000)?;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let window = horizon.rand_window(Duration::from_secs(3600), &mut rng)?;
//! assert!(horizon.contains(&window));
//! assert_eq!(window.span(), Duration::from_secs(3600));
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::{IntervalError, InvalidParameter, Result};

/// Immutable half-open time span `[start, end)` in nanoseconds since the epoch.
///
/// The invariant `start < end` is established by [`TimeInterval::new`] and
/// cannot be broken afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeInterval {
    start: u64,
    end: u64,
}

impl TimeInterval {
    /// Creates a new interval.
    ///
    /// # Errors
    ///
    /// Returns [`IntervalError::BadTimeOrder`] if `start` is not strictly
    /// before `end`.
    pub fn new(start: u64, end: u64) -> Result<Self> {
        if start >= end {
            return Err(IntervalError::BadTimeOrder { start, end }.into());
        }
        Ok(Self { start, end })
    }

    /// Returns the inclusive start, in nanoseconds.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Returns the exclusive end, in nanoseconds.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Returns the length of the interval.
    pub fn span(&self) -> Duration {
        Duration::from_nanos(self.end - self.start)
    }

    /// Returns `true` if `other` lies entirely within this interval.
    pub fn contains(&self, other: &TimeInterval) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Draws a window of exactly `window` length at a uniformly random offset.
    ///
    /// The offset is drawn from `[0, span - window]`, so the result never
    /// extends past [`end`](Self::end). Each call consumes the stream once;
    /// repeated calls give independent offsets.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameter::ZeroWindow`] for a zero-length window and
    /// [`InvalidParameter::WindowExceedsHorizon`] if the window is longer than
    /// this interval.
    pub fn rand_window<R: Rng + ?Sized>(&self, window: Duration, rng: &mut R) -> Result<Self> {
        let window_ns = self.checked_window(window)?;
        let max_offset = (self.end - self.start) - window_ns;
        let offset = rng.gen_range(0..=max_offset);
        let start = self.start + offset;

        Ok(Self {
            start,
            end: start + window_ns,
        })
    }

    /// Returns the final `window` of this interval, `[end - window, end)`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`rand_window`](Self::rand_window).
    pub fn tail_window(&self, window: Duration) -> Result<Self> {
        let window_ns = self.checked_window(window)?;
        Ok(Self {
            start: self.end - window_ns,
            end: self.end,
        })
    }

    /// Formats the start instant as RFC 3339.
    pub fn start_string(&self) -> String {
        format_timestamp(self.start)
    }

    /// Formats the end instant as RFC 3339.
    pub fn end_string(&self) -> String {
        format_timestamp(self.end)
    }

    fn checked_window(&self, window: Duration) -> Result<u64> {
        if window.is_zero() {
            return Err(InvalidParameter::ZeroWindow.into());
        }

        let span_ns = self.end - self.start;
        match u64::try_from(window.as_nanos()) {
            Ok(window_ns) if window_ns <= span_ns => Ok(window_ns),
            _ => Err(InvalidParameter::WindowExceedsHorizon {
                window,
                span: self.span(),
            }
            .into()),
        }
    }
}

/// Formats a nanosecond timestamp as RFC 3339.
///
/// Falls back to the raw nanosecond count for instants `time` cannot
/// represent.
pub fn format_timestamp(ns: u64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ns))
        .ok()
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_else(|| ns.to_string())
}

/// Parses an RFC 3339 timestamp into nanoseconds since the epoch.
///
/// # Errors
///
/// Returns a description of the problem if the string is not RFC 3339 or
/// lies before the epoch.
pub fn parse_timestamp(s: &str) -> std::result::Result<u64, String> {
    let t = OffsetDateTime::parse(s.trim(), &Rfc3339).map_err(|e| e.to_string())?;
    u64::try_from(t.unix_timestamp_nanos()).map_err(|_| "timestamp precedes the epoch".to_string())
}

/// Formats a duration compactly for human-readable labels (`1m`, `12h`, `1d`).
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if d.subsec_nanos() != 0 || secs == 0 {
        format!("{d:?}")
    } else if secs.is_multiple_of(86400) {
        format!("{}d", secs / 86400)
    } else if secs.is_multiple_of(3600) {
        format!("{}h", secs / 3600)
    } else if secs.is_multiple_of(60) {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}
