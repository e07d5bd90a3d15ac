//! Frame count, frame rate and timestamp parsing, and clip boundary math.
//!
//! Everything here is pure: user text in, validated numbers or boundaries out.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tbtools_common::{Error, Result};

static FRAME_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9]+)\s*$").expect("valid frame count regex"));

static TIMESTAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{1,2}):([0-9]{2})$").expect("valid timestamp regex"));

/// Parse a positive frame count such as `"24"` or `" 120 "`.
///
/// # Examples
///
/// ```
/// use tbtools_av::timecode::parse_frame_count;
///
/// assert_eq!(parse_frame_count("24").unwrap(), 24);
/// assert!(parse_frame_count("0").is_err());
/// assert!(parse_frame_count("-5").is_err());
/// ```
pub fn parse_frame_count(text: &str) -> Result<u64> {
    let caps = FRAME_COUNT_RE
        .captures(text)
        .ok_or_else(|| Error::invalid_input(format!("invalid frame count: {text:?}")))?;

    let frames: u64 = caps[1]
        .parse()
        .map_err(|_| Error::invalid_input(format!("frame count out of range: {text:?}")))?;

    if frames == 0 {
        return Err(Error::invalid_input("frame count must be greater than zero"));
    }
    Ok(frames)
}

/// Parse a frame rate given as a decimal (`"23.976"`) or a rational
/// (`"24000/1001"`), the form ffprobe reports.
///
/// # Examples
///
/// ```
/// use tbtools_av::timecode::parse_frame_rate;
///
/// assert_eq!(parse_frame_rate("30/1").unwrap(), 30.0);
/// assert_eq!(parse_frame_rate("25").unwrap(), 25.0);
/// assert!(parse_frame_rate("24/0").is_err());
/// ```
pub fn parse_frame_rate(text: &str) -> Result<f64> {
    let text = text.trim();
    let invalid = || Error::invalid_input(format!("invalid frame rate: {text:?}"));

    let rate = match text.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().map_err(|_| invalid())?;
            let den: f64 = den.trim().parse().map_err(|_| invalid())?;
            if den == 0.0 {
                return Err(Error::invalid_input(format!(
                    "frame rate has a zero denominator: {text:?}"
                )));
            }
            num / den
        }
        None => text.parse().map_err(|_| invalid())?,
    };

    if !rate.is_finite() || rate <= 0.0 {
        return Err(invalid());
    }
    Ok(rate)
}

/// Parse an `M:SS` / `MM:SS` timestamp into whole seconds.
///
/// Seconds must be below 60.
///
/// # Examples
///
/// ```
/// use tbtools_av::timecode::parse_timestamp;
///
/// assert_eq!(parse_timestamp("1:05").unwrap(), 65);
/// assert_eq!(parse_timestamp("12:00").unwrap(), 720);
/// assert!(parse_timestamp("1:99").is_err());
/// ```
pub fn parse_timestamp(text: &str) -> Result<u64> {
    let caps = TIMESTAMP_RE
        .captures(text)
        .ok_or_else(|| Error::invalid_input(format!("invalid timestamp (expected MM:SS): {text:?}")))?;

    // Both groups are 1-2 ASCII digits.
    let minutes: u64 = caps[1].parse().unwrap_or_default();
    let seconds: u64 = caps[2].parse().unwrap_or_default();

    if seconds >= 60 {
        return Err(Error::invalid_input(format!(
            "seconds must be below 60: {text:?}"
        )));
    }
    Ok(minutes * 60 + seconds)
}

/// Split multi-line user input into trimmed, non-empty entries.
pub fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// A half-open `[start, end)` range within the master video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "unit", rename_all = "lowercase")]
pub enum ClipBoundary {
    /// Frame indices, counted from frame 0.
    Frames { start: u64, end: u64 },
    /// Whole seconds.
    Seconds { start: u64, end: u64 },
}

impl ClipBoundary {
    /// Start of the range, in its own unit.
    pub fn start(&self) -> u64 {
        match *self {
            ClipBoundary::Frames { start, .. } | ClipBoundary::Seconds { start, .. } => start,
        }
    }

    /// End of the range (exclusive), in its own unit.
    pub fn end(&self) -> u64 {
        match *self {
            ClipBoundary::Frames { end, .. } | ClipBoundary::Seconds { end, .. } => end,
        }
    }

    /// Length of the range, in its own unit.
    pub fn len(&self) -> u64 {
        self.end() - self.start()
    }

    /// Always false; boundaries are built with `start < end`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build contiguous frame boundaries from per-scene frame counts.
///
/// The first clip starts at frame 0 and each clip starts where the previous
/// one ended.
///
/// # Errors
///
/// [`Error::InvalidInput`] if `counts` is empty or contains a zero.
pub fn frame_boundaries(counts: &[u64]) -> Result<Vec<ClipBoundary>> {
    if counts.is_empty() {
        return Err(Error::invalid_input("at least one frame count is required"));
    }

    let mut start = 0u64;
    counts
        .iter()
        .map(|&frames| {
            if frames == 0 {
                return Err(Error::invalid_input("frame count must be greater than zero"));
            }
            let end = start
                .checked_add(frames)
                .ok_or_else(|| Error::invalid_input("total frame count overflows"))?;
            let boundary = ClipBoundary::Frames { start, end };
            start = end;
            Ok(boundary)
        })
        .collect()
}

/// Build boundaries from consecutive pairs of timestamps (in seconds).
///
/// # Errors
///
/// [`Error::InvalidInput`] if fewer than two timestamps are given or they are
/// not strictly increasing.
pub fn timestamp_boundaries(seconds: &[u64]) -> Result<Vec<ClipBoundary>> {
    if seconds.len() < 2 {
        return Err(Error::invalid_input("at least two timestamps are required"));
    }

    seconds
        .windows(2)
        .map(|pair| {
            let (start, end) = (pair[0], pair[1]);
            if start >= end {
                return Err(Error::invalid_input(format!(
                    "timestamps must be strictly increasing ({start}s then {end}s)"
                )));
            }
            Ok(ClipBoundary::Seconds { start, end })
        })
        .collect()
}
