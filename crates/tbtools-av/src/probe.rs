//! FFprobe queries against the master video.
//!
//! Only two facts are needed to plan a split: the primary video stream's
//! frame rate and whether any audio stream exists. Both are plain-text
//! ffprobe queries rather than a full JSON probe.

use std::path::Path;

use serde::Serialize;
use tbtools_common::{Error, Result};

use crate::command::ToolCommand;
use crate::timecode::parse_frame_rate;

/// What the split planner needs to know about the master.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MediaSummary {
    /// Frames per second of the primary video stream.
    pub frame_rate: f64,
    /// Whether the file has at least one audio stream.
    pub has_audio: bool,
}

/// Query both the frame rate and audio presence.
pub fn probe_media(ffprobe: &Path, video: &Path) -> Result<MediaSummary> {
    Ok(MediaSummary {
        frame_rate: detect_frame_rate(ffprobe, video)?,
        has_audio: has_audio_stream(ffprobe, video)?,
    })
}

/// Detect the frame rate of the first video stream.
///
/// # Errors
///
/// [`Error::ProbeFailed`] if ffprobe exits non-zero, prints nothing, or
/// prints something that is not a usable rate.
pub fn detect_frame_rate(ffprobe: &Path, video: &Path) -> Result<f64> {
    let output = ToolCommand::new(ffprobe)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=r_frame_rate",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .path_arg(video)
        .output()?;

    if !output.success() {
        return Err(Error::probe_failed(format!(
            "could not detect frame rate of {} ({}): {}",
            video.display(),
            output.status,
            output.stderr.trim()
        )));
    }

    let rate = output
        .stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| {
            Error::probe_failed(format!(
                "ffprobe reported no video frame rate for {}",
                video.display()
            ))
        })?;

    let fps = parse_frame_rate(rate)
        .map_err(|e| Error::probe_failed(format!("unusable frame rate {rate:?}: {e}")))?;

    tracing::debug!("Detected {:.6} fps for {:?}", fps, video);
    Ok(fps)
}

/// Check whether the file has any audio stream.
///
/// # Errors
///
/// [`Error::ProbeFailed`] if ffprobe exits non-zero, the same policy as
/// [`detect_frame_rate`].
pub fn has_audio_stream(ffprobe: &Path, video: &Path) -> Result<bool> {
    let output = ToolCommand::new(ffprobe)
        .args([
            "-v",
            "error",
            "-select_streams",
            "a",
            "-show_entries",
            "stream=index",
            "-of",
            "csv=p=0",
        ])
        .path_arg(video)
        .output()?;

    if !output.success() {
        return Err(Error::probe_failed(format!(
            "could not list audio streams of {} ({}): {}",
            video.display(),
            output.status,
            output.stderr.trim()
        )));
    }

    Ok(output.stdout.lines().any(|line| !line.trim().is_empty()))
}
