//! Split planning: turn clip boundaries into ffmpeg invocations.
//!
//! Two modes exist. Frame-count mode re-encodes each clip with frame-exact
//! `trim` filters (and a matching `atrim` when the master has audio).
//! Timestamp mode stream-copies between whole-second cut points, which is
//! free but only as precise as the keyframes allow.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tbtools_common::{Error, Result};

use crate::command::ToolCommand;
use crate::timecode::{frame_boundaries, timestamp_boundaries, ClipBoundary};

/// Extension used when the master has none.
pub const DEFAULT_EXTENSION: &str = "mp4";

const VIDEO_CODEC: &str = "libx264";
const VIDEO_CRF: &str = "18";
const VIDEO_PRESET: &str = "veryfast";
const AUDIO_CODEC: &str = "aac";
const AUDIO_BITRATE: &str = "192k";

/// Where clips come from and where they go.
#[derive(Debug, Clone)]
pub struct SplitTarget {
    /// The master video.
    pub master: PathBuf,
    /// Directory receiving the clips.
    pub output_dir: PathBuf,
    /// Number of the first clip (`1` produces `C001`).
    pub start_index: u32,
    /// Extension of the produced clips, without the dot.
    pub extension: String,
}

impl SplitTarget {
    /// Create a target, taking the clip extension from the master.
    pub fn new(master: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, start_index: u32) -> Self {
        let master = master.into();
        let extension = master
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .filter(|ext| !ext.is_empty())
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

        Self {
            master,
            output_dir: output_dir.into(),
            start_index,
            extension,
        }
    }

    /// Override the clip extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }
}

/// Name of the clip with the given running index, e.g. `C007.mp4`.
pub fn clip_name(index: u32, extension: &str) -> String {
    format!("C{index:03}.{extension}")
}

/// One planned extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ClipJob {
    /// Running clip number.
    pub index: u32,
    /// File name, e.g. `C001.mp4`.
    pub name: String,
    /// Full output path.
    pub output: PathBuf,
    /// Range of the master covered by this clip.
    pub boundary: ClipBoundary,
    /// Arguments passed to ffmpeg (the program itself excluded).
    pub args: Vec<String>,
}

/// An ordered list of extractions.
#[derive(Debug, Clone, Serialize)]
pub struct ClipPlan {
    pub clips: Vec<ClipJob>,
}

impl ClipPlan {
    /// Plan a frame-count split.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] for an empty/zero frame list or a non-positive
    /// frame rate.
    pub fn from_frame_counts(
        target: &SplitTarget,
        counts: &[u64],
        fps: f64,
        has_audio: bool,
    ) -> Result<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(Error::invalid_input(format!("invalid frame rate: {fps}")));
        }

        let clips = frame_boundaries(counts)?
            .into_iter()
            .enumerate()
            .map(|(i, boundary)| {
                let args = reencode_args(&target.master, boundary, fps, has_audio);
                ClipJob::new(target, i, boundary, args)
            })
            .collect::<Result<_>>()?;

        Ok(Self { clips })
    }

    /// Plan a timestamp split (seconds, strictly increasing, at least two).
    pub fn from_timestamps(target: &SplitTarget, seconds: &[u64]) -> Result<Self> {
        let clips = timestamp_boundaries(seconds)?
            .into_iter()
            .enumerate()
            .map(|(i, boundary)| {
                let args = stream_copy_args(&target.master, boundary);
                ClipJob::new(target, i, boundary, args)
            })
            .collect::<Result<_>>()?;

        Ok(Self { clips })
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

impl ClipJob {
    fn new(
        target: &SplitTarget,
        offset: usize,
        boundary: ClipBoundary,
        mut args: Vec<String>,
    ) -> Result<Self> {
        let index = u32::try_from(offset)
            .ok()
            .and_then(|offset| target.start_index.checked_add(offset))
            .ok_or_else(|| {
                Error::invalid_input(format!(
                    "clip number overflows starting from {}",
                    target.start_index
                ))
            })?;
        let name = clip_name(index, &target.extension);
        let output = target.output_dir.join(&name);
        args.push(output.display().to_string());

        Ok(Self {
            index,
            name,
            output,
            boundary,
            args,
        })
    }

    /// The ffmpeg command for this clip.
    pub fn command(&self, ffmpeg: &Path) -> ToolCommand {
        let mut cmd = ToolCommand::new(ffmpeg);
        cmd.args(self.args.iter().cloned());
        cmd
    }
}

fn reencode_args(master: &Path, boundary: ClipBoundary, fps: f64, has_audio: bool) -> Vec<String> {
    let (start_frame, end_frame) = (boundary.start(), boundary.end());
    let start_time = start_frame as f64 / fps;
    let end_time = end_frame as f64 / fps;

    let mut args: Vec<String> = vec![
        "-hide_banner".into(),
        "-y".into(),
        "-i".into(),
        master.display().to_string(),
    ];

    if has_audio {
        let filter_complex = format!(
            "[0:v]trim=start_frame={start_frame}:end_frame={end_frame},setpts=PTS-STARTPTS[v];\
             [0:a]atrim=start={start_time:.6}:end={end_time:.6},asetpts=PTS-STARTPTS[a]"
        );
        args.extend(
            [
                "-filter_complex",
                filter_complex.as_str(),
                "-map",
                "[v]",
                "-map",
                "[a]",
                "-c:v",
                VIDEO_CODEC,
                "-crf",
                VIDEO_CRF,
                "-preset",
                VIDEO_PRESET,
                "-c:a",
                AUDIO_CODEC,
                "-b:a",
                AUDIO_BITRATE,
            ]
            .map(String::from),
        );
    } else {
        let vf = format!("trim=start_frame={start_frame}:end_frame={end_frame},setpts=PTS-STARTPTS");
        args.extend(
            [
                "-vf",
                vf.as_str(),
                "-an",
                "-c:v",
                VIDEO_CODEC,
                "-crf",
                VIDEO_CRF,
                "-preset",
                VIDEO_PRESET,
            ]
            .map(String::from),
        );
    }

    args
}

fn stream_copy_args(master: &Path, boundary: ClipBoundary) -> Vec<String> {
    vec![
        "-hide_banner".into(),
        "-y".into(),
        "-ss".into(),
        boundary.start().to_string(),
        "-i".into(),
        master.display().to_string(),
        "-t".into(),
        boundary.len().to_string(),
        "-c".into(),
        "copy".into(),
    ]
}

/// Run every clip of the plan in order.
///
/// Each clip's name, range, command line and captured output go to `log`.
/// The first failing clip aborts the batch; clips already written stay on
/// disk. Returns the number of clips produced.
///
/// # Errors
///
/// [`Error::ExternalToolFailed`] naming the clip that failed, or
/// [`Error::ToolNotFound`] if ffmpeg cannot be started.
pub fn execute_plan(ffmpeg: &Path, plan: &ClipPlan, log: &dyn Fn(&str)) -> Result<usize> {
    for clip in &plan.clips {
        log("");
        log("------------------------------");
        log(&format!("Generating {}", clip.name));
        match clip.boundary {
            ClipBoundary::Frames { start, end } => {
                log(&format!("Frames: {} -> {} ({})", start, end - 1, end - start))
            }
            ClipBoundary::Seconds { start, end } => {
                log(&format!("Seconds: {} -> {} ({}s)", start, end, end - start))
            }
        }

        let cmd = clip.command(ffmpeg);
        log("CMD:");
        log(&cmd.to_string());

        let output = cmd.output()?;
        if !output.stdout.trim().is_empty() {
            log("");
            log("STDOUT:");
            log(output.stdout.trim_end());
        }
        if !output.stderr.trim().is_empty() {
            log("");
            log("STDERR:");
            log(output.stderr.trim_end());
        }

        if !output.success() {
            tracing::error!("ffmpeg failed on {} ({})", clip.name, output.status);
            return Err(Error::tool_failed(
                "ffmpeg",
                format!("failed to generate {} ({})", clip.name, output.status),
            ));
        }

        tracing::info!("Wrote {:?}", clip.output);
    }

    Ok(plan.len())
}
