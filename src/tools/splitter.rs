//! MP4 Splitter: cut a master video into numbered scene clips.

use crate::config::ToolConfig;
use crate::host::{Field, LogSink, Tool, ToolEntry};
use std::path::PathBuf;
use tbtools_av::timecode::{parse_frame_count, parse_timestamp};
use tbtools_av::tools::resolve_tool;
use tbtools_av::{clip, probe, ClipPlan, SplitTarget};
use tbtools_common::{Error, Result};

pub static ENTRY: ToolEntry = ToolEntry {
    name: "MP4 Splitter",
    commands: &["split"],
    description: "Cut a master video into numbered scene clips (C001, C002, ...)",
    fields: &[
        Field {
            name: "master",
            help: "Master video file",
            config_key: None,
        },
        Field {
            name: "output-dir",
            help: "Directory receiving the clips",
            config_key: None,
        },
        Field {
            name: "start-index",
            help: "Number of the first clip",
            config_key: None,
        },
        Field {
            name: "frames",
            help: "Frame count per scene, re-encoded frame-exactly",
            config_key: None,
        },
        Field {
            name: "timestamps",
            help: "MM:SS cut points, stream-copied",
            config_key: None,
        },
        Field {
            name: "fps",
            help: "Frame rate override",
            config_key: Some("fps"),
        },
        Field {
            name: "ffmpeg",
            help: "Transcoder executable",
            config_key: Some("ffmpeg_path"),
        },
        Field {
            name: "ffprobe",
            help: "Media inspector executable",
            config_key: Some("ffprobe_path"),
        },
    ],
};

/// How the clip boundaries are given, one raw entry per scene or cut point.
#[derive(Debug, Clone)]
pub enum SplitInput {
    FrameCounts(Vec<String>),
    Timestamps(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct SplitRequest {
    pub master: PathBuf,
    pub output_dir: PathBuf,
    pub start_index: u32,
    pub input: SplitInput,
    /// Skips frame rate detection when set.
    pub fps: Option<f64>,
    pub dry_run: bool,
}

pub struct Mp4Splitter {
    request: SplitRequest,
}

impl Mp4Splitter {
    pub fn new(request: SplitRequest) -> Self {
        Self { request }
    }

    fn plan(&self, config: &ToolConfig, target: &SplitTarget, log: &LogSink) -> Result<ClipPlan> {
        let req = &self.request;
        match &req.input {
            SplitInput::FrameCounts(entries) => {
                let counts = entries
                    .iter()
                    .map(|entry| parse_frame_count(entry))
                    .collect::<Result<Vec<_>>>()?;

                let ffprobe = config.ffprobe();
                log.line(format!("FFprobe: {}", ffprobe.display()));

                let fps = match req.fps {
                    Some(fps) => fps,
                    None if config.detect_fps => probe::detect_frame_rate(&ffprobe, &req.master)?,
                    None => config.fps,
                };
                log.line(format!("FPS: {fps:.6}"));

                let has_audio = probe::has_audio_stream(&ffprobe, &req.master)?;
                log.line(format!("Audio: {}", if has_audio { "yes" } else { "no" }));

                ClipPlan::from_frame_counts(target, &counts, fps, has_audio)
            }
            SplitInput::Timestamps(entries) => {
                let seconds = entries
                    .iter()
                    .map(|entry| parse_timestamp(entry))
                    .collect::<Result<Vec<_>>>()?;
                ClipPlan::from_timestamps(target, &seconds)
            }
        }
    }
}

impl Tool for Mp4Splitter {
    fn entry(&self) -> &'static ToolEntry {
        &ENTRY
    }

    fn execute(&self, config: &ToolConfig, log: &LogSink) -> Result<String> {
        let req = &self.request;
        if !req.master.is_file() {
            return Err(Error::missing_file(&req.master));
        }

        let target = SplitTarget::new(&req.master, &req.output_dir, req.start_index);
        log.line(format!("Master: {}", req.master.display()));
        log.line(format!("Output: {}", req.output_dir.display()));

        let plan = self.plan(config, &target, log)?;

        if req.dry_run {
            let ffmpeg = config.ffmpeg();
            for job in &plan.clips {
                log.line(format!("[dry run] {}: {}", job.name, job.command(&ffmpeg)));
            }
            return Ok(format!("{} clips planned (dry run)", plan.len()));
        }

        let ffmpeg = resolve_tool(&config.ffmpeg_path)?;
        log.line(format!("FFmpeg: {}", ffmpeg.display()));
        std::fs::create_dir_all(&req.output_dir)?;

        let written = clip::execute_plan(&ffmpeg, &plan, &|line: &str| log.line(line))?;
        Ok(format!("{written} clips generated"))
    }
}
