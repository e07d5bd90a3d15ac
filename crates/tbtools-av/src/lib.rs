//! # tbtools-av
//!
//! Everything needed to cut a master video into numbered scene clips.
//!
//! - **Time math** ([`timecode`]): frame counts, frame rates and `MM:SS`
//!   timestamps parsed from user text, and the clip boundaries derived
//!   from them.
//! - **Probing** ([`probe`]): frame rate and audio presence via ffprobe.
//! - **Planning and execution** ([`clip`]): one ffmpeg invocation per clip,
//!   run strictly in order and stopping at the first failure.
//! - **Tool plumbing** ([`command`], [`tools`]): a blocking command builder
//!   and executable discovery.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use tbtools_av::{clip, probe, SplitTarget, ClipPlan};
//!
//! let ffprobe = Path::new("ffprobe");
//! let master = Path::new("/shows/ep01/master.mp4");
//! let media = probe::probe_media(ffprobe, master)?;
//!
//! let target = SplitTarget::new(master, "/shows/ep01/clips", 1);
//! let plan = ClipPlan::from_frame_counts(&target, &[24, 36], media.frame_rate, media.has_audio)?;
//! clip::execute_plan(Path::new("ffmpeg"), &plan, &|line: &str| println!("{line}"))?;
//! # Ok::<(), tbtools_common::Error>(())
//! ```

pub mod clip;
pub mod command;
pub mod probe;
pub mod timecode;
pub mod tools;

pub use clip::{ClipJob, ClipPlan, SplitTarget};
pub use command::{ToolCommand, ToolOutput};
pub use probe::MediaSummary;
pub use timecode::ClipBoundary;
pub use tools::ToolInfo;
