//! # tbtools-scene
//!
//! Scene provisioning for Harmony batch jobs.
//!
//! A run reads a JSON scene manifest (or a bare list of scene ids), works out
//! each scene's directory, writes a small JSON job descriptor next to the
//! scene and launches Harmony in batch mode with the descriptor path in
//! `TB_JOB`.
//!
//! ```no_run
//! use std::path::Path;
//! use tbtools_scene::{load_manifest, HarmonyBatch, JobKind, SceneJobDispatcher, SceneSource};
//!
//! let manifest = load_manifest(Path::new("/proj/project.json"))?;
//! let harmony = HarmonyBatch::new("/opt/harmony/bin/Harmony", "/proj/scripts/run_scene_setup.js");
//! let done = SceneJobDispatcher::new(harmony, JobKind::SceneSetup).run(
//!     SceneSource::Manifest { manifest: &manifest, filter: &[] },
//!     &|line: &str| println!("{line}"),
//! )?;
//! println!("{} scenes set up", done.len());
//! # Ok::<(), tbtools_common::Error>(())
//! ```

pub mod dispatch;
pub mod harmony;
pub mod job;
pub mod manifest;

pub use dispatch::{DispatchedScene, JobKind, SceneJobDispatcher, SceneSource};
pub use harmony::HarmonyBatch;
pub use job::{JobDescriptor, JOB_ENV_VAR};
pub use manifest::{load_manifest, AnimaticSettings, SceneManifest, SceneRecord};
