//! The batch tools the host can run.

pub mod scene_setup;
pub mod splitter;

pub use scene_setup::{SceneJob, SceneSetup, SceneSetupRequest};
pub use splitter::{Mp4Splitter, SplitInput, SplitRequest};
