//! Scene Setup: provision scene directories and run Harmony batch jobs.
//!
//! Two jobs share this tool. Scene setup builds scenes from a manifest; the
//! animatic import drops a movie into existing scenes, taken either from a
//! manifest or from a bare list of scene ids under the configured scenes root.

use crate::config::ToolConfig;
use crate::host::{Field, LogSink, Tool, ToolEntry};
use std::path::PathBuf;
use tbtools_common::{Error, Result};
use tbtools_scene::{
    load_manifest, HarmonyBatch, JobKind, SceneJobDispatcher, SceneManifest, SceneSource,
};

pub static ENTRY: ToolEntry = ToolEntry {
    name: "Scene Setup",
    commands: &["setup", "import-animatic"],
    description: "Create scene folders and run a Harmony batch script on each scene",
    fields: &[
        Field {
            name: "manifest",
            help: "JSON scene manifest",
            config_key: None,
        },
        Field {
            name: "scenes",
            help: "Scene ids to process, one per line",
            config_key: None,
        },
        Field {
            name: "scenes-root",
            help: "Directory holding one folder per scene",
            config_key: Some("scenes_root"),
        },
        Field {
            name: "animatics-root",
            help: "Directory holding <scene>.mp4 animatics",
            config_key: Some("animatics_root"),
        },
        Field {
            name: "harmony-exe",
            help: "Harmony executable",
            config_key: Some("harmony_exe"),
        },
        Field {
            name: "script",
            help: "Batch script run inside Harmony",
            config_key: Some("harmony_script"),
        },
    ],
};

#[derive(Debug, Clone)]
pub enum SceneJob {
    /// Build scenes declared in a manifest.
    Setup { manifest: PathBuf },
    /// Import animatics, from a manifest or from the scenes root.
    ImportAnimatic { manifest: Option<PathBuf> },
}

#[derive(Debug, Clone)]
pub struct SceneSetupRequest {
    pub job: SceneJob,
    /// Scene ids to process; empty means every manifest scene.
    pub scenes: Vec<String>,
    pub dry_run: bool,
}

pub struct SceneSetup {
    request: SceneSetupRequest,
}

impl SceneSetup {
    pub fn new(request: SceneSetupRequest) -> Self {
        Self { request }
    }

    fn harmony(&self, config: &ToolConfig) -> HarmonyBatch {
        let script = match self.request.job {
            SceneJob::Setup { .. } => &config.harmony_script,
            SceneJob::ImportAnimatic { .. } => &config.harmony_import_script,
        };
        HarmonyBatch::new(&config.harmony_exe, script).with_log_dir(config.harmony_log_dir())
    }
}

impl Tool for SceneSetup {
    fn entry(&self) -> &'static ToolEntry {
        &ENTRY
    }

    fn execute(&self, config: &ToolConfig, log: &LogSink) -> Result<String> {
        let req = &self.request;
        let harmony = self.harmony(config);
        log.line(format!("Harmony: {}", harmony.exe.display()));
        log.line(format!("Script: {}", harmony.script.display()));

        let (kind, manifest_path) = match &req.job {
            SceneJob::Setup { manifest } => (JobKind::SceneSetup, Some(manifest)),
            SceneJob::ImportAnimatic { manifest } => (JobKind::ImportAnimatic, manifest.as_ref()),
        };

        let manifest = manifest_path
            .map(|path| {
                log.line(format!("Manifest: {}", path.display()));
                load_manifest(path).map(|m| with_config_roots(m, config))
            })
            .transpose()?;

        let scenes_root = config.scenes_root();
        let source = match &manifest {
            Some(manifest) => SceneSource::Manifest {
                manifest,
                filter: &req.scenes,
            },
            None => SceneSource::List {
                scenes_root: scenes_root.as_deref().ok_or_else(|| {
                    Error::invalid_input("scenes_root is not configured")
                })?,
                scene_ids: &req.scenes,
            },
        };

        let dispatcher = SceneJobDispatcher::new(harmony, kind)
            .with_animatics_root(config.animatics_root())
            .dry_run(req.dry_run);
        let done = dispatcher.run(source, &|line: &str| log.line(line))?;

        let what = match kind {
            JobKind::SceneSetup => "set up",
            JobKind::ImportAnimatic => "given their animatic",
        };
        let suffix = if req.dry_run { " (dry run)" } else { "" };
        Ok(format!("{} scene(s) {}{}", done.len(), what, suffix))
    }
}

/// Fill roots the manifest leaves out from the tool config.
fn with_config_roots(mut manifest: SceneManifest, config: &ToolConfig) -> SceneManifest {
    let project = &mut manifest.project;
    if project.root_path.as_deref().unwrap_or_default().is_empty() && !config.project_root.is_empty()
    {
        project.root_path = Some(config.project_root.clone());
    }
    if project.paths.scenes.as_deref().unwrap_or_default().is_empty()
        && !config.scenes_root.is_empty()
    {
        project.paths.scenes = Some(config.scenes_root.clone());
    }
    if project.paths.animatics.as_deref().unwrap_or_default().is_empty()
        && !config.animatics_root.is_empty()
    {
        project.paths.animatics = Some(config.animatics_root.clone());
    }
    manifest
}
