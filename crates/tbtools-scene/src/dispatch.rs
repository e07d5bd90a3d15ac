//! Sequential per-scene job dispatch.
//!
//! For each selected scene: resolve its directory, make sure the directory
//! and a placeholder `.xstage` exist, write the job descriptor, then run the
//! Harmony batch script against it. Scenes are processed strictly in order
//! and the first failure ends the run; scenes already dispatched stay done.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tbtools_common::{Error, Result};

use crate::harmony::HarmonyBatch;
use crate::job::{ImportAnimaticJob, JobDescriptor, SceneSetupJob};
use crate::manifest::{AnimaticSettings, SceneManifest, SceneRecord};

/// Which batch job to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    SceneSetup,
    ImportAnimatic,
}

/// Where the scenes to process come from.
#[derive(Debug, Clone, Copy)]
pub enum SceneSource<'a> {
    /// Scenes declared in a manifest, optionally filtered by id.
    Manifest {
        manifest: &'a SceneManifest,
        filter: &'a [String],
    },
    /// Bare scene ids living directly under a scenes root.
    List {
        scenes_root: &'a Path,
        scene_ids: &'a [String],
    },
}

/// One scene that made it through the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchedScene {
    pub scene_id: String,
    pub scene_dir: PathBuf,
    pub xstage: PathBuf,
    pub job_path: PathBuf,
    /// False when the run was a dry run.
    pub dispatched: bool,
}

/// A scene waiting to be processed.
struct Target<'a> {
    id: String,
    record: Option<&'a SceneRecord>,
}

pub struct SceneJobDispatcher {
    harmony: HarmonyBatch,
    kind: JobKind,
    animatics_root: Option<PathBuf>,
    dry_run: bool,
}

impl SceneJobDispatcher {
    pub fn new(harmony: HarmonyBatch, kind: JobKind) -> Self {
        Self {
            harmony,
            kind,
            animatics_root: None,
            dry_run: false,
        }
    }

    /// Directory holding `<scene>.mp4` animatics, used when a scene does not
    /// name its own animatic.
    pub fn with_animatics_root(mut self, root: Option<PathBuf>) -> Self {
        self.animatics_root = root;
        self
    }

    /// Prepare directories and descriptors without launching Harmony.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Process every selected scene in order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing scene. Harmony exiting non-zero surfaces
    /// as [`Error::ExternalToolFailed`]; everything else is a setup error.
    pub fn run(
        &self,
        source: SceneSource<'_>,
        log: &dyn Fn(&str),
    ) -> Result<Vec<DispatchedScene>> {
        let harmony = if self.dry_run {
            self.harmony.clone()
        } else {
            self.harmony.preflight()?
        };

        let config_path = match (self.kind, source) {
            (JobKind::SceneSetup, SceneSource::Manifest { manifest, .. }) => {
                let source = manifest.source.as_deref().ok_or_else(|| {
                    Error::invalid_manifest("scene setup needs a manifest loaded from a file")
                })?;
                Some(std::path::absolute(source)?)
            }
            (JobKind::SceneSetup, SceneSource::List { .. }) => {
                return Err(Error::invalid_input("scene setup needs a scene manifest"));
            }
            (JobKind::ImportAnimatic, _) => None,
        };

        let targets = collect_targets(source, log)?;
        let total = targets.len();
        let mut done = Vec::with_capacity(total);

        for (i, target) in targets.iter().enumerate() {
            log(&format!("[{}/{}] Scene {}", i + 1, total, target.id));
            let scene = self.process(&harmony, source, target, config_path.as_deref(), log)?;
            done.push(scene);
        }

        tracing::info!(
            "Processed {} scene(s){}",
            done.len(),
            if self.dry_run { " (dry run)" } else { "" }
        );
        Ok(done)
    }

    fn process(
        &self,
        harmony: &HarmonyBatch,
        source: SceneSource<'_>,
        target: &Target<'_>,
        config_path: Option<&Path>,
        log: &dyn Fn(&str),
    ) -> Result<DispatchedScene> {
        let scene_dir = match (source, target.record) {
            (SceneSource::Manifest { manifest, .. }, Some(record)) => {
                manifest.resolve_scene_dir(record)?
            }
            (SceneSource::List { scenes_root, .. }, _) => scenes_root.join(&target.id),
            (SceneSource::Manifest { .. }, None) => {
                return Err(Error::unresolvable_scene(&target.id));
            }
        };
        log(&format!("  Directory: {}", scene_dir.display()));

        fs::create_dir_all(&scene_dir)?;

        let xstage = scene_dir.join(format!("{}.xstage", target.id));
        if !xstage.exists() {
            fs::File::create(&xstage)?;
            log(&format!("  Created placeholder {}", xstage.display()));
        }

        let descriptor = match self.kind {
            JobKind::SceneSetup => JobDescriptor::SceneSetup(SceneSetupJob {
                scene_id: target.id.clone(),
                scene_dir: scene_dir.display().to_string(),
                config_path: config_path
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            }),
            JobKind::ImportAnimatic => {
                let animatic = self.animatic_for(source, target)?;
                if !animatic.is_file() {
                    return Err(Error::missing_file(animatic));
                }
                let settings = match (source, target.record) {
                    (SceneSource::Manifest { manifest, .. }, Some(record)) => {
                        manifest.animatic_settings(record, &scene_dir)?
                    }
                    _ => AnimaticSettings::for_scene_dir(&scene_dir),
                };
                fs::create_dir_all(&settings.image_folder)?;
                JobDescriptor::ImportAnimatic(ImportAnimaticJob {
                    scene_code: target.id.clone(),
                    scene_dir: scene_dir.display().to_string(),
                    animatic_mp4: animatic.display().to_string(),
                    image_folder: settings.image_folder.display().to_string(),
                    image_prefix: settings.image_prefix,
                    start_frame: settings.start_frame,
                    audio_file: settings.audio_file.map(|p| p.display().to_string()),
                })
            }
        };

        let job_path = descriptor.write(&scene_dir)?;
        log(&format!("  Wrote {} job {}", descriptor.kind(), job_path.display()));

        if self.dry_run {
            let cmd = harmony.command(&xstage, &job_path);
            log(&format!("  [dry run] {cmd}"));
        } else {
            let output = harmony.run(&target.id, &xstage, &job_path)?;
            for line in output.stdout.lines().filter(|l| !l.trim().is_empty()) {
                log(&format!("  {line}"));
            }
            log(&format!("  Harmony finished for {}", target.id));
        }

        Ok(DispatchedScene {
            scene_id: target.id.clone(),
            scene_dir,
            xstage,
            job_path,
            dispatched: !self.dry_run,
        })
    }

    fn animatic_for(&self, source: SceneSource<'_>, target: &Target<'_>) -> Result<PathBuf> {
        let declared = match (source, target.record) {
            (SceneSource::Manifest { manifest, .. }, Some(record)) => {
                manifest.resolve_animatic(record)
            }
            _ => None,
        };

        declared
            .or_else(|| {
                self.animatics_root
                    .as_ref()
                    .map(|root| root.join(format!("{}.mp4", target.id)))
            })
            .ok_or_else(|| {
                Error::invalid_input(format!(
                    "no animatic for scene {} and no animatics root configured",
                    target.id
                ))
            })
    }
}

fn collect_targets<'a>(source: SceneSource<'a>, log: &dyn Fn(&str)) -> Result<Vec<Target<'a>>> {
    match source {
        SceneSource::Manifest { manifest, filter } => {
            let selection = manifest.select(filter)?;
            for id in &selection.missing {
                tracing::warn!("Scene {} is not in the manifest, skipping", id);
                log(&format!("Scene {id} is not in the manifest, skipping"));
            }
            selection
                .scenes
                .into_iter()
                .map(|record| {
                    let id = record
                        .id()
                        .ok_or_else(|| Error::unresolvable_scene("<unnamed>"))?;
                    Ok(Target {
                        id: id.to_string(),
                        record: Some(record),
                    })
                })
                .collect()
        }
        SceneSource::List {
            scenes_root,
            scene_ids,
        } => {
            if !scenes_root.is_dir() {
                return Err(Error::missing_file(scenes_root));
            }
            let targets: Vec<_> = scene_ids
                .iter()
                .map(|id| id.trim())
                .filter(|id| !id.is_empty())
                .map(|id| Target {
                    id: id.to_string(),
                    record: None,
                })
                .collect();
            if targets.is_empty() {
                return Err(Error::invalid_input("no scene ids given"));
            }
            Ok(targets)
        }
    }
}
