//! Scene manifest loading and scene directory resolution.
//!
//! A manifest is a hand-written JSON file describing a project's root paths
//! and its scenes:
//!
//! ```json
//! {
//!   "project": { "root_path": "/proj", "paths": { "scenes": "scenes", "animatics": "animatics" } },
//!   "defaults": { "animatic": { "image_prefix": "ANIM_" } },
//!   "scenes": [
//!     { "scene_id": "C01", "animatic": { "path": "C01.mp4" } },
//!     { "scene_code": "C02", "scene_dir": "/elsewhere/C02" }
//!   ]
//! }
//! ```
//!
//! Fields this crate does not interpret are kept so the authoring script,
//! which reads the same file, still sees them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tbtools_common::paths::{join_paths, resolve_path};
use tbtools_common::{Error, Result};

use crate::job::{DEFAULT_IMAGE_PREFIX, DEFAULT_IMAGE_SUBDIR, DEFAULT_START_FRAME};

/// Free-form settings block (`bg`, `rig`, `animatic`).
pub type Settings = Map<String, Value>;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SceneManifest {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub defaults: SceneDefaults,

    pub scenes: Vec<SceneRecord>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// File the manifest was loaded from.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub root_path: Option<String>,

    #[serde(default)]
    pub paths: ProjectPaths,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProjectPaths {
    #[serde(default)]
    pub scenes: Option<String>,

    #[serde(default)]
    pub animatics: Option<String>,

    #[serde(default)]
    pub bgs: Option<String>,

    #[serde(default)]
    pub rigs: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Settings merged into every scene that does not override them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SceneDefaults {
    #[serde(default)]
    pub bg: Option<Settings>,

    #[serde(default)]
    pub rig: Option<Settings>,

    #[serde(default)]
    pub animatic: Option<Settings>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SceneRecord {
    #[serde(default)]
    pub scene_id: Option<String>,

    /// Legacy name for `scene_id`.
    #[serde(default)]
    pub scene_code: Option<String>,

    #[serde(default)]
    pub scene_dir: Option<String>,

    #[serde(default)]
    pub bg: Option<Settings>,

    #[serde(default)]
    pub rig: Option<Settings>,

    #[serde(default)]
    pub animatic: Option<Settings>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How Harmony should unpack an animatic movie into a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimaticSettings {
    pub image_folder: PathBuf,
    pub image_prefix: String,
    pub start_frame: u32,
    pub audio_file: Option<PathBuf>,
}

impl AnimaticSettings {
    /// Defaults: frames under `elements/animatic`, `ANIM_` prefix, frame 1.
    pub fn for_scene_dir(scene_dir: &Path) -> Self {
        Self {
            image_folder: scene_dir.join(DEFAULT_IMAGE_SUBDIR),
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
            start_frame: DEFAULT_START_FRAME,
            audio_file: None,
        }
    }
}

/// Result of filtering a manifest's scenes by requested ids.
#[derive(Debug)]
pub struct Selection<'a> {
    /// Matching scenes, in the order they were requested.
    pub scenes: Vec<&'a SceneRecord>,
    /// Requested ids that no scene carries.
    pub missing: Vec<String>,
}

/// Load and validate a manifest.
///
/// # Errors
///
/// - [`Error::MissingFile`] if `path` does not exist.
/// - [`Error::InvalidManifest`] if the file is not JSON, the top-level value
///   is not an object, or it has no `scenes` array.
pub fn load_manifest(path: &Path) -> Result<SceneManifest> {
    if !path.exists() {
        return Err(Error::missing_file(path));
    }

    let text = std::fs::read_to_string(path)?;
    let mut manifest = parse_manifest(&text)?;
    manifest.source = Some(path.to_path_buf());

    tracing::debug!(
        "Loaded manifest {:?} with {} scenes",
        path,
        manifest.scenes.len()
    );
    Ok(manifest)
}

/// Parse manifest text. A leading UTF-8 BOM is ignored.
pub fn parse_manifest(text: &str) -> Result<SceneManifest> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let value: Value = serde_json::from_str(text)
        .map_err(|e| Error::invalid_manifest(format!("not valid JSON: {e}")))?;

    let Some(object) = value.as_object() else {
        return Err(Error::invalid_manifest("top-level value must be an object"));
    };
    match object.get("scenes") {
        Some(Value::Array(_)) => {}
        Some(_) => return Err(Error::invalid_manifest("`scenes` must be an array")),
        None => return Err(Error::invalid_manifest("missing `scenes` array")),
    }

    serde_json::from_value(value).map_err(|e| Error::invalid_manifest(e.to_string()))
}

impl SceneManifest {
    /// Root directory under which scene directories live, if declared:
    /// `project.paths.scenes` resolved against `project.root_path`.
    pub fn scenes_root(&self) -> Option<String> {
        let scenes = non_empty(self.project.paths.scenes.as_deref())?;
        Some(resolve_path(scenes, self.root_path()))
    }

    fn root_path(&self) -> Option<&str> {
        non_empty(self.project.root_path.as_deref())
    }

    /// Find a scene by its identifier (see [`SceneRecord::id`]).
    pub fn find(&self, id: &str) -> Option<&SceneRecord> {
        self.scenes.iter().find(|scene| scene.matches(id))
    }

    /// Select scenes by id. An empty filter selects every scene.
    ///
    /// # Errors
    ///
    /// [`Error::NoScenesMatched`] if ids were requested and none of them
    /// appear in the manifest.
    pub fn select(&self, requested: &[String]) -> Result<Selection<'_>> {
        if requested.is_empty() {
            return Ok(Selection {
                scenes: self.scenes.iter().collect(),
                missing: Vec::new(),
            });
        }

        let mut scenes = Vec::new();
        let mut missing = Vec::new();
        for id in requested {
            match self.find(id) {
                Some(scene) => scenes.push(scene),
                None => missing.push(id.clone()),
            }
        }

        if scenes.is_empty() {
            return Err(Error::NoScenesMatched {
                requested: requested.to_vec(),
            });
        }
        Ok(Selection { scenes, missing })
    }

    /// Resolve the working directory of a scene.
    ///
    /// An explicit `scene_dir` is resolved against the scenes root; otherwise
    /// the scene id is appended to the scenes root.
    ///
    /// # Errors
    ///
    /// [`Error::UnresolvableScene`] when the record has neither an explicit
    /// directory nor a scenes root to derive one from.
    pub fn resolve_scene_dir(&self, record: &SceneRecord) -> Result<PathBuf> {
        let scenes_root = self.scenes_root();

        if let Some(dir) = non_empty(record.scene_dir.as_deref()) {
            return Ok(PathBuf::from(resolve_path(dir, scenes_root.as_deref())));
        }

        match (record.id(), scenes_root) {
            (Some(id), Some(root)) => Ok(PathBuf::from(join_paths(&root, id))),
            (id, _) => Err(Error::unresolvable_scene(id.unwrap_or("<unnamed>"))),
        }
    }

    /// Resolve the animatic media of a scene after applying the manifest
    /// defaults, relative to `project.paths.animatics` (or the project root).
    pub fn resolve_animatic(&self, record: &SceneRecord) -> Option<PathBuf> {
        let record = record.with_defaults(&self.defaults);
        let raw = animatic_str(&record, "path")?;
        let base = self.animatics_base();
        Some(PathBuf::from(resolve_path(raw, base.as_deref())))
    }

    /// Import settings of a scene's animatic after applying the manifest
    /// defaults. `image_folder` is resolved against `scene_dir` and
    /// `audio_file` like the animatic itself.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidManifest`] if `start_frame` is not a positive integer.
    pub fn animatic_settings(
        &self,
        record: &SceneRecord,
        scene_dir: &Path,
    ) -> Result<AnimaticSettings> {
        let record = record.with_defaults(&self.defaults);
        let mut settings = AnimaticSettings::for_scene_dir(scene_dir);

        if let Some(folder) = animatic_str(&record, "image_folder") {
            let base = scene_dir.display().to_string();
            settings.image_folder = PathBuf::from(resolve_path(folder, Some(&base)));
        }
        if let Some(prefix) = animatic_str(&record, "image_prefix") {
            settings.image_prefix = prefix.to_string();
        }
        if let Some(value) = record.animatic.as_ref().and_then(|a| a.get("start_frame")) {
            settings.start_frame = parse_start_frame(value).ok_or_else(|| {
                Error::invalid_manifest(format!(
                    "scene {}: start_frame must be a positive integer, got {value}",
                    record.id().unwrap_or("<unnamed>")
                ))
            })?;
        }
        if let Some(audio) = animatic_str(&record, "audio_file") {
            let base = self.animatics_base();
            settings.audio_file = Some(PathBuf::from(resolve_path(audio, base.as_deref())));
        }
        Ok(settings)
    }

    fn animatics_base(&self) -> Option<String> {
        match non_empty(self.project.paths.animatics.as_deref()) {
            Some(animatics) => Some(resolve_path(animatics, self.root_path())),
            None => self.root_path().map(str::to_string),
        }
    }
}

impl SceneRecord {
    /// The scene identifier: `scene_id`, else the legacy `scene_code`.
    pub fn id(&self) -> Option<&str> {
        non_empty(self.scene_id.as_deref()).or_else(|| non_empty(self.scene_code.as_deref()))
    }

    fn matches(&self, id: &str) -> bool {
        self.id() == Some(id)
    }

    /// A copy of this record with missing `bg`/`rig`/`animatic` blocks, and
    /// missing keys inside present ones, taken from `defaults`.
    pub fn with_defaults(&self, defaults: &SceneDefaults) -> SceneRecord {
        let mut record = self.clone();
        merge_settings(&mut record.bg, defaults.bg.as_ref());
        merge_settings(&mut record.rig, defaults.rig.as_ref());
        merge_settings(&mut record.animatic, defaults.animatic.as_ref());
        record
    }
}

fn merge_settings(target: &mut Option<Settings>, defaults: Option<&Settings>) {
    let Some(defaults) = defaults else {
        return;
    };
    match target {
        None => *target = Some(defaults.clone()),
        Some(settings) => {
            for (key, value) in defaults {
                settings.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
    }
}

fn animatic_str<'a>(record: &'a SceneRecord, key: &str) -> Option<&'a str> {
    record
        .animatic
        .as_ref()
        .and_then(|animatic| animatic.get(key))
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

fn parse_start_frame(value: &Value) -> Option<u32> {
    let frame = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    u32::try_from(frame).ok().filter(|frame| *frame > 0)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
