//! Job descriptors handed to Harmony batch scripts.
//!
//! The batch script receives the descriptor path through the [`JOB_ENV_VAR`]
//! environment variable and reads everything else from the JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tbtools_common::Result;

/// Environment variable naming the descriptor file.
pub const JOB_ENV_VAR: &str = "TB_JOB";

/// Scene setup descriptors go in this subdirectory of the scene directory.
pub const SCENE_SETUP_DIR: &str = "_tb_jobs";
pub const SCENE_SETUP_FILE: &str = "_tb_job_scene_setup.json";
pub const IMPORT_ANIMATIC_FILE: &str = "_job_animatic.json";

/// Where rendered animatic frames go, relative to the scene directory.
pub const DEFAULT_IMAGE_SUBDIR: &str = "elements/animatic";
pub const DEFAULT_IMAGE_PREFIX: &str = "ANIM_";
pub const DEFAULT_START_FRAME: u32 = 1;

/// Build a scene from the project manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSetupJob {
    pub scene_id: String,
    pub scene_dir: String,
    /// Absolute path of the manifest the scene was taken from.
    pub config_path: String,
}

/// Import an animatic movie into an existing scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportAnimaticJob {
    pub scene_code: String,
    pub scene_dir: String,
    pub animatic_mp4: String,
    /// Folder receiving the frames Harmony extracts from the movie.
    pub image_folder: String,
    pub image_prefix: String,
    pub start_frame: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobDescriptor {
    SceneSetup(SceneSetupJob),
    ImportAnimatic(ImportAnimaticJob),
}

impl JobDescriptor {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            JobDescriptor::SceneSetup(_) => "scene setup",
            JobDescriptor::ImportAnimatic(_) => "animatic import",
        }
    }

    /// Where this descriptor lives for a given scene directory.
    pub fn file_path(&self, scene_dir: &Path) -> PathBuf {
        match self {
            JobDescriptor::SceneSetup(_) => scene_dir.join(SCENE_SETUP_DIR).join(SCENE_SETUP_FILE),
            JobDescriptor::ImportAnimatic(_) => scene_dir.join(IMPORT_ANIMATIC_FILE),
        }
    }

    /// Write the descriptor as pretty UTF-8 JSON, creating parent
    /// directories and overwriting any previous descriptor.
    pub fn write(&self, scene_dir: &Path) -> Result<PathBuf> {
        let path = self.file_path(scene_dir);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_scene_setup_layout() {
        let dir = tempfile::tempdir().unwrap();
        let job = JobDescriptor::SceneSetup(SceneSetupJob {
            scene_id: "C01".to_string(),
            scene_dir: dir.path().display().to_string(),
            config_path: "/proj/project.json".to_string(),
        });

        let path = job.write(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("_tb_jobs/_tb_job_scene_setup.json"));

        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["scene_id"], "C01");
        assert_eq!(value["config_path"], "/proj/project.json");
        assert_eq!(value.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_import_animatic_layout() {
        let dir = tempfile::tempdir().unwrap();
        let job = JobDescriptor::ImportAnimatic(ImportAnimaticJob {
            scene_code: "C02".to_string(),
            scene_dir: dir.path().display().to_string(),
            animatic_mp4: "/proj/animatics/C02.mp4".to_string(),
            image_folder: "/proj/scenes/C02/elements/animatic".to_string(),
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
            start_frame: DEFAULT_START_FRAME,
            audio_file: None,
        });

        let path = job.write(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("_job_animatic.json"));

        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["image_folder"], "/proj/scenes/C02/elements/animatic");
        assert_eq!(value["image_prefix"], "ANIM_");
        assert_eq!(value["start_frame"], 1);
        assert!(value.get("audio_file").is_none());

        let parsed: ImportAnimaticJob = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.scene_code, "C02");
        assert_eq!(parsed.animatic_mp4, "/proj/animatics/C02.mp4");
    }

    #[test]
    fn test_rewrite_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let job = |id: &str| {
            JobDescriptor::SceneSetup(SceneSetupJob {
                scene_id: id.to_string(),
                scene_dir: String::new(),
                config_path: String::new(),
            })
        };

        job("OLD").write(dir.path()).unwrap();
        let path = job("NEW").write(dir.path()).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("NEW"));
        assert!(!text.contains("OLD"));
    }
}
