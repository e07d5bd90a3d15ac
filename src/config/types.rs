use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Keys accepted by `config set`, in display order.
pub const CONFIG_KEYS: &[&str] = &[
    "ffmpeg_path",
    "ffprobe_path",
    "harmony_exe",
    "harmony_script",
    "harmony_import_script",
    "project_root",
    "scenes_root",
    "animatics_root",
    "bgs_root",
    "rigs_root",
    "fps",
    "detect_fps",
    "harmony_log_dir",
];

/// Settings shared by every tool.
///
/// Path-like values are plain strings; an empty string means "not set".
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToolConfig {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_path: String,

    #[serde(default = "default_ffprobe")]
    pub ffprobe_path: String,

    #[serde(default = "default_harmony_exe")]
    pub harmony_exe: String,

    /// Batch script for scene setup.
    #[serde(default = "default_harmony_script")]
    pub harmony_script: String,

    /// Batch script for animatic import.
    #[serde(default = "default_harmony_import_script")]
    pub harmony_import_script: String,

    #[serde(default)]
    pub project_root: String,

    #[serde(default)]
    pub scenes_root: String,

    #[serde(default)]
    pub animatics_root: String,

    #[serde(default)]
    pub bgs_root: String,

    #[serde(default)]
    pub rigs_root: String,

    /// Frame rate used when detection is off.
    #[serde(default = "default_fps")]
    pub fps: f64,

    /// Ask ffprobe for the master's frame rate before splitting by frames.
    #[serde(default = "default_true")]
    pub detect_fps: bool,

    /// Directory for per-invocation Harmony logs. Empty disables them.
    #[serde(default)]
    pub harmony_log_dir: String,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_harmony_exe() -> String {
    if cfg!(windows) {
        r"C:\Program Files\Toon Boom Harmony 24\win64\bin\Harmony.exe".to_string()
    } else {
        "Harmony".to_string()
    }
}

fn default_harmony_script() -> String {
    "harmony_scripts/run_scene_setup.js".to_string()
}

fn default_harmony_import_script() -> String {
    "harmony_scripts/import_animatic.js".to_string()
}

fn default_fps() -> f64 {
    24.0
}

fn default_true() -> bool {
    true
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg(),
            ffprobe_path: default_ffprobe(),
            harmony_exe: default_harmony_exe(),
            harmony_script: default_harmony_script(),
            harmony_import_script: default_harmony_import_script(),
            project_root: String::new(),
            scenes_root: String::new(),
            animatics_root: String::new(),
            bgs_root: String::new(),
            rigs_root: String::new(),
            fps: default_fps(),
            detect_fps: default_true(),
            harmony_log_dir: String::new(),
        }
    }
}

impl ToolConfig {
    /// Current value of a key, formatted the way `config set` accepts it.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "ffmpeg_path" => self.ffmpeg_path.clone(),
            "ffprobe_path" => self.ffprobe_path.clone(),
            "harmony_exe" => self.harmony_exe.clone(),
            "harmony_script" => self.harmony_script.clone(),
            "harmony_import_script" => self.harmony_import_script.clone(),
            "project_root" => self.project_root.clone(),
            "scenes_root" => self.scenes_root.clone(),
            "animatics_root" => self.animatics_root.clone(),
            "bgs_root" => self.bgs_root.clone(),
            "rigs_root" => self.rigs_root.clone(),
            "fps" => self.fps.to_string(),
            "detect_fps" => self.detect_fps.to_string(),
            "harmony_log_dir" => self.harmony_log_dir.clone(),
            _ => return None,
        };
        Some(value)
    }

    /// Set a key from its text form.
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let slot = match key {
            "ffmpeg_path" => &mut self.ffmpeg_path,
            "ffprobe_path" => &mut self.ffprobe_path,
            "harmony_exe" => &mut self.harmony_exe,
            "harmony_script" => &mut self.harmony_script,
            "harmony_import_script" => &mut self.harmony_import_script,
            "project_root" => &mut self.project_root,
            "scenes_root" => &mut self.scenes_root,
            "animatics_root" => &mut self.animatics_root,
            "bgs_root" => &mut self.bgs_root,
            "rigs_root" => &mut self.rigs_root,
            "harmony_log_dir" => &mut self.harmony_log_dir,
            "fps" => {
                let fps = tbtools_av::timecode::parse_frame_rate(value)?;
                self.fps = fps;
                return Ok(());
            }
            "detect_fps" => {
                self.detect_fps = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("detect_fps must be true or false, got {:?}", value))?;
                return Ok(());
            }
            _ => anyhow::bail!(
                "Unknown config key '{}' (expected one of: {})",
                key,
                CONFIG_KEYS.join(", ")
            ),
        };
        *slot = value.to_string();
        Ok(())
    }

    pub fn ffmpeg(&self) -> PathBuf {
        PathBuf::from(&self.ffmpeg_path)
    }

    pub fn ffprobe(&self) -> PathBuf {
        PathBuf::from(&self.ffprobe_path)
    }

    pub fn harmony_log_dir(&self) -> Option<PathBuf> {
        non_empty_path(&self.harmony_log_dir)
    }

    pub fn scenes_root(&self) -> Option<PathBuf> {
        non_empty_path(&self.scenes_root)
    }

    pub fn animatics_root(&self) -> Option<PathBuf> {
        non_empty_path(&self.animatics_root)
    }
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    (!value.is_empty()).then(|| PathBuf::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ToolConfig::default();
        assert_eq!(config.ffmpeg_path, "ffmpeg");
        assert_eq!(config.ffprobe_path, "ffprobe");
        assert_eq!(config.fps, 24.0);
        assert!(config.detect_fps);
        assert!(config.scenes_root().is_none());
        assert!(config.harmony_log_dir().is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ToolConfig = toml::from_str(
            r#"
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
scenes_root = "/proj/scenes"
"#,
        )
        .unwrap();
        assert_eq!(config.ffmpeg_path, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(config.scenes_root(), Some(PathBuf::from("/proj/scenes")));
        assert_eq!(config.ffprobe_path, "ffprobe");
        assert_eq!(config.harmony_script, "harmony_scripts/run_scene_setup.js");
    }

    #[test]
    fn test_set_and_get_every_key() {
        let mut config = ToolConfig::default();
        for key in CONFIG_KEYS {
            let value = match *key {
                "fps" => "25",
                "detect_fps" => "false",
                _ => "/some/path",
            };
            config.set(key, value).unwrap();
            assert_eq!(config.get(key).as_deref(), Some(value), "key {key}");
        }
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = ToolConfig::default();
        assert!(config.set("fps", "fast").is_err());
        assert!(config.set("fps", "0").is_err());
        assert!(config.set("detect_fps", "maybe").is_err());
        assert!(config.set("no_such_key", "x").is_err());
        assert_eq!(config, ToolConfig::default());
    }

    #[test]
    fn test_set_rational_fps() {
        let mut config = ToolConfig::default();
        config.set("fps", "24000/1001").unwrap();
        assert!((config.fps - 23.976).abs() < 0.001);
    }
}
