//! Harmony batch invocations.

use std::fs;
use std::path::{Path, PathBuf};

use tbtools_av::tools::resolve_tool;
use tbtools_av::{ToolCommand, ToolOutput};
use tbtools_common::{Error, Result};

use crate::job::JOB_ENV_VAR;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A Harmony executable plus the batch script it runs.
#[derive(Debug, Clone)]
pub struct HarmonyBatch {
    pub exe: PathBuf,
    pub script: PathBuf,
    /// When set, each invocation writes a log file here.
    pub log_dir: Option<PathBuf>,
}

impl HarmonyBatch {
    pub fn new(exe: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        Self {
            exe: exe.into(),
            script: script.into(),
            log_dir: None,
        }
    }

    pub fn with_log_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.log_dir = dir;
        self
    }

    /// Fail early if the executable or script is missing.
    ///
    /// A bare executable name is looked up in `PATH`. Returns a copy with the
    /// executable resolved to a full path.
    pub fn preflight(&self) -> Result<HarmonyBatch> {
        let exe = resolve_tool(&self.exe).map_err(|_| Error::missing_file(&self.exe))?;
        if !self.script.is_file() {
            return Err(Error::missing_file(&self.script));
        }
        Ok(HarmonyBatch {
            exe,
            ..self.clone()
        })
    }

    /// `<exe> -batch -scene <xstage> -script <js>` with the job path in the
    /// environment.
    pub fn command(&self, xstage: &Path, job: &Path) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.exe);
        cmd.arg("-batch")
            .arg("-scene")
            .path_arg(xstage)
            .arg("-script")
            .path_arg(&self.script)
            .env(JOB_ENV_VAR, job.display().to_string());
        cmd
    }

    /// Run the script against one scene and wait for it.
    ///
    /// # Errors
    ///
    /// [`Error::ExternalToolFailed`] if Harmony exits non-zero.
    pub fn run(&self, scene_id: &str, xstage: &Path, job: &Path) -> Result<ToolOutput> {
        strip_utf8_bom(&self.script)?;

        let cmd = self.command(xstage, job);
        tracing::debug!("Running {}", cmd);
        let output = cmd.output()?;

        if let Some(dir) = &self.log_dir {
            if let Err(e) = self.write_log(dir, scene_id, &cmd, &output) {
                tracing::warn!("Could not write Harmony log to {:?}: {}", dir, e);
            }
        }

        if !output.success() {
            return Err(Error::tool_failed(
                "Harmony",
                format!(
                    "{} on {} ({})",
                    output.status,
                    xstage.display(),
                    output.stderr.trim()
                ),
            ));
        }
        Ok(output)
    }

    fn write_log(
        &self,
        dir: &Path,
        scene_id: &str,
        cmd: &ToolCommand,
        output: &ToolOutput,
    ) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("harmony_batch_{scene_id}_{stamp}.log"));

        let body = format!(
            "CMD: {cmd}\nEXIT: {}\n\nSTDOUT:\n{}\n\nSTDERR:\n{}\n",
            output.status, output.stdout, output.stderr
        );
        fs::write(&path, body)?;
        Ok(path)
    }
}

/// Remove a leading UTF-8 byte order mark from a script in place.
///
/// Harmony's script engine rejects files that start with one. Returns whether
/// the file was rewritten.
pub fn strip_utf8_bom(path: &Path) -> Result<bool> {
    let bytes = fs::read(path)?;
    match bytes.strip_prefix(UTF8_BOM) {
        Some(rest) => {
            fs::write(path, rest)?;
            tracing::debug!("Stripped UTF-8 BOM from {:?}", path);
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_shape() {
        let harmony = HarmonyBatch::new("/opt/harmony/Harmony", "/scripts/run_scene_setup.js");
        let cmd = harmony.command(Path::new("/s/C01/C01.xstage"), Path::new("/s/C01/job.json"));
        assert_eq!(cmd.program(), Path::new("/opt/harmony/Harmony"));
        assert_eq!(
            cmd.get_args(),
            [
                "-batch",
                "-scene",
                "/s/C01/C01.xstage",
                "-script",
                "/scripts/run_scene_setup.js"
            ]
        );
    }

    #[test]
    fn test_strip_bom() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("run.js");
        fs::write(&script, b"\xEF\xBB\xBFvar x = 1;").unwrap();

        assert!(strip_utf8_bom(&script).unwrap());
        assert_eq!(fs::read(&script).unwrap(), b"var x = 1;");
        assert!(!strip_utf8_bom(&script).unwrap());
    }

    #[test]
    fn test_preflight_reports_missing_exe() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("run.js");
        fs::write(&script, "").unwrap();
        let harmony = HarmonyBatch::new(dir.path().join("Harmony"), &script);

        assert!(matches!(
            harmony.preflight(),
            Err(Error::MissingFile { path }) if path == dir.path().join("Harmony")
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_preflight_finds_bare_name_in_path() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("run.js");
        fs::write(&script, "").unwrap();

        let resolved = HarmonyBatch::new("sh", &script).preflight().unwrap();
        assert!(resolved.exe.is_absolute());
        assert_eq!(resolved.exe.file_name().unwrap(), "sh");
        assert_eq!(resolved.script, script);

        let cmd = resolved.command(Path::new("C01.xstage"), Path::new("job.json"));
        assert_eq!(cmd.program(), resolved.exe.as_path());
    }

    #[test]
    fn test_preflight_reports_missing_script() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("Harmony");
        fs::write(&exe, "").unwrap();
        let harmony = HarmonyBatch::new(&exe, dir.path().join("run.js"));

        assert!(matches!(
            harmony.preflight(),
            Err(Error::MissingFile { path }) if path == dir.path().join("run.js")
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_passes_job_env_and_logs() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("harmony");
        fs::write(&exe, "#!/bin/sh\necho \"job=$TB_JOB\"\n").unwrap();
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
        let script = dir.path().join("setup.js");
        fs::write(&script, b"\xEF\xBB\xBF// setup").unwrap();
        let logs = dir.path().join("logs");

        let harmony = HarmonyBatch::new(&exe, &script).with_log_dir(Some(logs.clone()));
        let output = harmony
            .run("C01", Path::new("C01.xstage"), Path::new("/jobs/C01.json"))
            .unwrap();

        assert_eq!(output.stdout.trim(), "job=/jobs/C01.json");
        assert_eq!(fs::read(&script).unwrap(), b"// setup");

        let entries: Vec<_> = fs::read_dir(&logs).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let name = entries[0].as_ref().unwrap().file_name();
        assert!(name.to_string_lossy().starts_with("harmony_batch_C01_"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_nonzero_exit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("harmony");
        fs::write(&exe, "#!/bin/sh\necho boom >&2\nexit 3\n").unwrap();
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
        let script = dir.path().join("setup.js");
        fs::write(&script, "").unwrap();

        let harmony = HarmonyBatch::new(&exe, &script);
        let result = harmony.run("C01", Path::new("C01.xstage"), Path::new("job.json"));
        assert!(matches!(
            result,
            Err(Error::ExternalToolFailed { ref tool, .. }) if tool == "Harmony"
        ));
    }
}
