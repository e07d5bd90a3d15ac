//! Builder for executing external tool commands.
//!
//! Commands block the calling thread until the child exits. There is no
//! timeout: a hung tool hangs the run.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use tbtools_common::{Error, Result};

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

impl ToolOutput {
    /// Whether the process exited successfully.
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use tbtools_av::ToolCommand;
///
/// let output = ToolCommand::new("ffprobe")
///     .args(["-v", "error", "-select_streams", "a"])
///     .arg("/path/to/master.mp4")
///     .output()?;
/// println!("{}", output.stdout);
/// # Ok::<(), tbtools_common::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append a path argument.
    pub fn path_arg(&mut self, p: &Path) -> &mut Self {
        self.args.push(p.display().to_string());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child, on top of the inherited
    /// environment.
    pub fn env(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// The program this command will run.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The arguments passed to the program.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Run the command and capture its output, whatever the exit status.
    ///
    /// # Errors
    ///
    /// - [`Error::ToolNotFound`] if the program does not exist.
    /// - [`Error::Io`] if spawning or waiting fails for another reason.
    pub fn output(&self) -> Result<ToolOutput> {
        tracing::debug!("Running: {}", self);

        let output = Command::new(&self.program)
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::tool_not_found(self.program.display().to_string())
                } else {
                    Error::Io(e)
                }
            })?;

        Ok(ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_args() {
        let mut cmd = ToolCommand::new("ffmpeg");
        cmd.args(["-hide_banner", "-y"]).arg("out.mp4");
        assert_eq!(cmd.to_string(), "ffmpeg -hide_banner -y out.mp4");
    }

    #[test]
    fn output_nonexistent_tool() {
        let result = ToolCommand::new("nonexistent_tool_xyz_12345").output();
        assert!(matches!(result, Err(Error::ToolNotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn output_keeps_nonzero_exit() {
        let output = ToolCommand::new("sh")
            .args(["-c", "echo boom >&2; exit 3"])
            .output()
            .unwrap();
        assert!(!output.success());
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(output.stderr.trim(), "boom");
    }

    #[cfg(unix)]
    #[test]
    fn env_is_passed_to_child() {
        let output = ToolCommand::new("sh")
            .args(["-c", "printf %s \"$TB_TEST_VAR\""])
            .env("TB_TEST_VAR", "hello")
            .output()
            .unwrap();
        assert_eq!(output.stdout, "hello");
    }
}
