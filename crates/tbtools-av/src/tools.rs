//! External tool detection.

use std::path::{Path, PathBuf};
use std::process::Command;

use tbtools_common::{Error, Result};

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check if a tool is available by running it with `version_arg`.
///
/// `program` may be a bare name looked up in `PATH` or a full path.
///
/// # Example
///
/// ```no_run
/// use tbtools_av::tools::check_tool;
///
/// let info = check_tool("ffprobe", "ffprobe", "-version");
/// if info.available {
///     println!("ffprobe version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(name: &str, program: impl AsRef<Path>, version_arg: &str) -> ToolInfo {
    let program = program.as_ref();
    let result = Command::new(program).arg(version_arg).output();

    match result {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path: locate(program),
            }
        }
        _ => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Check that an executable exists without running it.
///
/// The authoring application opens a window or a licence check when started
/// without a scene, so it is only checked for presence.
pub fn check_executable(name: &str, program: impl AsRef<Path>) -> ToolInfo {
    let path = locate(program.as_ref());
    ToolInfo {
        name: name.to_string(),
        available: path.is_some(),
        version: None,
        path,
    }
}

/// Resolve a configured tool location to an executable path.
///
/// An existing path is used directly; anything else (typically a bare name
/// such as `ffmpeg`) is searched for in `PATH`.
///
/// # Errors
///
/// Returns [`Error::ToolNotFound`] if the tool cannot be located.
pub fn resolve_tool(configured: impl AsRef<Path>) -> Result<PathBuf> {
    let configured = configured.as_ref();
    locate(configured).ok_or_else(|| Error::tool_not_found(configured.display().to_string()))
}

fn locate(program: &Path) -> Option<PathBuf> {
    if program.is_file() {
        return Some(program.to_path_buf());
    }
    which::which(program).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tool_not_found() {
        let info = check_tool("nope", "nonexistent_tool_12345", "--version");
        assert!(!info.available);
        assert!(info.version.is_none());
        assert!(info.path.is_none());
    }

    #[test]
    fn test_resolve_missing_tool() {
        let result = resolve_tool("nonexistent_tool_12345");
        assert!(matches!(result, Err(Error::ToolNotFound(_))));
    }

    #[test]
    fn test_resolve_existing_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let resolved = resolve_tool(file.path()).unwrap();
        assert_eq!(resolved, file.path());
    }

    #[test]
    fn test_check_executable_missing() {
        let info = check_executable("Harmony", "/nonexistent/Harmony.exe");
        assert!(!info.available);
        assert!(info.path.is_none());
    }
}
