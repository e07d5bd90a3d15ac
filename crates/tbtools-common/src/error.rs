//! Common error type used throughout tbtools.
//!
//! Every failure a batch run can hit maps to one of these variants. Runs stop
//! on the first error; nothing here is retried.

use std::path::PathBuf;

/// Common error type for tbtools.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed user-supplied frame count, frame rate or timestamp text.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A required input path does not exist.
    #[error("File not found: {}", path.display())]
    MissingFile { path: PathBuf },

    /// The media inspection tool failed or returned unusable output.
    #[error("Probe failed: {0}")]
    ProbeFailed(String),

    /// The transcoder or the authoring application exited non-zero.
    #[error("{tool} failed: {message}")]
    ExternalToolFailed { tool: String, message: String },

    /// An external executable could not be located or spawned.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// The scene manifest is malformed or incomplete.
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// No working directory could be derived for a scene record.
    #[error("Cannot resolve directory for scene '{0}'")]
    UnresolvableScene(String),

    /// None of the requested scene ids appear in the manifest.
    #[error("None of the requested scenes were found in the manifest: {}", requested.join(", "))]
    NoScenesMatched { requested: Vec<String> },

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new MissingFile error.
    pub fn missing_file(path: impl Into<PathBuf>) -> Self {
        Self::MissingFile { path: path.into() }
    }

    /// Create a new ProbeFailed error.
    pub fn probe_failed<S: Into<String>>(msg: S) -> Self {
        Self::ProbeFailed(msg.into())
    }

    /// Create a new ExternalToolFailed error.
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a new ToolNotFound error.
    pub fn tool_not_found<S: Into<String>>(tool: S) -> Self {
        Self::ToolNotFound(tool.into())
    }

    /// Create a new InvalidManifest error.
    pub fn invalid_manifest<S: Into<String>>(msg: S) -> Self {
        Self::InvalidManifest(msg.into())
    }

    /// Create a new UnresolvableScene error.
    pub fn unresolvable_scene<S: Into<String>>(scene_id: S) -> Self {
        Self::UnresolvableScene(scene_id.into())
    }

    /// Whether this error came from an external process exiting non-zero.
    ///
    /// The host reports these under a separate heading from input and
    /// manifest problems.
    pub fn is_external_failure(&self) -> bool {
        matches!(self, Self::ExternalToolFailed { .. })
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_input("abc");
        assert_eq!(err.to_string(), "Invalid input: abc");

        let err = Error::missing_file("/tmp/master.mp4");
        assert_eq!(err.to_string(), "File not found: /tmp/master.mp4");

        let err = Error::tool_failed("ffmpeg", "exit status 1");
        assert_eq!(err.to_string(), "ffmpeg failed: exit status 1");

        let err = Error::unresolvable_scene("C07");
        assert_eq!(err.to_string(), "Cannot resolve directory for scene 'C07'");

        let err = Error::NoScenesMatched {
            requested: vec!["C02".to_string(), "C03".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "None of the requested scenes were found in the manifest: C02, C03"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_external_failure_category() {
        assert!(Error::tool_failed("Harmony", "exit status 3").is_external_failure());
        assert!(!Error::probe_failed("empty output").is_external_failure());
        assert!(!Error::invalid_manifest("no scenes").is_external_failure());
    }
}
