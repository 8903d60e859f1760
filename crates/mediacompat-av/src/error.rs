//! Error types for mediacompat-av.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while probing or transcoding media.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// An external tool failed to execute.
    #[error("tool execution failed: {tool}: {message}")]
    ToolFailed { tool: String, message: String },

    /// Failed to parse tool output.
    #[error("failed to parse {tool} output: {message}")]
    ParseError { tool: String, message: String },

    /// The specified file was not found.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Workspace error.
    #[error("workspace error: {0}")]
    Workspace(String),

    /// The output would overwrite a file that is not the input.
    #[error("destination already exists: {}", path.display())]
    DestinationExists { path: PathBuf },
}

impl Error {
    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a tool execution failed error.
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse_error(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a destination exists error.
    pub fn destination_exists(path: impl Into<PathBuf>) -> Self {
        Self::DestinationExists { path: path.into() }
    }

    /// Whether this error means ffprobe could not make sense of the input.
    ///
    /// ffprobe exits non-zero for anything that is not a media file, so a
    /// failed probe run is how "not a media file" shows up.
    pub fn is_not_media(&self) -> bool {
        matches!(self, Self::ToolFailed { tool, .. } if tool == "ffprobe")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_media_detection() {
        assert!(Error::tool_failed("ffprobe", "Invalid data found").is_not_media());
        assert!(!Error::tool_failed("ffmpeg", "boom").is_not_media());
        assert!(!Error::tool_not_found("ffprobe").is_not_media());
    }

    #[test]
    fn test_display() {
        let err = Error::tool_failed("ffmpeg", "exit status 1");
        assert_eq!(err.to_string(), "tool execution failed: ffmpeg: exit status 1");
    }
}
