//! # mediacompat-av
//!
//! ffprobe/ffmpeg glue for mediacompat.
//!
//! This crate provides functionality for:
//! - Probing media files into a list of typed streams
//! - Transcoding a file into a new container, copying or re-encoding video
//!   and audio independently
//! - Locating the external tools
//!
//! ## Features
//!
//! - `probe` (default) - Probing using ffprobe
//! - `transcode` (default) - Transcoding using ffmpeg
//! - `all` - Enable all features
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use mediacompat_av::probe;
//!
//! let info = probe("/path/to/video.mkv")?;
//! for stream in &info.streams {
//!     println!("{}: {}", stream.kind, stream.codec);
//! }
//! # Ok::<(), mediacompat_av::Error>(())
//! ```

mod error;
pub mod probe;
pub mod tools;
pub mod workspace;

#[cfg(feature = "transcode")]
pub mod actions;

// Re-exports
pub use error::{Error, Result};
pub use probe::{MediaInfo, StreamInfo, StreamKind};
pub use tools::{check_tool, check_tools, require_tool, ToolInfo, Tools};
pub use workspace::Workspace;

/// Probe a media file with the `ffprobe` on PATH.
///
/// # Example
///
/// ```no_run
/// use mediacompat_av::probe;
///
/// let info = probe("/path/to/video.mkv")?;
/// println!("Format: {}", info.format_name);
/// # Ok::<(), mediacompat_av::Error>(())
/// ```
pub fn probe<P: AsRef<std::path::Path>>(path: P) -> Result<MediaInfo> {
    probe::probe(path.as_ref())
}

/// Probe a media file with a specific ffprobe executable.
pub fn probe_with<P: AsRef<std::path::Path>>(path: P, tools: &Tools) -> Result<MediaInfo> {
    probe::probe_with_ffprobe(&tools.ffprobe, path.as_ref())
}
