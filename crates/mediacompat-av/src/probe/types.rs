//! Media information types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Information about a media file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Path to the media file.
    pub file_path: PathBuf,
    /// File size in bytes.
    pub file_size: u64,
    /// Demuxer name as reported by ffprobe (e.g., "matroska,webm").
    pub format_name: String,
    /// Duration of the media.
    pub duration: Option<Duration>,
    /// Streams in container order.
    pub streams: Vec<StreamInfo>,
}

/// Kind of an elementary stream, mirroring ffprobe's `codec_type`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Data,
    Attachment,
    /// Anything ffprobe reports that we do not recognise.
    Unknown,
}

impl StreamKind {
    /// Map an ffprobe `codec_type` string.
    pub fn from_codec_type(codec_type: &str) -> Self {
        match codec_type {
            "video" => StreamKind::Video,
            "audio" => StreamKind::Audio,
            "subtitle" => StreamKind::Subtitle,
            "data" => StreamKind::Data,
            "attachment" => StreamKind::Attachment,
            _ => StreamKind::Unknown,
        }
    }
}

/// Information about a single stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Absolute stream index within the container.
    pub index: u32,
    /// Stream kind.
    pub kind: StreamKind,
    /// ffmpeg codec name (e.g., "h264", "aac"). Empty when ffprobe reports none.
    pub codec: String,
    /// Width in pixels (video only).
    pub width: Option<u32>,
    /// Height in pixels (video only).
    pub height: Option<u32>,
    /// Number of channels (audio only).
    pub channels: Option<u32>,
    /// Language code (e.g., "eng", "spa").
    pub language: Option<String>,
    /// Whether this is the default stream of its kind.
    pub default: bool,
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamKind::Video => write!(f, "video"),
            StreamKind::Audio => write!(f, "audio"),
            StreamKind::Subtitle => write!(f, "subtitle"),
            StreamKind::Data => write!(f, "data"),
            StreamKind::Attachment => write!(f, "attachment"),
            StreamKind::Unknown => write!(f, "unknown"),
        }
    }
}
