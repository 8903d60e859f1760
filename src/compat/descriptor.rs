//! Evaluator input: a container name plus the type and codec of each stream.

use crate::probe::{MediaInfo, StreamKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Stream types the compatibility table knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    Video,
    Audio,
    /// Subtitles, data, attachments. Never affects the verdict.
    Other,
}

impl StreamType {
    /// The types a plan can convert, in output order.
    pub const CONVERTIBLE: [StreamType; 2] = [StreamType::Video, StreamType::Audio];

    pub fn is_convertible(self) -> bool {
        !matches!(self, StreamType::Other)
    }
}

impl From<StreamKind> for StreamType {
    fn from(kind: StreamKind) -> Self {
        match kind {
            StreamKind::Video => StreamType::Video,
            StreamKind::Audio => StreamType::Audio,
            _ => StreamType::Other,
        }
    }
}

impl std::fmt::Display for StreamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamType::Video => write!(f, "video"),
            StreamType::Audio => write!(f, "audio"),
            StreamType::Other => write!(f, "other"),
        }
    }
}

/// One probed stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub stream_type: StreamType,
    pub codec_name: String,
}

impl StreamDescriptor {
    pub fn new(stream_type: StreamType, codec_name: impl Into<String>) -> Self {
        Self {
            stream_type,
            codec_name: codec_name.into(),
        }
    }
}

/// One file as the evaluator sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    /// Lower-case file extension without the dot.
    pub container: String,
    /// Streams in container order.
    pub streams: Vec<StreamDescriptor>,
}

impl MediaDescriptor {
    pub fn new(container: impl Into<String>, streams: Vec<StreamDescriptor>) -> Self {
        Self {
            container: container.into(),
            streams,
        }
    }

    /// Build a descriptor from probe output.
    ///
    /// The container comes from the file name, not from the demuxer ffprobe
    /// picked, so `movie.mp4` is looked up as `mp4` whatever its contents.
    pub fn from_media_info(info: &MediaInfo) -> Self {
        Self {
            container: container_from_path(&info.file_path),
            streams: info
                .streams
                .iter()
                .map(|s| StreamDescriptor::new(s.kind.into(), s.codec.clone()))
                .collect(),
        }
    }
}

/// The table key for a path: its extension, lower-cased, without the dot.
///
/// No alias folding happens here; `m4v` stays `m4v`. A path without an
/// extension yields the empty string, which no table contains.
pub fn container_from_path(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default()
}
