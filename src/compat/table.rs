//! The compatibility table and the conversion target.

use super::StreamType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Codec names allowed per container, for one stream type.
pub type ContainerCodecs = BTreeMap<String, BTreeSet<String>>;

static NO_CODECS: BTreeSet<String> = BTreeSet::new();

/// Which codecs each container may carry, kept separately for video and audio.
///
/// Containers are keyed by lower-case file extension without the dot. A
/// container missing from a sub-table allows nothing, so every stream of that
/// type in it is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityTable {
    #[serde(default = "default_video")]
    pub video: ContainerCodecs,

    #[serde(default = "default_audio")]
    pub audio: ContainerCodecs,
}

impl CompatibilityTable {
    /// Build a table from explicit sub-tables.
    pub fn new(video: ContainerCodecs, audio: ContainerCodecs) -> Self {
        Self { video, audio }.normalized()
    }

    /// Codecs allowed for `stream_type` inside `container`.
    ///
    /// Unknown containers and non audio/video stream types get the empty set.
    pub fn allowed_codecs(&self, stream_type: StreamType, container: &str) -> &BTreeSet<String> {
        let sub_table = match stream_type {
            StreamType::Video => &self.video,
            StreamType::Audio => &self.audio,
            StreamType::Other => return &NO_CODECS,
        };

        sub_table.get(container).unwrap_or(&NO_CODECS)
    }

    /// Whether `codec` may stay as-is in `container`.
    pub fn is_allowed(&self, stream_type: StreamType, container: &str, codec: &str) -> bool {
        self.allowed_codecs(stream_type, container).contains(codec)
    }

    /// Containers that appear in either sub-table.
    pub fn containers(&self) -> BTreeSet<&str> {
        self.video
            .keys()
            .chain(self.audio.keys())
            .map(String::as_str)
            .collect()
    }

    /// Lower-case every container key and codec name.
    pub fn normalized(self) -> Self {
        Self {
            video: normalize(self.video),
            audio: normalize(self.audio),
        }
    }
}

fn normalize(codecs: ContainerCodecs) -> ContainerCodecs {
    let mut out = ContainerCodecs::new();
    for (container, allowed) in codecs {
        out.entry(container.trim().trim_start_matches('.').to_lowercase())
            .or_default()
            .extend(allowed.into_iter().map(|c| c.trim().to_lowercase()));
    }
    out
}

fn sub_table(entries: &[(&str, &[&str])]) -> ContainerCodecs {
    entries
        .iter()
        .map(|(container, codecs)| {
            (
                container.to_string(),
                codecs.iter().map(|c| c.to_string()).collect(),
            )
        })
        .collect()
}

fn default_video() -> ContainerCodecs {
    // png shows up as a "video" stream for embedded cover art.
    sub_table(&[
        ("asf", &["h264", "mpeg4", "mjpeg", "wmv2", "wmv3", "png"]),
        ("avi", &["h264", "mpeg4", "mjpeg", "png"]),
        ("mkv", &["h264", "mpeg4", "mjpeg", "png"]),
        ("mp4", &["h264", "mpeg4", "png"]),
        ("3gpp", &["h264", "mpeg4", "png"]),
        ("mpeg", &["mpeg1video", "mpeg2video", "h264", "png"]),
        ("mpegts", &["mpeg2video", "h264", "vc1", "png"]),
    ])
}

fn default_audio() -> ContainerCodecs {
    sub_table(&[
        ("asf", &["mp3", "ac3", "mwav2", "wmapro", "wmavoice"]),
        ("avi", &["mp3", "ac3", "dca"]),
        ("mkv", &["mp3", "ac3", "dca", "aac"]),
        ("mp4", &["mp3", "aac", "ac3"]),
        ("3gpp", &["aac"]),
        ("mpeg", &["ac3", "mp2", "mp3", "aac"]),
        ("mpegts", &["aac", "mp3", "ac3"]),
    ])
}

impl Default for CompatibilityTable {
    fn default() -> Self {
        Self {
            video: default_video(),
            audio: default_audio(),
        }
    }
}

/// What a rejected stream type is converted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEncoding {
    /// Output container, as a file extension.
    #[serde(default = "default_container")]
    pub container: String,

    /// ffmpeg encoder for rejected video.
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// ffmpeg encoder for rejected audio.
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
}

impl TargetEncoding {
    /// The configured codec for a stream type, if it is one we convert.
    pub fn codec_for(&self, stream_type: StreamType) -> Option<&str> {
        match stream_type {
            StreamType::Video => Some(&self.video_codec),
            StreamType::Audio => Some(&self.audio_codec),
            StreamType::Other => None,
        }
    }
}

fn default_container() -> String {
    "mkv".to_string()
}

fn default_video_codec() -> String {
    "h264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

impl Default for TargetEncoding {
    fn default() -> Self {
        Self {
            container: default_container(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
        }
    }
}
