//! The pure verdict: which stream types of a file must be re-encoded.

use super::{CompatibilityTable, MediaDescriptor, StreamType, TargetEncoding};
use mediacompat_av::actions::{StreamCodec, TranscodeSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A stream the table rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedStream {
    /// Position in [`MediaDescriptor::streams`].
    pub position: usize,
    pub stream_type: StreamType,
    pub codec_name: String,
}

/// The verdict for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionPlan {
    pub needs_conversion: bool,
    /// Subset of video and audio.
    pub types_to_convert: BTreeSet<StreamType>,
    pub video_codec: StreamCodec,
    pub audio_codec: StreamCodec,
    /// Output container; set exactly when `needs_conversion` is.
    pub container: Option<String>,
    /// Every stream that caused a type to be converted, in stream order.
    pub rejected: Vec<RejectedStream>,
}

impl ConversionPlan {
    /// The plan for a file that can stay as it is.
    pub fn compliant() -> Self {
        Self {
            needs_conversion: false,
            types_to_convert: BTreeSet::new(),
            video_codec: StreamCodec::Copy,
            audio_codec: StreamCodec::Copy,
            container: None,
            rejected: Vec::new(),
        }
    }

    pub fn converts(&self, stream_type: StreamType) -> bool {
        self.types_to_convert.contains(&stream_type)
    }

    /// ffmpeg parameters for carrying out the plan, if there is anything to do.
    pub fn transcode_spec(&self) -> Option<TranscodeSpec> {
        let container = self.container.as_ref()?;
        Some(TranscodeSpec {
            container: container.clone(),
            video: self.video_codec.clone(),
            audio: self.audio_codec.clone(),
        })
    }
}

/// Decide whether `media` is acceptable and, if not, what to convert.
///
/// A stream type is converted as soon as one of its streams carries a codec
/// the table does not list for the container; a container the table does not
/// list rejects every audio and video stream. Video and audio are decided
/// independently, so an unsupported audio track leaves video on copy. The
/// container is always replaced by the target when anything is converted.
pub fn evaluate(
    media: &MediaDescriptor,
    table: &CompatibilityTable,
    target: &TargetEncoding,
) -> ConversionPlan {
    let mut types_to_convert = BTreeSet::new();
    let mut rejected = Vec::new();

    for (position, stream) in media.streams.iter().enumerate() {
        if !stream.stream_type.is_convertible() {
            continue;
        }

        let allowed = table.allowed_codecs(stream.stream_type, &media.container);
        if !allowed.contains(&stream.codec_name) {
            types_to_convert.insert(stream.stream_type);
            rejected.push(RejectedStream {
                position,
                stream_type: stream.stream_type,
                codec_name: stream.codec_name.clone(),
            });
        }
    }

    if types_to_convert.is_empty() {
        return ConversionPlan::compliant();
    }

    let decide = |stream_type: StreamType, codec: &str| {
        if types_to_convert.contains(&stream_type) {
            StreamCodec::Encode(codec.to_string())
        } else {
            StreamCodec::Copy
        }
    };
    let video_codec = decide(StreamType::Video, &target.video_codec);
    let audio_codec = decide(StreamType::Audio, &target.audio_codec);

    ConversionPlan {
        needs_conversion: true,
        types_to_convert,
        video_codec,
        audio_codec,
        container: Some(target.container.clone()),
        rejected,
    }
}
