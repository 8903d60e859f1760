use super::{MediaDescriptor, StreamDescriptor, StreamType, TargetEncoding};
use mediacompat_av::actions::StreamCodec;

pub fn media(container: &str, streams: &[(StreamType, &str)]) -> MediaDescriptor {
    MediaDescriptor::new(
        container,
        streams
            .iter()
            .map(|(stream_type, codec)| StreamDescriptor::new(*stream_type, *codec))
            .collect(),
    )
}

pub fn target() -> TargetEncoding {
    TargetEncoding::default()
}

pub fn encode(codec: &str) -> StreamCodec {
    StreamCodec::Encode(codec.to_string())
}
