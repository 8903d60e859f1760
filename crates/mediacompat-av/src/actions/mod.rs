//! Media processing actions.

mod transcode;

pub use transcode::{ffmpeg_args, muxer_for, transcode, StreamCodec, TranscodeSpec};
