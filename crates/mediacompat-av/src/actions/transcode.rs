//! Container conversion with per-stream copy or re-encode.

use crate::{Error, Result, Workspace};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

/// What to do with one kind of stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamCodec {
    /// Carry the stream over without re-encoding.
    Copy,
    /// Re-encode with the named ffmpeg encoder.
    Encode(String),
}

impl StreamCodec {
    /// The value passed to ffmpeg's `-c:v` / `-c:a`.
    pub fn ffmpeg_arg(&self) -> &str {
        match self {
            StreamCodec::Copy => "copy",
            StreamCodec::Encode(codec) => codec,
        }
    }

    pub fn is_copy(&self) -> bool {
        matches!(self, StreamCodec::Copy)
    }
}

impl std::fmt::Display for StreamCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.ffmpeg_arg())
    }
}

/// Everything ffmpeg needs to know about the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscodeSpec {
    /// Output container, as a file extension (e.g., "mkv").
    pub container: String,
    pub video: StreamCodec,
    pub audio: StreamCodec,
}

/// ffmpeg muxer name for a container extension, when it differs from the
/// extension or ffmpeg cannot guess it from the file name.
pub fn muxer_for(container: &str) -> Option<&'static str> {
    match container.to_lowercase().as_str() {
        "mkv" | "matroska" => Some("matroska"),
        "mp4" | "m4v" => Some("mp4"),
        "mov" => Some("mov"),
        "webm" => Some("webm"),
        "avi" => Some("avi"),
        "asf" | "wmv" => Some("asf"),
        "3gp" | "3gpp" => Some("3gp"),
        "mpeg" | "mpg" => Some("mpeg"),
        "ts" | "m2ts" | "mpegts" => Some("mpegts"),
        _ => None,
    }
}

/// Build the ffmpeg argument list for a transcode.
pub fn ffmpeg_args(input: &Path, output: &Path, spec: &TranscodeSpec) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), input.into()];

    args.push("-c:v".into());
    args.push(spec.video.ffmpeg_arg().into());
    args.push("-c:a".into());
    args.push(spec.audio.ffmpeg_arg().into());

    if let Some(muxer) = muxer_for(&spec.container) {
        if muxer == "mp4" {
            args.push("-movflags".into());
            args.push("+faststart".into());
        }
        args.push("-f".into());
        args.push(muxer.into());
    }

    args.push(output.into());
    args
}

/// Transcode the workspace input according to `spec`.
///
/// The result is left at [`Workspace::output`]; the caller decides where it
/// goes with [`Workspace::finalize`].
pub fn transcode(ffmpeg: &Path, workspace: &Workspace, spec: &TranscodeSpec) -> Result<()> {
    let input = workspace.input();
    let stem = input
        .file_stem()
        .ok_or_else(|| Error::InvalidInput(format!("Invalid input file path: {:?}", input)))?;

    let output = workspace.temp_file(&format!("{}.{}", stem.to_string_lossy(), spec.container));

    #[cfg(feature = "tracing")]
    tracing::info!(
        "Transcoding {:?} to {} (video: {}, audio: {})",
        input,
        spec.container,
        spec.video,
        spec.audio
    );

    let result = Command::new(ffmpeg)
        .args(ffmpeg_args(input, &output, spec))
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found("ffmpeg")
            } else {
                Error::Io(e)
            }
        })?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
        let message = tail.into_iter().rev().collect::<Vec<_>>().join("\n");
        return Err(Error::tool_failed("ffmpeg", message));
    }

    std::fs::rename(&output, workspace.output())?;

    #[cfg(feature = "tracing")]
    tracing::debug!("Transcode complete: {:?}", workspace.output());

    Ok(())
}
