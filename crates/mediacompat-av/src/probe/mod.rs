//! Media file probing module.
//!
//! Probing shells out to `ffprobe` and parses its JSON output. A failed
//! ffprobe run is how a file that is not media reports itself; see
//! [`Error::is_not_media`](crate::Error::is_not_media).

mod ffprobe;
mod types;

pub use ffprobe::{parse_ffprobe_json, probe_with_ffprobe};
pub use types::*;

use crate::Result;
use std::path::Path;

/// Probe a media file with the `ffprobe` found on PATH.
pub fn probe(path: &Path) -> Result<MediaInfo> {
    probe_with_ffprobe(Path::new("ffprobe"), path)
}
