// Re-export probe functionality from mediacompat-av
pub use mediacompat_av::probe::*;
pub use mediacompat_av::{check_tool, check_tools, require_tool, ToolInfo, Tools};

use anyhow::{Context, Result};
use std::path::Path;

/// Probe a media file with the given tools
pub fn probe_file(path: &Path, tools: &Tools) -> Result<MediaInfo> {
    mediacompat_av::probe_with(path, tools).with_context(|| format!("Failed to probe {:?}", path))
}
