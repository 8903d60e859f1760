//! Media file probing for the scanner.

use crate::probe::{MediaInfo, Tools};
use anyhow::Result;
use std::path::Path;

/// File prober bound to one ffprobe executable.
#[derive(Debug, Clone, Default)]
pub struct FileProber {
    tools: Tools,
}

impl FileProber {
    pub fn new(tools: Tools) -> Self {
        Self { tools }
    }

    /// Probe a media file and return its information.
    pub fn probe(&self, path: &Path) -> Result<MediaInfo> {
        crate::probe::probe_file(path, &self.tools)
    }
}
