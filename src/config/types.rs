use crate::compat::{CompatPolicy, CompatibilityTable, TargetEncoding};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// What rejected streams are converted to.
    #[serde(default)]
    pub target: TargetEncoding,

    /// Allowed codecs per container. A `[compat.video]` or `[compat.audio]`
    /// section replaces the built-in sub-table of the same name.
    #[serde(default)]
    pub compat: CompatibilityTable,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Config {
    /// The evaluation policy described by this config.
    pub fn policy(&self) -> CompatPolicy {
        CompatPolicy::new(self.compat.clone(), self.target.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScanConfig {
    /// File extensions worth probing. Everything else is skipped unseen.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Follow symlinks while walking directories (default: true)
    #[serde(default = "default_follow_links")]
    pub follow_links: bool,

    /// Inserted before the new extension of a converted file (default: ".new")
    #[serde(default = "default_new_suffix")]
    pub new_suffix: String,
}

fn default_extensions() -> Vec<String> {
    [
        "mkv", "mp4", "m4v", "avi", "mov", "wmv", "asf", "flv", "webm", "ts", "mpeg", "mpg",
        "mpegts", "3gp", "3gpp",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_follow_links() -> bool {
    true
}

fn default_new_suffix() -> String {
    ".new".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            follow_links: default_follow_links(),
            new_suffix: default_new_suffix(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}
