//! File discovery.
//!
//! Walks a file or directory and hands back every regular file beneath it.
//! Whether a file is worth probing is the [`FileClassifier`]'s call.

pub mod classifier;
pub mod prober;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

pub use classifier::FileClassifier;
pub use prober::FileProber;

/// Name prefix of the transcode workspaces created next to input files.
const WORKSPACE_PREFIX: &str = ".mediacompat-";

/// Collect the files under `path`, in a stable order.
///
/// A file path yields itself. Directories are walked recursively; unreadable
/// entries are logged and skipped, and leftover transcode workspaces are not
/// descended into.
pub fn collect_files(path: &Path, follow_links: bool) -> Result<Vec<PathBuf>> {
    let metadata =
        std::fs::metadata(path).with_context(|| format!("Cannot access {:?}", path))?;

    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    debug!("Scanning directory: {:?}", path);
    let mut files = Vec::new();

    for entry in WalkDir::new(path)
        .follow_links(follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_workspace(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    debug!("Found {} files under {:?}", files.len(), path);
    Ok(files)
}

fn is_workspace(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with(WORKSPACE_PREFIX))
            .unwrap_or(false)
}
