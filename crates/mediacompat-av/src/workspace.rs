//! Scratch space for a single transcode.

use crate::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Workspace for one transcode.
///
/// The temporary directory is created next to the input file so that
/// [`Workspace::finalize`] can move the result into place with a plain
/// rename on the same filesystem.
///
/// # Example
///
/// ```no_run
/// use mediacompat_av::Workspace;
///
/// let workspace = Workspace::new("/path/to/input.avi")?;
/// // Write the result to workspace.output(), then move it next to the input
/// workspace.finalize(Some(std::path::Path::new("/path/to/input.new.mkv")))?;
/// # Ok::<(), mediacompat_av::Error>(())
/// ```
pub struct Workspace {
    temp_dir: TempDir,
    input_path: PathBuf,
    output_path: PathBuf,
}

impl Workspace {
    /// Create a new workspace for processing a file.
    pub fn new<P: AsRef<Path>>(input: P) -> Result<Self> {
        let input = input.as_ref();

        let file_name = input
            .file_name()
            .ok_or_else(|| Error::InvalidInput("Invalid input file path".to_string()))?;

        let parent = match input.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let temp_dir = tempfile::Builder::new()
            .prefix(".mediacompat-")
            .tempdir_in(parent)
            .map_err(|e| Error::Workspace(e.to_string()))?;

        let output_path = temp_dir.path().join(file_name);

        Ok(Self {
            temp_dir,
            input_path: input.to_path_buf(),
            output_path,
        })
    }

    /// Get the input file path.
    pub fn input(&self) -> &Path {
        &self.input_path
    }

    /// Get the output file path.
    pub fn output(&self) -> &Path {
        &self.output_path
    }

    /// Get the temp directory path.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a temp file path with the given name.
    pub fn temp_file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Move the final output to the destination (the input path if `None`).
    ///
    /// An existing destination is renamed to `<name>.bak` first and restored
    /// if the move fails.
    pub fn finalize(self, destination: Option<&Path>) -> Result<PathBuf> {
        let dest = destination.unwrap_or(&self.input_path);

        if !self.output_path.exists() {
            return Err(Error::Workspace(format!(
                "Output file does not exist: {:?}",
                self.output_path
            )));
        }

        if dest.exists() {
            let backup = backup_path(dest);
            std::fs::rename(dest, &backup).map_err(|e| {
                Error::Workspace(format!("Failed to create backup of {:?}: {}", dest, e))
            })?;

            if let Err(e) = std::fs::rename(&self.output_path, dest) {
                let _ = std::fs::rename(&backup, dest);
                return Err(Error::Workspace(format!(
                    "Failed to move output to destination: {}",
                    e
                )));
            }

            let _ = std::fs::remove_file(&backup);
        } else {
            std::fs::rename(&self.output_path, dest).map_err(|e| {
                Error::Workspace(format!("Failed to move output to destination: {}", e))
            })?;
        }

        Ok(dest.to_path_buf())
    }

    /// Move the final output to `destination`, which must not exist yet.
    ///
    /// The check and the move are a single hard link, so two workspaces
    /// racing for the same destination cannot both win.
    pub fn finalize_new(self, destination: &Path) -> Result<PathBuf> {
        if !self.output_path.exists() {
            return Err(Error::Workspace(format!(
                "Output file does not exist: {:?}",
                self.output_path
            )));
        }

        match std::fs::hard_link(&self.output_path, destination) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(Error::destination_exists(destination));
            }
            // Filesystems without hard links
            Err(_) => {
                if destination.exists() {
                    return Err(Error::destination_exists(destination));
                }
                std::fs::rename(&self.output_path, destination).map_err(|e| {
                    Error::Workspace(format!("Failed to move output to destination: {}", e))
                })?;
            }
        }

        Ok(destination.to_path_buf())
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(OsString::new);
    name.push(".bak");
    path.with_file_name(name)
}
