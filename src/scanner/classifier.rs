//! Extension gate for candidate media files.
//!
//! Only files whose extension is on the allow-list are handed to ffprobe.
//! Everything else is skipped without being opened.

use std::collections::BTreeSet;
use std::path::Path;

/// Decides which files are worth probing.
#[derive(Debug, Clone)]
pub struct FileClassifier {
    extensions: BTreeSet<String>,
}

impl FileClassifier {
    /// Create a classifier for the given extensions (case-insensitive, with or
    /// without a leading dot).
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        Self { extensions }
    }

    /// Check if a path is a candidate media file.
    pub fn is_candidate(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

impl Default for FileClassifier {
    fn default() -> Self {
        Self::new(crate::config::ScanConfig::default().extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_accepts_table_containers() {
        let classifier = FileClassifier::default();
        for name in ["a.mkv", "a.mp4", "a.avi", "a.wmv", "a.3gp", "a.mpegts", "a.webm"] {
            assert!(classifier.is_candidate(Path::new(name)), "{}", name);
        }
    }

    #[test]
    fn test_case_insensitive() {
        let classifier = FileClassifier::new(["mkv"]);
        assert!(classifier.is_candidate(Path::new("/media/Movie.MKV")));
        assert!(classifier.is_candidate(Path::new("movie.Mkv")));
    }

    #[test]
    fn test_rejects_other_files() {
        let classifier = FileClassifier::default();
        assert!(!classifier.is_candidate(Path::new("notes.txt")));
        assert!(!classifier.is_candidate(Path::new("poster.jpg")));
        assert!(!classifier.is_candidate(Path::new("Makefile")));
        assert!(!classifier.is_candidate(Path::new(".mkv")));
    }

    #[test]
    fn test_normalizes_configured_extensions() {
        let classifier = FileClassifier::new([".MOV", " ", "ogv"]);
        let exts: Vec<&str> = classifier.extensions().collect();
        assert_eq!(exts, vec!["mov", "ogv"]);
    }
}
