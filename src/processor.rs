//! Per-file conversion flow and the batch driver.
//!
//! A file goes through the classifier, ffprobe, the compatibility policy and,
//! when the policy asks for it, an ffmpeg transcode inside a [`Workspace`].
//! Failures stay with the file they happened to; a batch always runs to the
//! end.

use crate::compat::{CompatPolicy, ConversionPlan, MediaDescriptor, StreamType};
use crate::config::Config;
use crate::probe::Tools;
use crate::scanner::{FileClassifier, FileProber};
use anyhow::{Context, Result};
use mediacompat_av::Workspace;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How a batch treats the files it converts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Evaluate and report only.
    pub dry_run: bool,
    /// Move the converted file over the original path.
    pub replace: bool,
    /// Inserted before the target extension of a new file.
    pub new_suffix: String,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            replace: false,
            new_suffix: ".new".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Extension is not on the allow-list.
    NotCandidate,
    /// ffprobe could not read the file.
    NotMedia,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    Skipped { reason: SkipReason },
    Compliant,
    /// The file needed conversion. `output` is where the result went, or
    /// would have gone on a dry run.
    Converted {
        plan: ConversionPlan,
        output: PathBuf,
        dry_run: bool,
    },
    Failed {
        plan: Option<ConversionPlan>,
        error: String,
    },
}

/// One processed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

impl FileReport {
    /// Console lines describing what happened to the file.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Checking {}...", self.path.display())];

        let plan = match &self.outcome {
            FileOutcome::Skipped {
                reason: SkipReason::NotCandidate,
            } => return lines,
            FileOutcome::Skipped {
                reason: SkipReason::NotMedia,
            } => {
                lines.push("\tNot a video file, skipping...".to_string());
                return lines;
            }
            FileOutcome::Compliant => {
                lines.push("\tVideo doesn't require conversion, skipping...".to_string());
                return lines;
            }
            FileOutcome::Converted { plan, .. } => plan,
            FileOutcome::Failed { plan: None, error } => {
                lines.push(format!("\tFailed: {}", error));
                return lines;
            }
            FileOutcome::Failed {
                plan: Some(plan), ..
            } => plan,
        };

        for rejected in &plan.rejected {
            lines.push(format!("\t{} is not supported", rejected.codec_name));
        }
        lines.push(format!(
            "\t{} needs to be converted",
            type_list(plan.types_to_convert.iter().copied())
        ));

        match &self.outcome {
            FileOutcome::Converted {
                output, dry_run, ..
            } => {
                if !dry_run {
                    lines.push("\tStarting FFMPEG conversion...".to_string());
                }
                lines.push(format!("\tDone! {}", output.display()));
            }
            FileOutcome::Failed { error, .. } => {
                lines.push(format!("\tFailed: {}", error));
            }
            _ => {}
        }

        lines
    }
}

fn type_list(types: impl Iterator<Item = StreamType>) -> String {
    types.map(|t| t.to_string()).collect::<Vec<_>>().join(",")
}

/// Path of the new file for `path`: the last extension is replaced by
/// `suffix` followed by the target container.
///
/// `dir/a.b.mp4` with `.new` and `mkv` becomes `dir/a.b.new.mkv`.
pub fn output_path_for(path: &Path, suffix: &str, container: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let base = match name.rfind('.') {
        Some(pos) if pos > 0 => &name[..pos],
        _ => name.as_str(),
    };

    path.with_file_name(format!("{}{}.{}", base, suffix, container))
}

/// Running totals over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Files that needed conversion (dry runs included).
    pub converted: usize,
    /// Of those, files where both video and audio were converted.
    pub both: usize,
    /// Files where video was converted, `both` included.
    pub video: usize,
    /// Files where audio was converted, `both` included.
    pub audio: usize,
    pub compliant: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Skipped { .. } => self.skipped += 1,
            FileOutcome::Compliant => self.compliant += 1,
            FileOutcome::Failed { .. } => self.failed += 1,
            FileOutcome::Converted { plan, .. } => {
                let video = plan.converts(StreamType::Video);
                let audio = plan.converts(StreamType::Audio);
                self.converted += 1;
                self.video += usize::from(video);
                self.audio += usize::from(audio);
                self.both += usize::from(video && audio);
            }
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Converted {} files. ({} due to video+audio, {} due to video, {} due to audio)",
            self.converted, self.both, self.video, self.audio
        )
    }
}

/// Runs the per-file flow under one policy.
#[derive(Debug, Clone)]
pub struct Processor {
    policy: CompatPolicy,
    classifier: FileClassifier,
    prober: FileProber,
    tools: Tools,
    options: ProcessOptions,
}

impl Processor {
    pub fn new(
        policy: CompatPolicy,
        classifier: FileClassifier,
        tools: Tools,
        options: ProcessOptions,
    ) -> Self {
        Self {
            policy,
            classifier,
            prober: FileProber::new(tools.clone()),
            tools,
            options,
        }
    }

    /// Build a processor from a loaded config. A missing tool is reported per
    /// file when it is first needed.
    pub fn from_config(config: &Config, dry_run: bool, replace: bool) -> Self {
        let tools = Tools::resolve_lenient(
            config.tools.ffmpeg_path.as_deref(),
            config.tools.ffprobe_path.as_deref(),
        );
        debug!("Using tools: {:?}", tools);

        Self::new(
            config.policy(),
            FileClassifier::new(&config.scan.extensions),
            tools,
            ProcessOptions {
                dry_run,
                replace,
                new_suffix: config.scan.new_suffix.clone(),
            },
        )
    }

    pub fn policy(&self) -> &CompatPolicy {
        &self.policy
    }

    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    /// Process one file. Never fails; errors end up in the outcome.
    pub fn process_file(&self, path: &Path) -> FileReport {
        let outcome = self.outcome_for(path);
        FileReport {
            path: path.to_path_buf(),
            outcome,
        }
    }

    fn outcome_for(&self, path: &Path) -> FileOutcome {
        if !self.classifier.is_candidate(path) {
            debug!("Not a candidate: {:?}", path);
            return FileOutcome::Skipped {
                reason: SkipReason::NotCandidate,
            };
        }

        let info = match self.prober.probe(path) {
            Ok(info) => info,
            Err(e) if is_not_media(&e) => {
                debug!("Not a media file: {:?}: {:#}", path, e);
                return FileOutcome::Skipped {
                    reason: SkipReason::NotMedia,
                };
            }
            Err(e) => {
                warn!("Failed to probe {:?}: {:#}", path, e);
                return FileOutcome::Failed {
                    plan: None,
                    error: format!("{:#}", e),
                };
            }
        };

        let media = MediaDescriptor::from_media_info(&info);
        let plan = self.policy.evaluate(&media);

        if !plan.needs_conversion {
            debug!("Compliant: {:?} ({})", path, media.container);
            return FileOutcome::Compliant;
        }

        info!(
            "{:?} needs conversion of {}",
            path,
            type_list(plan.types_to_convert.iter().copied())
        );

        let new_path = output_path_for(
            path,
            &self.options.new_suffix,
            &self.policy.target.container,
        );
        let output = if self.options.replace {
            path.to_path_buf()
        } else {
            new_path
        };

        if !self.options.replace && output.exists() {
            warn!("Not overwriting {:?} for {:?}", output, path);
            return FileOutcome::Failed {
                plan: Some(plan),
                error: format!("destination already exists: {}", output.display()),
            };
        }

        if self.options.dry_run {
            return FileOutcome::Converted {
                plan,
                output,
                dry_run: true,
            };
        }

        match self.convert(path, &plan, &output) {
            Ok(output) => FileOutcome::Converted {
                plan,
                output,
                dry_run: false,
            },
            Err(e) => {
                warn!("Conversion failed for {:?}: {:#}", path, e);
                FileOutcome::Failed {
                    plan: Some(plan),
                    error: format!("{:#}", e),
                }
            }
        }
    }

    fn convert(&self, path: &Path, plan: &ConversionPlan, output: &Path) -> Result<PathBuf> {
        let spec = plan
            .transcode_spec()
            .context("Plan has no output container")?;

        let workspace = Workspace::new(path)
            .with_context(|| format!("Failed to create workspace for {:?}", path))?;

        mediacompat_av::actions::transcode(&self.tools.ffmpeg, &workspace, &spec)
            .with_context(|| format!("ffmpeg failed on {:?}", path))?;

        // Only --replace may overwrite an existing file.
        let finalized = if self.options.replace {
            workspace.finalize(Some(output))
        } else {
            workspace.finalize_new(output)
        };
        let dest =
            finalized.with_context(|| format!("Failed to move output to {:?}", output))?;

        info!("Converted {:?} -> {:?}", path, dest);
        Ok(dest)
    }

    /// Process `files` on `jobs` worker threads, calling `on_report` as each
    /// file finishes. Reports come back in input order.
    pub fn run_batch<F>(
        &self,
        files: &[PathBuf],
        jobs: usize,
        on_report: F,
    ) -> Result<Vec<FileReport>>
    where
        F: Fn(&FileReport) + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs.max(1))
            .thread_name(|i| format!("mediacompat-worker-{}", i))
            .build()
            .context("Failed to start worker pool")?;

        info!("Processing {} files with {} jobs", files.len(), jobs.max(1));

        let reports = pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    let report = self.process_file(path);
                    on_report(&report);
                    report
                })
                .collect()
        });

        Ok(reports)
    }
}

/// Totals for a finished batch.
pub fn summarize<'a>(reports: impl IntoIterator<Item = &'a FileReport>) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for report in reports {
        summary.record(&report.outcome);
    }
    summary
}

fn is_not_media(err: &anyhow::Error) -> bool {
    err.downcast_ref::<mediacompat_av::Error>()
        .map(|e| e.is_not_media())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::{RejectedStream, TargetEncoding};
    use assert_matches::assert_matches;
    use mediacompat_av::actions::StreamCodec;
    use std::collections::BTreeSet;

    fn plan(types: &[StreamType]) -> ConversionPlan {
        let types_to_convert: BTreeSet<StreamType> = types.iter().copied().collect();
        let target = TargetEncoding::default();
        let codec = |t: StreamType, c: &str| {
            if types_to_convert.contains(&t) {
                StreamCodec::Encode(c.to_string())
            } else {
                StreamCodec::Copy
            }
        };
        ConversionPlan {
            needs_conversion: true,
            video_codec: codec(StreamType::Video, &target.video_codec),
            audio_codec: codec(StreamType::Audio, &target.audio_codec),
            container: Some(target.container.clone()),
            rejected: types
                .iter()
                .enumerate()
                .map(|(position, t)| RejectedStream {
                    position,
                    stream_type: *t,
                    codec_name: format!("bad{}", position),
                })
                .collect(),
            types_to_convert,
        }
    }

    fn converted(types: &[StreamType]) -> FileOutcome {
        FileOutcome::Converted {
            plan: plan(types),
            output: PathBuf::from("out.new.mkv"),
            dry_run: true,
        }
    }

    fn offline_processor(options: ProcessOptions) -> Processor {
        Processor::new(
            CompatPolicy::default(),
            FileClassifier::default(),
            Tools {
                ffmpeg: "/nonexistent/ffmpeg".into(),
                ffprobe: "/nonexistent/ffprobe".into(),
            },
            options,
        )
    }

    #[test]
    fn test_output_path_replaces_last_extension() {
        assert_eq!(
            output_path_for(Path::new("dir/a.b.mp4"), ".new", "mkv"),
            PathBuf::from("dir/a.b.new.mkv")
        );
        assert_eq!(
            output_path_for(Path::new("/media/movie.avi"), ".new", "mkv"),
            PathBuf::from("/media/movie.new.mkv")
        );
    }

    #[test]
    fn test_output_path_without_extension() {
        assert_eq!(
            output_path_for(Path::new("dir/movie"), ".new", "mkv"),
            PathBuf::from("dir/movie.new.mkv")
        );
        assert_eq!(
            output_path_for(Path::new(".hidden"), "-x", "mp4"),
            PathBuf::from(".hidden-x.mp4")
        );
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = BatchSummary::default();
        summary.record(&converted(&[StreamType::Video, StreamType::Audio]));
        summary.record(&converted(&[StreamType::Video]));
        summary.record(&converted(&[StreamType::Audio]));
        summary.record(&converted(&[StreamType::Audio]));
        summary.record(&FileOutcome::Compliant);
        summary.record(&FileOutcome::Skipped {
            reason: SkipReason::NotMedia,
        });
        summary.record(&FileOutcome::Failed {
            plan: Some(plan(&[StreamType::Video])),
            error: "boom".to_string(),
        });

        assert_eq!(summary.converted, 4);
        assert_eq!(summary.both, 1);
        assert_eq!(summary.video, 2);
        assert_eq!(summary.audio, 3);
        assert_eq!(summary.compliant, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            summary.to_string(),
            "Converted 4 files. (1 due to video+audio, 2 due to video, 3 due to audio)"
        );
    }

    #[test]
    fn test_report_lines_for_conversion() {
        let report = FileReport {
            path: PathBuf::from("movie.mp4"),
            outcome: converted(&[StreamType::Video, StreamType::Audio]),
        };
        assert_eq!(
            report.lines(),
            vec![
                "Checking movie.mp4...",
                "\tbad0 is not supported",
                "\tbad1 is not supported",
                "\tvideo,audio needs to be converted",
                "\tDone! out.new.mkv",
            ]
        );
    }

    #[test]
    fn test_report_lines_for_failure_do_not_claim_ffmpeg_ran() {
        let report = FileReport {
            path: PathBuf::from("movie.avi"),
            outcome: FileOutcome::Failed {
                plan: Some(plan(&[StreamType::Video])),
                error: "destination already exists: movie.new.mkv".to_string(),
            },
        };
        assert_eq!(
            report.lines(),
            vec![
                "Checking movie.avi...",
                "\tbad0 is not supported",
                "\tvideo needs to be converted",
                "\tFailed: destination already exists: movie.new.mkv",
            ]
        );
    }

    #[test]
    fn test_report_lines_for_skips() {
        let not_candidate = FileReport {
            path: PathBuf::from("notes.txt"),
            outcome: FileOutcome::Skipped {
                reason: SkipReason::NotCandidate,
            },
        };
        assert_eq!(not_candidate.lines(), vec!["Checking notes.txt..."]);

        let compliant = FileReport {
            path: PathBuf::from("movie.mkv"),
            outcome: FileOutcome::Compliant,
        };
        assert_eq!(compliant.lines().len(), 2);
        assert!(compliant.lines()[1].contains("doesn't require conversion"));
    }

    #[test]
    fn test_non_candidate_is_skipped_without_probing() {
        let processor = offline_processor(ProcessOptions::default());
        let report = processor.process_file(Path::new("/nonexistent/notes.txt"));
        assert_eq!(
            report.outcome,
            FileOutcome::Skipped {
                reason: SkipReason::NotCandidate
            }
        );
    }

    #[test]
    fn test_probe_error_is_a_failure_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("movie.mkv");
        std::fs::write(&file, b"x").unwrap();

        let processor = offline_processor(ProcessOptions::default());
        let report = processor.process_file(&file);
        assert_matches!(report.outcome, FileOutcome::Failed { plan: None, .. });
    }

    #[test]
    fn test_batch_keeps_input_order() {
        let files: Vec<PathBuf> = (0..8).map(|i| PathBuf::from(format!("f{}.txt", i))).collect();
        let processor = offline_processor(ProcessOptions::default());
        let seen = std::sync::Mutex::new(0usize);

        let reports = processor
            .run_batch(&files, 4, |_| *seen.lock().unwrap() += 1)
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), files.len());
        let paths: Vec<&PathBuf> = reports.iter().map(|r| &r.path).collect();
        assert_eq!(paths, files.iter().collect::<Vec<_>>());
        assert_eq!(summarize(&reports).skipped, files.len());
    }
}
