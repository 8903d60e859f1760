//! Conversion pipeline integration tests
//!
//! Runs the processor end to end against stand-in ffprobe/ffmpeg scripts, so
//! the probe -> evaluate -> transcode -> finalize flow is exercised without a
//! real ffmpeg install.

#![cfg(unix)]

use assert_matches::assert_matches;
use mediacompat::compat::{CompatPolicy, StreamType};
use mediacompat::probe::Tools;
use mediacompat::processor::{summarize, FileOutcome, ProcessOptions, Processor, SkipReason};
use mediacompat::scanner::{collect_files, FileClassifier};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// ffprobe output for HEVC video with AAC audio.
const HEVC_AAC_JSON: &str = r#"{
  "streams": [
    {"index": 0, "codec_name": "hevc", "codec_type": "video", "width": 1920, "height": 1080},
    {"index": 1, "codec_name": "aac", "codec_type": "audio", "channels": 2}
  ],
  "format": {"format_name": "mov,mp4,m4a,3gp,3g2,mj2", "duration": "60.0", "size": "4"}
}"#;

struct FakeTools {
    dir: TempDir,
    tools: Tools,
}

impl FakeTools {
    /// `ffprobe` prints [`HEVC_AAC_JSON`] for any file not named `broken*`.
    /// `ffmpeg` logs its arguments and writes `converted:` followed by its
    /// input to its output, unless `fail` is set.
    fn new(fail: bool) -> Self {
        let dir = tempdir().unwrap();
        let log = dir.path().join("ffmpeg.log");

        let ffprobe = dir.path().join("ffprobe");
        write_script(
            &ffprobe,
            &format!(
                r#"#!/bin/sh
for last in "$@"; do :; done
case "$(basename "$last")" in
  broken*) echo "Invalid data found when processing input" >&2; exit 1 ;;
esac
cat <<'JSON'
{}
JSON
"#,
                HEVC_AAC_JSON
            ),
        );

        let ffmpeg = dir.path().join("ffmpeg");
        let body = if fail {
            "echo \"Unknown encoder\" >&2\nexit 1\n".to_string()
        } else {
            "{ printf 'converted:'; cat \"$in\"; } > \"$out\"\n".to_string()
        };
        write_script(
            &ffmpeg,
            &format!(
                r#"#!/bin/sh
echo "$*" >> "{}"
in=""
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -i) in="$2"; shift 2 ;;
    *) out="$1"; shift ;;
  esac
done
{}"#,
                log.display(),
                body
            ),
        );

        Self {
            tools: Tools { ffmpeg, ffprobe },
            dir,
        }
    }

    fn ffmpeg_log(&self) -> Option<String> {
        fs::read_to_string(self.dir.path().join("ffmpeg.log")).ok()
    }

    fn processor(&self, options: ProcessOptions) -> Processor {
        Processor::new(
            CompatPolicy::default(),
            FileClassifier::default(),
            self.tools.clone(),
            options,
        )
    }
}

fn write_script(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

fn library() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let movie = dir.path().join("movie.mp4");
    fs::write(&movie, b"fake").unwrap();
    (dir, movie)
}

fn dir_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn converts_next_to_the_original() {
    let fake = FakeTools::new(false);
    let (dir, movie) = library();

    let report = fake.processor(ProcessOptions::default()).process_file(&movie);

    let expected = dir.path().join("movie.new.mkv");
    assert_matches!(
        &report.outcome,
        FileOutcome::Converted { plan, output, dry_run: false } => {
            assert_eq!(output, &expected);
            assert!(plan.converts(StreamType::Video));
            assert!(!plan.converts(StreamType::Audio));
        }
    );

    assert_eq!(fs::read(&expected).unwrap(), b"converted:fake");
    assert_eq!(fs::read(&movie).unwrap(), b"fake");
    assert_eq!(dir_names(dir.path()), vec!["movie.mp4", "movie.new.mkv"]);

    let log = fake.ffmpeg_log().unwrap();
    assert!(log.contains("-c:v h264"), "{}", log);
    assert!(log.contains("-c:a copy"), "{}", log);
    assert!(log.contains("-f matroska"), "{}", log);
}

#[test]
fn replace_keeps_the_original_name() {
    let fake = FakeTools::new(false);
    let (dir, movie) = library();

    let options = ProcessOptions {
        replace: true,
        ..ProcessOptions::default()
    };
    let report = fake.processor(options).process_file(&movie);

    assert_matches!(
        &report.outcome,
        FileOutcome::Converted { output, .. } if output == &movie
    );
    assert_eq!(dir_names(dir.path()), vec!["movie.mp4"]);
    assert_eq!(fs::read(&movie).unwrap(), b"converted:fake");
}

#[test]
fn dry_run_writes_nothing() {
    let fake = FakeTools::new(false);
    let (dir, movie) = library();

    let options = ProcessOptions {
        dry_run: true,
        ..ProcessOptions::default()
    };
    let report = fake.processor(options).process_file(&movie);

    assert_matches!(report.outcome, FileOutcome::Converted { dry_run: true, .. });
    assert!(fake.ffmpeg_log().is_none());
    assert_eq!(dir_names(dir.path()), vec!["movie.mp4"]);
    assert_eq!(summarize([&report]).converted, 1);
}

#[test]
fn failed_transcode_leaves_no_trace() {
    let fake = FakeTools::new(true);
    let (dir, movie) = library();

    let report = fake.processor(ProcessOptions::default()).process_file(&movie);

    assert_matches!(
        &report.outcome,
        FileOutcome::Failed { plan: Some(_), error } if error.contains("Unknown encoder")
    );
    assert_eq!(fs::read(&movie).unwrap(), b"fake");
    assert_eq!(dir_names(dir.path()), vec!["movie.mp4"]);
}

#[test]
fn batch_over_a_directory() {
    let fake = FakeTools::new(false);
    let (dir, _movie) = library();
    fs::write(dir.path().join("broken.mkv"), b"garbage").unwrap();
    fs::write(dir.path().join("notes.txt"), b"text").unwrap();
    fs::create_dir(dir.path().join("season")).unwrap();
    fs::write(dir.path().join("season/ep1.avi"), b"fake").unwrap();

    let files = collect_files(dir.path(), true).unwrap();
    assert_eq!(files.len(), 4);

    let reports = fake
        .processor(ProcessOptions::default())
        .run_batch(&files, 2, |_| {})
        .unwrap();

    let outcome_of = |name: &str| {
        reports
            .iter()
            .find(|r| r.path.ends_with(name))
            .map(|r| r.outcome.clone())
            .unwrap()
    };

    assert_eq!(
        outcome_of("broken.mkv"),
        FileOutcome::Skipped {
            reason: SkipReason::NotMedia
        }
    );
    assert_eq!(
        outcome_of("notes.txt"),
        FileOutcome::Skipped {
            reason: SkipReason::NotCandidate
        }
    );
    // hevc is not allowed in avi or mp4; aac is allowed in mp4 only.
    assert_matches!(outcome_of("season/ep1.avi"), FileOutcome::Converted { plan, .. } => {
        assert!(plan.converts(StreamType::Video));
        assert!(plan.converts(StreamType::Audio));
    });

    let summary = summarize(&reports);
    assert_eq!(summary.converted, 2);
    assert_eq!(summary.both, 1);
    assert_eq!(summary.video, 2);
    assert_eq!(summary.audio, 1);
    assert_eq!(summary.skipped, 2);
    assert!(dir.path().join("season/ep1.new.mkv").exists());
}

#[test]
fn inputs_sharing_a_stem_do_not_overwrite_each_other() {
    let fake = FakeTools::new(false);
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("movie.avi"), b"AVI").unwrap();
    fs::write(dir.path().join("movie.mp4"), b"MP4").unwrap();

    let files = collect_files(dir.path(), true).unwrap();
    let reports = fake
        .processor(ProcessOptions::default())
        .run_batch(&files, 2, |_| {})
        .unwrap();

    let new_file = dir.path().join("movie.new.mkv");
    let written = fs::read(&new_file).unwrap();
    let (winner, loser) = if written == b"converted:AVI" {
        ("movie.avi", "movie.mp4")
    } else {
        assert_eq!(written, b"converted:MP4");
        ("movie.mp4", "movie.avi")
    };

    let outcome_of = |name: &str| {
        reports
            .iter()
            .find(|r| r.path.ends_with(name))
            .map(|r| r.outcome.clone())
            .unwrap()
    };
    assert_matches!(
        outcome_of(winner),
        FileOutcome::Converted { output, .. } if output == new_file
    );
    assert_matches!(
        outcome_of(loser),
        FileOutcome::Failed { plan: Some(_), error } if error.contains("already exists")
    );

    let summary = summarize(&reports);
    assert_eq!(summary.converted, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        dir_names(dir.path()),
        vec!["movie.avi", "movie.mp4", "movie.new.mkv"]
    );
}

#[test]
fn existing_new_file_is_left_alone() {
    let fake = FakeTools::new(false);
    let (dir, movie) = library();
    let existing = dir.path().join("movie.new.mkv");
    fs::write(&existing, b"keep me").unwrap();

    for dry_run in [true, false] {
        let options = ProcessOptions {
            dry_run,
            ..ProcessOptions::default()
        };
        let report = fake.processor(options).process_file(&movie);

        assert_matches!(report.outcome, FileOutcome::Failed { plan: Some(_), .. });
        assert!(report.lines().iter().all(|l| !l.contains("Done!")));
    }

    assert!(fake.ffmpeg_log().is_none());
    assert_eq!(fs::read(&existing).unwrap(), b"keep me");
    assert_eq!(fs::read(&movie).unwrap(), b"fake");
}
