mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use common::{file_names, write_media, FakeBackend};
use lsum_models::{ClassBudgetSpec, ClassShare, RecordingId, SummaryTarget};
use lsum_worker::workspace::segment_path;
use lsum_worker::{Pipeline, PipelineConfig, PipelineError, SummaryRequest};

const CLASSIFIED: &str = "\
FILE;SEG;CLASS_1;DURATION;MEAN_ENERGY
lecture_1;part_0;boring;;0.1
lecture_1;part_1;boring;;0.1
lecture_1;part_2;boring;;0.2
lecture_1;part_3;boring;;0.1
lecture_2;part_0;neutral;;0.4
lecture_1;part_4;boring;;0.3
lecture_2;part_1;neutral;;0.5
lecture_2;part_2;neutral;;0.2
lecture_1;part_5;boring;;0.1
lecture_2;part_3;neutral;;0.3
";

struct Fixture {
    _dir: TempDir,
    config: PipelineConfig,
    table: PathBuf,
    out_dir: PathBuf,
}

impl Fixture {
    /// Six 10 s boring segments and four 20 s neutral ones, durations not yet filled.
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::with_data_dir(dir.path());

        for i in 0..6 {
            write_media(&segment(&config, "lecture_1", i), 10.0);
        }
        for i in 0..4 {
            write_media(&segment(&config, "lecture_2", i), 20.0);
        }

        let table = dir.path().join("classified.csv");
        std::fs::write(&table, CLASSIFIED).unwrap();
        let out_dir = dir.path().join("out");

        Self {
            _dir: dir,
            config,
            table,
            out_dir,
        }
    }

    fn pipeline(&self, backend: FakeBackend) -> Pipeline {
        Pipeline::new(self.config.clone(), Arc::new(backend))
    }

    fn request(&self, budget: ClassBudgetSpec) -> SummaryRequest {
        SummaryRequest {
            table: self.table.clone(),
            budget,
            output: self.out_dir.join("summary.mp4"),
            manifest: self.out_dir.join("summary.csv"),
        }
    }
}

fn segment(config: &PipelineConfig, recording: &str, index: usize) -> PathBuf {
    segment_path(
        &config.segments_dir,
        &RecordingId::from(recording),
        &format!("part_{}", index),
    )
}

fn lecture_budget() -> ClassBudgetSpec {
    ClassBudgetSpec::new(
        vec![
            ClassShare::new("boring", 0.3),
            ClassShare::new("interesting", 0.4),
            ClassShare::new("neutral", 0.3),
        ],
        SummaryTarget::Duration(100.0),
    )
}

async fn enrich_in_place(pipeline: &Pipeline, table: &Path) {
    let report = pipeline.run_enrich(table, table).await.unwrap();
    assert_eq!(report.filled, 10);
}

#[tokio::test]
async fn enrich_fills_missing_durations() {
    let fixture = Fixture::new();
    std::fs::write(
        &fixture.table,
        "FILE;SEG;CLASS_1;DURATION\n\
         lecture_1;part_0;boring;\n\
         lecture_1;part_1;boring;9.5\n\
         lecture_9;part_0;boring;\n",
    )
    .unwrap();
    let output = fixture.out_dir.join("enriched.csv");

    let report = fixture
        .pipeline(FakeBackend::new())
        .run_enrich(&fixture.table, &output)
        .await
        .unwrap();

    assert_eq!(report.filled, 1);
    assert_eq!(report.kept, 1);
    assert_eq!(
        report.failed,
        vec![(RecordingId::from("lecture_9"), "part_0".to_string())]
    );
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "FILE;SEG;CLASS_1;DURATION\n\
         lecture_1;part_0;boring;10\n\
         lecture_1;part_1;boring;9.5\n\
         lecture_9;part_0;boring;\n"
    );
}

#[tokio::test]
async fn enrich_adds_missing_duration_column() {
    let fixture = Fixture::new();
    std::fs::write(&fixture.table, "FILE;SEG;CLASS_1\nlecture_2;part_3;neutral\n").unwrap();

    fixture
        .pipeline(FakeBackend::new())
        .run_enrich(&fixture.table, &fixture.table)
        .await
        .unwrap();

    assert_eq!(
        std::fs::read_to_string(&fixture.table).unwrap(),
        "FILE;SEG;CLASS_1;DURATION\nlecture_2;part_3;neutral;20\n"
    );
}

#[tokio::test]
async fn summary_respects_class_budget() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(FakeBackend::new());
    enrich_in_place(&pipeline, &fixture.table).await;

    let request = fixture.request(lecture_budget());
    let outcome = pipeline.run_summary(&request).await.unwrap();

    assert_eq!(outcome.selection.len(), 5);
    assert_eq!(outcome.duration, 70.0);
    assert_eq!(
        std::fs::read_to_string(&request.manifest).unwrap(),
        "FILE;SEG;CLASS;DURATION;TIMELINE\n\
         lecture_1;part_0;boring;10;0\n\
         lecture_1;part_1;boring;10;10\n\
         lecture_1;part_2;boring;10;20\n\
         lecture_2;part_0;neutral;20;30\n\
         lecture_2;part_1;neutral;20;50\n"
    );
}

#[tokio::test]
async fn repeated_summary_is_stable_and_leaves_no_temp_files() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(FakeBackend::new());
    enrich_in_place(&pipeline, &fixture.table).await;
    let request = fixture.request(lecture_budget());

    let first = pipeline.run_summary(&request).await.unwrap();
    let second = pipeline.run_summary(&request).await.unwrap();

    assert_eq!(first.duration, second.duration);
    assert_eq!(first.timeline, second.timeline);
    assert_eq!(file_names(&fixture.out_dir), vec!["summary.csv", "summary.mp4"]);
}

#[tokio::test]
async fn count_share_target_uses_class_counts() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(FakeBackend::new());
    enrich_in_place(&pipeline, &fixture.table).await;

    let mut budget = lecture_budget();
    budget.target_duration = SummaryTarget::ShareOfCount;
    let outcome = pipeline.run_summary(&fixture.request(budget)).await.unwrap();

    // floor(0.3 * 6) boring + floor(0.3 * 4) neutral
    assert_eq!(outcome.selection.len(), 2);
    assert_eq!(outcome.duration, 30.0);
}

#[tokio::test]
async fn missing_segment_file_fails_assembly() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(FakeBackend::new());
    enrich_in_place(&pipeline, &fixture.table).await;
    std::fs::remove_file(segment(&fixture.config, "lecture_2", 1)).unwrap();

    let request = fixture.request(lecture_budget());
    let err = pipeline.run_summary(&request).await.unwrap_err();

    assert!(err.is_assembly_failure());
    match err {
        PipelineError::MissingSegment {
            recording, segment, ..
        } => {
            assert_eq!(recording.as_str(), "lecture_2");
            assert_eq!(segment, "part_1");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(!request.output.exists());
    assert!(!request.manifest.exists());
}

#[tokio::test]
async fn failed_concat_leaves_no_partial_output() {
    let fixture = Fixture::new();
    enrich_in_place(&fixture.pipeline(FakeBackend::new()), &fixture.table).await;

    let pipeline = fixture.pipeline(FakeBackend::failing_concat());
    let request = fixture.request(lecture_budget());
    let err = pipeline.run_summary(&request).await.unwrap_err();

    assert!(matches!(err, PipelineError::Assembly { .. }));
    assert!(file_names(&fixture.out_dir).is_empty());
}

#[tokio::test]
async fn previous_summary_is_removed_before_a_failed_run() {
    let fixture = Fixture::new();
    enrich_in_place(&fixture.pipeline(FakeBackend::new()), &fixture.table).await;
    let request = fixture.request(lecture_budget());
    fixture
        .pipeline(FakeBackend::new())
        .run_summary(&request)
        .await
        .unwrap();

    let err = fixture
        .pipeline(FakeBackend::failing_concat())
        .run_summary(&request)
        .await
        .unwrap_err();

    assert!(err.is_assembly_failure());
    assert!(!request.output.exists());
    assert!(!request.manifest.exists());
}

#[tokio::test]
async fn selection_without_present_labels_is_an_error() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(FakeBackend::new());
    enrich_in_place(&pipeline, &fixture.table).await;

    let budget = ClassBudgetSpec::new(
        vec![ClassShare::new("interesting", 1.0)],
        SummaryTarget::Duration(60.0),
    );
    let err = pipeline.run_summary(&fixture.request(budget)).await.unwrap_err();

    assert!(matches!(err, PipelineError::EmptySelection { .. }));
}

#[tokio::test]
async fn summary_without_durations_selects_nothing() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(FakeBackend::new());

    let err = pipeline
        .run_summary(&fixture.request(lecture_budget()))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::EmptySelection { .. }));
}
