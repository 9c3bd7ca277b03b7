//! Comparator behavior against schedule files on disk, exercising the
//! JSON/CSV auto-detection and the ALU-slot-swap tolerance end to end.

use vliw470_core::compare::compare_files;
use vliw470_core::emit::{csv::to_csv, json::to_json, render_pipeline, render_simple};

use crate::common::schedule_source;

#[test]
fn identical_schedules_round_tripped_through_json_and_csv_compare_clean() {
    let dir = std::env::temp_dir().join(format!("vliw470-cmp-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let s = schedule_source("mov x1, 1\naddi x2, x1, 5\nst x2, 0(x1)");
    let simple_rows = render_simple(&s.simple);
    let pipeline_rows = render_pipeline(&s.pipeline, &s.pipeline_deps);

    let simple_path = dir.join("simple.json");
    let pipeline_path = dir.join("pipeline.csv");
    std::fs::write(&simple_path, to_json(&simple_rows).unwrap()).unwrap();
    std::fs::write(&pipeline_path, to_csv(&pipeline_rows).unwrap()).unwrap();

    let report = compare_files(&simple_path, &pipeline_path, &simple_path, &pipeline_path).unwrap();
    assert!(report.is_match());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn a_missing_reference_file_surfaces_as_an_io_error() {
    let dir = std::env::temp_dir().join(format!("vliw470-cmp-missing-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let present = dir.join("present.json");
    std::fs::write(&present, "[]").unwrap();
    let missing = dir.join("missing.json");

    let err = compare_files(&present, &present, &missing, &present).unwrap_err();
    assert!(matches!(err, vliw470_core::SchedError::Io { .. }));

    std::fs::remove_dir_all(&dir).ok();
}
