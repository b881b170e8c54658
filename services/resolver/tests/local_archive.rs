//! End-to-end resolver runs against an on-disk archive.

use chrono::{TimeZone, Utc};
use eclipse_common::metadata::{FORECAST_FILE_NAME, METADATA_FILE_NAME};
use eclipse_common::{eclipse_datetime, ForecastMetadata};
use resolver::{
    resolve_latest_cycle, run, Archive, Cycle, LocalArchive, ResolveError, RunConfig,
};
use test_utils::fixtures::{forecast_body, ArchiveTree};

const F136: &str = "blend.t02z.core.f136.co.grib2";

fn config(output_dir: &std::path::Path) -> RunConfig {
    RunConfig {
        output_dir: output_dir.to_path_buf(),
        target_time: eclipse_datetime(),
        max_fallback: 6,
    }
}

#[tokio::test]
async fn test_latest_cycle_by_string_order() {
    let tree = ArchiveTree::new()
        .unwrap()
        .cycle("blend.20240402", "19", &[])
        .unwrap()
        .cycle("blend.20240403", "01", &[])
        .unwrap()
        .cycle("blend.20240403", "02", &[])
        .unwrap();
    let archive = LocalArchive::new(tree.root());

    let cycle = resolve_latest_cycle(&archive).await.unwrap();
    assert_eq!(
        cycle,
        Cycle {
            run_date: "blend.20240403".to_string(),
            hour: "02".to_string(),
        }
    );
}

#[tokio::test]
async fn test_empty_root_is_archive_empty() {
    let tree = ArchiveTree::new().unwrap();
    let archive = LocalArchive::new(tree.root());

    let err = resolve_latest_cycle(&archive).await.unwrap_err();
    assert!(matches!(err, ResolveError::ArchiveEmpty { .. }));
}

#[tokio::test]
async fn test_run_date_without_cycles_is_archive_empty() {
    let tree = ArchiveTree::new()
        .unwrap()
        .cycle("blend.20240402", "19", &[F136])
        .unwrap()
        .run_date("blend.20240403")
        .unwrap();
    let archive = LocalArchive::new(tree.root());

    match resolve_latest_cycle(&archive).await {
        Err(ResolveError::ArchiveEmpty { path }) => assert_eq!(path, "blend.20240403"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_run_downloads_and_writes_metadata() {
    let tree = ArchiveTree::new()
        .unwrap()
        .cycle(
            "blend.20240403",
            "02",
            &[F136, "blend.t02z.core.f137.co.grib2"],
        )
        .unwrap();
    let archive = LocalArchive::new(tree.root());
    let out = tempfile::tempdir().unwrap();
    let output_dir = out.path().join("forecast");

    let summary = run(&archive, &config(&output_dir)).await.unwrap();

    let expected = ForecastMetadata {
        latest_cycle: "blend.20240403/02".to_string(),
        cycle_dt: "2024-04-03T02:00:00Z".to_string(),
        estimated_forecast_hour: 136,
        actual_forecast_hour: 136,
        forecast_name: F136.to_string(),
    };
    assert_eq!(summary.metadata, expected);
    assert_eq!(summary.bytes, forecast_body(F136).len() as u64);
    assert_eq!(
        std::fs::read(output_dir.join(FORECAST_FILE_NAME)).unwrap(),
        forecast_body(F136)
    );
    assert_eq!(
        ForecastMetadata::read(&output_dir.join(METADATA_FILE_NAME)).unwrap(),
        expected
    );
}

#[tokio::test]
async fn test_missing_forecast_writes_nothing() {
    // Only an earlier lead hour exists, which no candidate names
    let tree = ArchiveTree::new()
        .unwrap()
        .cycle("blend.20240403", "02", &["blend.t02z.core.f135.co.grib2"])
        .unwrap();
    let archive = LocalArchive::new(tree.root());
    let out = tempfile::tempdir().unwrap();

    let err = run(&archive, &config(out.path())).await.unwrap_err();

    match err {
        ResolveError::NoMatchingForecast { cycle, tried } => {
            assert_eq!(cycle, "blend.20240403/02");
            assert_eq!(tried.len(), 6);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!out.path().join(METADATA_FILE_NAME).exists());
    assert!(!out.path().join(FORECAST_FILE_NAME).exists());
}

#[tokio::test]
async fn test_malformed_cycle_directory() {
    let tree = ArchiveTree::new()
        .unwrap()
        .cycle("blend.20240403", "2", &[F136])
        .unwrap();
    let archive = LocalArchive::new(tree.root());
    let out = tempfile::tempdir().unwrap();

    let err = run(&archive, &config(out.path())).await.unwrap_err();
    assert!(matches!(err, ResolveError::MalformedIdentifier { .. }));
}

#[tokio::test]
async fn test_other_target_time() {
    let tree = ArchiveTree::new()
        .unwrap()
        .cycle("blend.20240408", "12", &["blend.t12z.core.f006.co.grib2"])
        .unwrap();
    let archive = LocalArchive::new(tree.root());
    let out = tempfile::tempdir().unwrap();
    let config = RunConfig {
        target_time: Utc.with_ymd_and_hms(2024, 4, 8, 18, 45, 0).unwrap(),
        ..config(out.path())
    };

    let summary = run(&archive, &config).await.unwrap();
    assert_eq!(summary.metadata.estimated_forecast_hour, 6);
    assert_eq!(summary.metadata.forecast_name, "blend.t12z.core.f006.co.grib2");
    assert!(archive.location().starts_with(tree.root().to_str().unwrap()));
}
