// Capture engine retries and cleanup.

mod helpers;

use std::sync::Arc;
use std::time::{Duration, Instant};

use helpers::{test_config, FakeSession, FakeSite};
use smart_screenshot::browser::ClipRegion;
use smart_screenshot::capture::{CaptureEngine, CaptureOptions};
use smart_screenshot::error_handling::{ErrorType, PipelineStats};
use smart_screenshot::Config;

fn engine(session: &FakeSession, dir: &std::path::Path) -> (CaptureEngine, CaptureOptions, Arc<PipelineStats>) {
    engine_with(session, test_config(dir, None))
}

fn engine_with(session: &FakeSession, config: Config) -> (CaptureEngine, CaptureOptions, Arc<PipelineStats>) {
    let config = Arc::new(config);
    let stats = Arc::new(PipelineStats::new());
    let options = CaptureOptions::from_config(&config);
    let engine = CaptureEngine::new(Arc::new(session.clone()), config, Arc::clone(&stats));
    (engine, options, stats)
}

#[tokio::test]
async fn test_non_ok_status_is_retried_then_reported() {
    let dir = tempfile::tempdir().unwrap();
    let url = "https://down.example.com";
    let site = FakeSite {
        status: Some(503),
        ..FakeSite::healthy("Down")
    };
    let session = FakeSession::new().with_site(url, site);
    let (engine, options, stats) = engine(&session, dir.path());

    let result = engine.capture(url, "Down", &options).await;

    assert!(!result.success);
    assert_eq!(result.attempts, 3);
    assert!(result.error.unwrap().contains("503"));
    assert!(result.image_path.is_none());
    assert_eq!(result.metadata.source_url, url);
    assert_eq!(stats.get_error_count(ErrorType::NonOkStatus), 3);
    assert!(session.screenshots_taken().is_empty());

    let (opened, closed) = session.page_counts();
    assert_eq!(opened, 3);
    assert_eq!(closed, 3);
}

#[tokio::test]
async fn test_retry_count_zero_means_single_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let url = "https://flaky.example.com";
    let session =
        FakeSession::new().with_site(url, FakeSite::healthy("Flaky").failing_screenshots(1));
    let (engine, options, _) = engine(&session, dir.path());

    let result = engine
        .capture(url, "Flaky", &options.with_retry_count(0))
        .await;

    assert!(!result.success);
    assert_eq!(result.attempts, 1);
}

#[tokio::test]
async fn test_successful_capture_writes_jpeg_and_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let url = "https://gallery.example.com";
    let session = FakeSession::new().with_site(url, FakeSite::healthy("Gallery"));
    let (engine, options, _) = engine(&session, dir.path());

    let result = engine.capture(url, "Photo Gallery", &options).await;

    assert!(result.success);
    assert_eq!(result.attempts, 1);
    let image = result.image_path.unwrap();
    assert!(image.starts_with("/screenshots/photo-gallery-"), "{image}");
    let filename = image.rsplit('/').next().unwrap();
    let bytes = std::fs::read(dir.path().join("public/screenshots").join(filename)).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

    assert!(result.metadata.has_content);
    assert!(!result.metadata.has_hero);
    assert!(result.metadata.width > 0 && result.metadata.height > 0);
}

#[tokio::test]
async fn test_readiness_race_ends_when_one_check_holds() {
    let dir = tempfile::tempdir().unwrap();
    let url = "https://slow.example.com";
    let session = FakeSession::new().with_site(
        url,
        FakeSite::healthy("Slow").ready_only_on("img.complete"),
    );
    let config = Config {
        readiness_timeout_ms: 2_000,
        ..test_config(dir.path(), None)
    };
    let (engine, options, _) = engine_with(&session, config);

    let start = Instant::now();
    let result = engine.capture(url, "Slow", &options).await;

    assert!(result.success);
    assert!(start.elapsed() < Duration::from_millis(1_500));
    // checks that never hold were polled too
    assert!(session.readiness_polls() >= 2);
}

#[tokio::test]
async fn test_capture_proceeds_when_no_readiness_check_holds() {
    let dir = tempfile::tempdir().unwrap();
    let url = "https://spinner.example.com";
    let session = FakeSession::new().with_site(
        url,
        FakeSite::healthy("Spinner").ready_only_on("never-matches"),
    );
    let config = Config {
        readiness_timeout_ms: 300,
        ..test_config(dir.path(), None)
    };
    let (engine, options, _) = engine_with(&session, config);

    let start = Instant::now();
    let result = engine.capture(url, "Spinner", &options).await;

    assert!(result.success);
    assert_eq!(result.attempts, 1);
    assert!(start.elapsed() >= Duration::from_millis(300));
    assert!(session.readiness_polls() >= 4);
}

#[tokio::test]
async fn test_small_hero_is_grown_to_minimum_clip() {
    let dir = tempfile::tempdir().unwrap();
    let url = "https://landing.example.com";
    let session = FakeSession::new().with_site(
        url,
        FakeSite::healthy("Landing").with_hero(100.0, 640.0, 600.0, 300.0),
    );
    let (engine, options, _) = engine(&session, dir.path());

    let result = engine.capture(url, "Landing", &options).await;

    assert!(result.success);
    assert!(result.metadata.has_hero);
    assert_eq!((result.metadata.width, result.metadata.height), (800, 500));

    let requests = session.screenshot_requests();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].full_page);
    assert_eq!(
        requests[0].clip,
        Some(ClipRegion {
            x: 100.0,
            y: 640.0,
            width: 800.0,
            height: 500.0,
        })
    );
}
