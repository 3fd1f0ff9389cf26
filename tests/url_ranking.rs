// Candidate testing in bounded batches.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{test_config, FakeSession, FakeSite};
use smart_screenshot::discovery::UrlTester;
use smart_screenshot::models::UrlSource;
use smart_screenshot::Config;

fn candidates(count: usize) -> Vec<(String, UrlSource)> {
    (0..count)
        .map(|i| (format!("https://site{i}.example.com"), UrlSource::DomainPattern))
        .collect()
}

fn slow_session() -> FakeSession {
    FakeSession::new()
        .with_site("https://site0.example.com", FakeSite::healthy("Zero"))
        .with_site("https://site4.example.com", FakeSite::healthy("Four"))
        .with_navigation_delay(Duration::from_millis(20))
}

#[tokio::test]
async fn test_default_batch_keeps_three_tabs_open_at_most() {
    let dir = tempfile::tempdir().unwrap();
    let session = slow_session();
    let config = Arc::new(test_config(dir.path(), None));
    let tester = UrlTester::new(Arc::new(session.clone()), config);

    let ranked = tester.test_all(candidates(7)).await;

    assert_eq!(ranked.len(), 7);
    assert_eq!(session.peak_open_pages(), 3);
    let (opened, closed) = session.page_counts();
    assert_eq!((opened, closed), (7, 7));
    // the two reachable sites rank first, in generation order
    assert_eq!(ranked[0].url, "https://site0.example.com");
    assert_eq!(ranked[1].url, "https://site4.example.com");
}

#[tokio::test]
async fn test_configured_batch_size_bounds_concurrency() {
    let dir = tempfile::tempdir().unwrap();
    let session = slow_session();
    let config = Arc::new(Config {
        batch_size: 2,
        ..test_config(dir.path(), None)
    });
    let tester = UrlTester::new(Arc::new(session.clone()), config);

    let ranked = tester.test_all(candidates(5)).await;

    assert_eq!(ranked.len(), 5);
    assert_eq!(session.peak_open_pages(), 2);
}
