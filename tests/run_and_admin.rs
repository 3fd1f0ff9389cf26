// Store-backed runs and the admin trigger.

mod helpers;

use std::net::SocketAddr;

use serde_json::{json, Value};

use helpers::{test_config, test_resources, FakeSession, FakeSite};
use smart_screenshot::admin_server::{router, AdminState};
use smart_screenshot::storage::{InMemoryProjectStore, ProjectRecord};
use smart_screenshot::{run_screenshots, RunResources, Selection, Strategy};

const SHOP: &str = "https://shop.example.com";
const TOKEN: &str = "test-admin-token";

fn records() -> Vec<ProjectRecord> {
    vec![
        ProjectRecord {
            url: Some(SHOP.to_string()),
            technologies: vec!["Next.js".to_string()],
            ..ProjectRecord::new("p1", "Shop")
        },
        ProjectRecord {
            image_url: Some("/screenshots/blog-1700000000000.jpg".to_string()),
            ..ProjectRecord::new("p2", "Blog")
        },
    ]
}

fn resources(dir: &std::path::Path, session: &FakeSession) -> RunResources {
    test_resources(
        test_config(dir, None),
        session.clone(),
        InMemoryProjectStore::with_records(records()),
    )
}

#[tokio::test]
async fn test_run_skips_imaged_projects_and_writes_back() {
    let dir = tempfile::tempdir().unwrap();
    let session = FakeSession::new().with_site(SHOP, FakeSite::healthy("Shop"));
    let resources = resources(dir.path(), &session);

    let report = run_screenshots(&resources, &Selection::All, false)
        .await
        .unwrap();

    assert_eq!(report.skipped, vec!["p2".to_string()]);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results["p1"].strategy, Some(Strategy::Capture));
    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.skipped, 1);
    assert_eq!(session.session_closes(), 1);

    let stored = resources.store.find("p1").await.unwrap().unwrap();
    assert_eq!(stored.screenshot_strategy.as_deref(), Some("capture"));
    assert_eq!(stored.image_url, report.results["p1"].image_path);
    assert_eq!(stored.url.as_deref(), Some(SHOP));
    assert!(stored.last_screenshot_at.is_some());
    let metadata = stored.screenshot_metadata.unwrap();
    assert_eq!(metadata["success"], json!(true));
    assert_eq!(metadata["details"]["totalAttempts"], json!(1));

    let untouched = resources.store.find("p2").await.unwrap().unwrap();
    assert!(untouched.screenshot_strategy.is_none());
}

#[tokio::test]
async fn test_force_reprocesses_imaged_projects() {
    let dir = tempfile::tempdir().unwrap();
    let session = FakeSession::new().with_site(SHOP, FakeSite::healthy("Shop"));
    let resources = resources(dir.path(), &session);

    let report = run_screenshots(&resources, &Selection::All, true)
        .await
        .unwrap();

    assert!(report.skipped.is_empty());
    assert_eq!(report.results.len(), 2);
    // Blog has no reachable URL; the fallback result replaces its image
    assert_eq!(
        report.results["p2"].strategy,
        Some(Strategy::FallbackPlaceholder)
    );
    let stored = resources.store.find("p2").await.unwrap().unwrap();
    assert_eq!(stored.image_url, report.results["p2"].image_path);
    assert!(stored.url.is_none());
}

#[tokio::test]
async fn test_unknown_ids_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let session = FakeSession::new().with_site(SHOP, FakeSite::healthy("Shop"));
    let resources = resources(dir.path(), &session);
    let selection = Selection::Ids(vec!["p1".to_string(), "missing".to_string()]);

    let report = run_screenshots(&resources, &selection, false).await.unwrap();

    assert_eq!(report.not_found, vec!["missing".to_string()]);
    assert!(report.results.contains_key("p1"));
}

#[tokio::test]
async fn test_pending_selection_ignores_imaged_projects() {
    let dir = tempfile::tempdir().unwrap();
    let session = FakeSession::new().with_site(SHOP, FakeSite::healthy("Shop"));
    let resources = resources(dir.path(), &session);

    let report = run_screenshots(&resources, &Selection::AllPending, false)
        .await
        .unwrap();

    assert!(report.skipped.is_empty());
    assert_eq!(report.results.len(), 1);
    assert!(report.results.contains_key("p1"));
}

#[tokio::test]
async fn test_failure_counts_start_fresh_each_run() {
    let dir = tempfile::tempdir().unwrap();
    let session = FakeSession::new().with_site(
        SHOP,
        FakeSite::login_redirect("https://shop.example.com/login"),
    );
    let resources = resources(dir.path(), &session);
    let selection = Selection::Ids(vec!["p1".to_string()]);

    let first = run_screenshots(&resources, &selection, true).await.unwrap();
    let second = run_screenshots(&resources, &selection, true).await.unwrap();

    assert_eq!(first.failure_counts.get("Login page"), Some(&1));
    assert_eq!(second.failure_counts.get("Login page"), Some(&1));
    assert_eq!(first.failure_counts, second.failure_counts);
}

async fn serve(resources: RunResources) -> SocketAddr {
    serve_with_token(resources, TOKEN).await
}

async fn serve_with_token(resources: RunResources, token: &str) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(AdminState::new(resources, token));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_health_endpoint_needs_no_token() {
    let dir = tempfile::tempdir().unwrap();
    let addr = serve(resources(dir.path(), &FakeSession::new())).await;

    let response = reqwest::get(format!("http://{addr}/health")).await.unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_trigger_rejects_missing_and_wrong_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let session = FakeSession::new().with_site(SHOP, FakeSite::healthy("Shop"));
    let addr = serve(resources(dir.path(), &session)).await;
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/admin/screenshots");

    let missing = client
        .post(&url)
        .json(&json!({ "projectId": "p1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 401);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Unauthorized" }));

    let wrong = client
        .post(&url)
        .bearer_auth("not-the-token")
        .json(&json!({ "projectId": "p1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), 401);

    assert!(session.capture_navigations().is_empty());
}

#[tokio::test]
async fn test_trigger_runs_selected_project() {
    let dir = tempfile::tempdir().unwrap();
    let session = FakeSession::new().with_site(SHOP, FakeSite::healthy("Shop"));
    let addr = serve(resources(dir.path(), &session)).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/admin/screenshots"))
        .bearer_auth(TOKEN)
        .json(&json!({ "projectId": "p1" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["results"][0]["projectId"], "p1");
    assert_eq!(body["results"][0]["success"], true);
    assert_eq!(body["results"][0]["strategy"], "capture");
    assert!(body["results"][0]["imageUrl"]
        .as_str()
        .unwrap()
        .starts_with("/screenshots/shop-"));
    assert_eq!(body["notFound"], json!([]));
    assert_eq!(session.capture_navigations(), vec![SHOP.to_string()]);
}

#[tokio::test]
async fn test_configured_token_with_trailing_newline_still_authenticates() {
    let dir = tempfile::tempdir().unwrap();
    let session = FakeSession::new().with_site(SHOP, FakeSite::healthy("Shop"));
    let addr = serve_with_token(resources(dir.path(), &session), "test-admin-token \n").await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/admin/screenshots"))
        .bearer_auth(TOKEN)
        .json(&json!({ "projectId": "p1" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_trigger_rejects_bad_bodies() {
    let dir = tempfile::tempdir().unwrap();
    let addr = serve(resources(dir.path(), &FakeSession::new())).await;
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/admin/screenshots");

    let empty = client
        .post(&url)
        .bearer_auth(TOKEN)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status(), 400);
    let body: Value = empty.json().await.unwrap();
    assert_eq!(body["error"], "No projects selected");

    let garbage = client
        .post(&url)
        .bearer_auth(TOKEN)
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(garbage.status(), 400);
}
