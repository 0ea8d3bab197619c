//! End-to-end tests for the feedback API
//!
//! Each test binds the real axum server on an ephemeral port over a fresh
//! temporary database and drives it with reqwest, exercising the exact
//! JSON shapes the dashboard client consumes.

use pheme_core::{
    api::{build_router, AppState},
    types::{FeedbackRecord, FeedbackStats},
    SqliteStorage,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

/// Spawn a server over a fresh database; returns its base URL
///
/// The TempDir must be kept alive for the duration of the test.
async fn spawn_server() -> (String, TempDir) {
    let dir = TempDir::new().unwrap();

    let storage = SqliteStorage::open(dir.path().join("feedback.db")).unwrap();
    storage.init_schema().await.unwrap();

    let router = build_router(AppState::new(Arc::new(storage)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}", addr), dir)
}

async fn submit(client: &reqwest::Client, base: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{}/api/feedback", base))
        .json(&body)
        .send()
        .await
        .unwrap()
}

async fn list(client: &reqwest::Client, base: &str) -> Vec<FeedbackRecord> {
    client
        .get(format!("{}/api/feedback", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn stats(client: &reqwest::Client, base: &str) -> FeedbackStats {
    client
        .get(format!("{}/api/stats", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

fn alice() -> Value {
    json!({"name": "Alice", "email": "a@example.com", "message": "Great!", "rating": 5})
}

fn bob() -> Value {
    json!({"name": "Bob", "email": "bob@x.io", "message": "Meh", "rating": 2})
}

#[tokio::test]
async fn health_check_returns_ok() {
    let (base, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/health", base))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"status": "OK", "message": "Server is running"}));
}

#[tokio::test]
async fn valid_submission_returns_created_record() {
    let (base, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let response = submit(
        &client,
        &base,
        json!({
            "name": "  Alice  ",
            "email": " a@example.com ",
            "message": " Great! ",
            "rating": 5
        }),
    )
    .await;

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Feedback submitted successfully");

    // Stored record is trimmed and carries assigned fields
    let record: FeedbackRecord = serde_json::from_value(body["feedback"].clone()).unwrap();
    assert_eq!(record.name, "Alice");
    assert_eq!(record.email, "a@example.com");
    assert_eq!(record.message, "Great!");
    assert_eq!(record.rating, 5);
    assert!(body["feedback"]["createdAt"].is_string());
}

#[tokio::test]
async fn ids_are_unique_and_increasing() {
    let (base, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let mut last_id = None;
    for _ in 0..3 {
        let body: Value = submit(&client, &base, alice()).await.json().await.unwrap();
        let id = body["feedback"]["id"].as_i64().unwrap();
        if let Some(prev) = last_id {
            assert!(id > prev, "id {} should exceed {}", id, prev);
        }
        last_id = Some(id);
    }
}

#[tokio::test]
async fn missing_fields_are_rejected_and_not_persisted() {
    let (base, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let payloads = [
        json!({"email": "a@example.com", "message": "hi", "rating": 5}),
        json!({"name": "Alice", "message": "hi", "rating": 5}),
        json!({"name": "Alice", "email": "a@example.com", "rating": 5}),
        json!({"name": "Alice", "email": "a@example.com", "message": "hi"}),
        json!({"name": "   ", "email": "a@example.com", "message": "hi", "rating": 5}),
        json!({}),
    ];

    for payload in payloads {
        let response = submit(&client, &base, payload.clone()).await;
        assert_eq!(response.status(), 400, "payload should be rejected: {payload}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "All fields are required");
    }

    assert!(list(&client, &base).await.is_empty());
    assert_eq!(stats(&client, &base).await.total, 0);
}

#[tokio::test]
async fn malformed_email_is_rejected_and_not_persisted() {
    let (base, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    for email in ["plainaddress", "missing@tld", "two words@example.com"] {
        let mut payload = alice();
        payload["email"] = json!(email);

        let response = submit(&client, &base, payload).await;
        assert_eq!(response.status(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Invalid email format");
    }

    assert!(list(&client, &base).await.is_empty());
}

#[tokio::test]
async fn bad_rating_is_rejected_and_not_persisted() {
    let (base, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    for rating in [json!(0), json!(6), json!(-1), json!("five"), json!([3])] {
        let mut payload = alice();
        payload["rating"] = rating;

        let response = submit(&client, &base, payload).await;
        assert_eq!(response.status(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Rating must be an integer between 1 and 5");
    }

    assert!(list(&client, &base).await.is_empty());
}

#[tokio::test]
async fn string_rating_is_coerced() {
    let (base, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let mut payload = alice();
    payload["rating"] = json!("4");

    let response = submit(&client, &base, payload).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["feedback"]["rating"], 4);
}

#[tokio::test]
async fn list_returns_newest_first() {
    let (base, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    assert_eq!(submit(&client, &base, alice()).await.status(), 201);
    assert_eq!(submit(&client, &base, bob()).await.status(), 201);

    let records = list(&client, &base).await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Bob");
    assert_eq!(records[1].name, "Alice");
}

#[tokio::test]
async fn stats_reflect_submissions() {
    let (base, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    // Empty store reports zeroed stats
    assert_eq!(
        stats(&client, &base).await,
        FeedbackStats {
            total: 0,
            avg_rating: 0.0,
            positive: 0,
            negative: 0
        }
    );

    assert_eq!(submit(&client, &base, alice()).await.status(), 201);
    assert_eq!(submit(&client, &base, bob()).await.status(), 201);

    let stats = stats(&client, &base).await;
    assert_eq!(stats.total, 2);
    assert_eq!(stats.avg_rating, 3.5);
    assert_eq!(stats.positive, 1);
    assert_eq!(stats.negative, 1);
}

#[tokio::test]
async fn stats_wire_shape_is_camel_case() {
    let (base, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    submit(&client, &base, alice()).await;

    let body: Value = client
        .get(format!("{}/api/stats", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["avgRating"], 5.0);
    assert!(body.get("avg_rating").is_none());
}

#[tokio::test]
async fn concurrent_submissions_all_persist() {
    let (base, _dir) = spawn_server().await;

    let mut handles = Vec::new();
    for i in 0..10 {
        let base = base.clone();
        handles.push(tokio::spawn(async move {
            let client = reqwest::Client::new();
            let payload = json!({
                "name": format!("User {}", i),
                "email": format!("user{}@example.com", i),
                "message": "load test",
                "rating": (i % 5) + 1,
            });
            submit(&client, &base, payload).await.status()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), 201);
    }

    let client = reqwest::Client::new();
    let records = list(&client, &base).await;
    assert_eq!(records.len(), 10);

    // Every record is fully formed, no torn writes
    for record in &records {
        assert!(!record.name.is_empty());
        assert!((1..=5).contains(&record.rating));
    }

    assert_eq!(stats(&client, &base).await.total, 10);
}
