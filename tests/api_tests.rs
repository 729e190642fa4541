use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use gig_recommender::api::{create_router, AppState};
use gig_recommender::services::{CatalogIndex, RecommenderEngine};

fn create_test_server(snapshot_path: &std::path::Path) -> TestServer {
    let catalog = CatalogIndex::bundled(Some("Handyman")).unwrap();
    let engine = RecommenderEngine::new(Arc::new(catalog));
    let state = AppState::new(engine, snapshot_path);
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

async fn create_john(server: &TestServer) -> Value {
    let response = server
        .post("/api/v1/user_profile")
        .json(&json!({
            "user_id": "user123",
            "name": "John Doe",
            "zip_code": "60601",
            "preferences": { "Plumbing": 0.8, "HVAC": 0.4, "Electrical": 0.6 },
            "history": [3]
        }))
        .await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn test_health_check() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(&dir.path().join("snap.json"));

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_categories() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(&dir.path().join("snap.json"));

    let categories: Vec<Value> = server.get("/api/v1/categories").await.json();
    assert_eq!(categories.len(), 6);
    assert_eq!(categories[0]["name"], "Plumbing");
    assert_eq!(categories[0]["id"], 0);
}

#[tokio::test]
async fn test_create_profile_computes_feature_vector() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(&dir.path().join("snap.json"));

    let profile = create_john(&server).await;
    assert_eq!(profile["name"], "John Doe");
    assert_eq!(profile["location"], "60601");

    let vector: Vec<f64> = serde_json::from_value(profile["feature_vector"].clone()).unwrap();
    assert_eq!(vector.len(), 6);
    let sum: f64 = vector.iter().sum();
    assert!((sum - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_create_profile_requires_user_id() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(&dir.path().join("snap.json"));

    let response = server
        .post("/api/v1/user_profile")
        .json(&json!({ "name": "Nobody" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing user_id");
}

#[tokio::test]
async fn test_recommendations_for_profile() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(&dir.path().join("snap.json"));
    create_john(&server).await;

    let response = server
        .get("/api/v1/recommendations/user123")
        .add_query_param("n", 3)
        .add_query_param("price_sensitivity", 0.3)
        .await;
    response.assert_status_ok();

    let recs: Vec<Value> = response.json();
    assert_eq!(recs.len(), 3);
    // item 3 is in the booking history
    assert!(recs.iter().all(|r| r["id"] != 3));

    let scores: Vec<f64> = recs
        .iter()
        .map(|r| r["recommendation_score"].as_f64().unwrap())
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    assert!(scores.iter().all(|s| *s >= 0.0));

    for rec in &recs {
        assert!(rec["explanation"].as_str().is_some_and(|e| !e.is_empty()));
        assert!(rec.get("description").is_some());
        assert!(rec.get("category_id").is_some());
    }
}

#[tokio::test]
async fn test_recommendations_for_unknown_user() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(&dir.path().join("snap.json"));

    let recs: Vec<Value> = server
        .get("/api/v1/recommendations/newcomer")
        .add_query_param("n", 2)
        .await
        .json();
    assert_eq!(recs.len(), 2);
    assert!(recs.iter().all(|r| r["recommendation_score"] == 0.0));
}

#[tokio::test]
async fn test_recommendations_with_non_positive_n() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(&dir.path().join("snap.json"));

    let recs: Vec<Value> = server
        .get("/api/v1/recommendations/user123")
        .add_query_param("n", -1)
        .await
        .json();
    assert!(recs.is_empty());
}

#[tokio::test]
async fn test_track_interaction_updates_preferences() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(&dir.path().join("snap.json"));
    create_john(&server).await;

    let response = server
        .post("/api/v1/track_interaction")
        .json(&json!({
            "user_id": "user123",
            "gig_id": 5,
            "interaction_type": "book"
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["preferences_updated"], true);

    let response = server
        .post("/api/v1/snapshot/save")
        .await;
    response.assert_status_ok();

    let snapshot: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("snap.json")).unwrap())
            .unwrap();
    assert_eq!(
        snapshot["user_profiles"]["user123"]["preferences"]["Landscaping"],
        1.0
    );
    assert_eq!(snapshot["user_interactions"]["user123"]["5"]["book"], 1.0);
}

#[tokio::test]
async fn test_track_interaction_requires_ids() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(&dir.path().join("snap.json"));

    let response = server
        .post("/api/v1/track_interaction")
        .json(&json!({ "user_id": "user123" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/v1/track_interaction")
        .json(&json!({ "gig_id": 1 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_urgent_need() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(&dir.path().join("snap.json"));

    let response = server
        .post("/api/v1/urgent_need")
        .json(&json!({ "user_id": "ghost" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    create_john(&server).await;
    let response = server
        .post("/api/v1/urgent_need")
        .json(&json!({ "user_id": "user123", "category": "cleaning" }))
        .await;
    response.assert_status_ok();
    let profile: Value = response.json();
    assert_eq!(profile["urgent_need"], true);
    assert_eq!(profile["preferences"]["Cleaning"], 1.0);
}

#[tokio::test]
async fn test_explain() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(&dir.path().join("snap.json"));

    let body: Value = server
        .get("/api/v1/recommendations/ghost/explain/1")
        .await
        .json();
    assert_eq!(body["explanation"], "User profile not found.");

    create_john(&server).await;
    let body: Value = server
        .get("/api/v1/recommendations/user123/explain/1")
        .await
        .json();
    assert_eq!(
        body["explanation"],
        "This matches your interest in Plumbing services. \
         This provider serves your area. \
         This service has an excellent rating of 5 stars."
    );

    let body: Value = server
        .get("/api/v1/recommendations/user123/explain/999")
        .await
        .json();
    assert_eq!(body["explanation"], "Service not found.");
}

#[tokio::test]
async fn test_emergency_services() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(&dir.path().join("snap.json"));
    create_john(&server).await;

    let items: Vec<Value> = server
        .get("/api/v1/emergency_services")
        .add_query_param("user_id", "user123")
        .await
        .json();

    assert_eq!(items.len(), 5);
    assert!(items.iter().all(|i| i["is_urgent"] == true));
    // local providers first, best rated first among them
    assert_eq!(items[0]["id"], 1);
    assert_eq!(items[1]["id"], 6);
    assert_eq!(items[2]["id"], 4);
}

#[tokio::test]
async fn test_seasonal() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(&dir.path().join("snap.json"));

    let items: Vec<Value> = server
        .get("/api/v1/seasonal/winter")
        .add_query_param("n", 2)
        .await
        .json();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], 1);
    assert_eq!(items[1]["id"], 7);

    let response = server.get("/api/v1/seasonal/monsoon").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_snapshot_load_failure_keeps_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snap.json");
    let server = create_test_server(&path);
    create_john(&server).await;

    // nothing saved yet
    let body: Value = server.post("/api/v1/snapshot/load").await.json();
    assert_eq!(body["loaded"], false);

    std::fs::write(&path, "{ corrupt").unwrap();
    let body: Value = server.post("/api/v1/snapshot/load").await.json();
    assert_eq!(body["loaded"], false);

    let body: Value = server
        .get("/api/v1/recommendations/user123/explain/1")
        .await
        .json();
    assert_ne!(body["explanation"], "User profile not found.");
}

#[tokio::test]
async fn test_snapshot_round_trip_across_servers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snap.json");

    let first = create_test_server(&path);
    create_john(&first).await;
    first.post("/api/v1/snapshot/save").await.assert_status_ok();

    let second = create_test_server(&path);
    let body: Value = second.post("/api/v1/snapshot/load").await.json();
    assert_eq!(body["loaded"], true);
    assert_eq!(body["profiles"], 1);

    let saved = std::fs::read_to_string(&path).unwrap();
    second.post("/api/v1/snapshot/save").await.assert_status_ok();
    let resaved = std::fs::read_to_string(&path).unwrap();
    assert_eq!(saved, resaved);
}

#[tokio::test]
async fn test_negative_weights_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_server(&dir.path().join("snap.json"));

    let response = server
        .post("/api/v1/user_profile")
        .json(&json!({
            "user_id": "v",
            "preferences": { "Plumbing": -1.0, "HVAC": 2.0 }
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["error"],
        "Preference for Plumbing must be a non-negative number"
    );

    create_john(&server).await;
    let response = server
        .post("/api/v1/track_interaction")
        .json(&json!({
            "user_id": "user123",
            "gig_id": 1,
            "interaction_type": "book",
            "value": -3.0
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let recs: Vec<Value> = server
        .get("/api/v1/recommendations/user123")
        .add_query_param("n", 8)
        .await
        .json();
    assert!(recs
        .iter()
        .all(|r| r["recommendation_score"].as_f64().is_some_and(|s| s >= 0.0)));
}
