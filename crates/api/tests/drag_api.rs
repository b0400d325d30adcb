//! HTTP-level integration tests for the drag-to-reorder gesture.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{body_json, build_test_app, get, post, post_json, processor_ids};
use serde_json::json;

/// Router whose session holds `[p0, p1, p2]`.
async fn app_with_three_processors() -> Router {
    let app = build_test_app();
    for _ in 0..2 {
        let response = post_json(
            app.clone(),
            "/api/v1/pipeline/processors",
            json!({"kind": "copy_values"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    app
}

#[tokio::test]
async fn drag_first_onto_last_moves_before_last() {
    let app = app_with_three_processors().await;

    let response = post_json(
        app.clone(),
        "/api/v1/pipeline/drag/start",
        json!({"processor_id": "p0"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["drag"]["state"], "dragging");
    assert_eq!(json["data"]["drag"]["dragged_id"], "p0");

    let response = post_json(
        app.clone(),
        "/api/v1/pipeline/drag/drop",
        json!({"target_id": "p2"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(processor_ids(&json), vec!["p1", "p0", "p2"]);
    assert_eq!(json["data"]["detail"]["outcome"], "moved");
    assert_eq!(json["data"]["drag"]["state"], "idle");

    let json = body_json(get(app, "/api/v1/pipeline/drag").await).await;
    assert_eq!(json["data"]["state"], "idle");
}

#[tokio::test]
async fn drag_over_previews_without_committing() {
    let app = app_with_three_processors().await;
    post_json(
        app.clone(),
        "/api/v1/pipeline/drag/start",
        json!({"processor_id": "p2"}),
    )
    .await;

    let response = post_json(
        app.clone(),
        "/api/v1/pipeline/drag/over",
        json!({"target_id": "p0"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["would_move"], true);
    assert_eq!(json["data"]["resulting_order"], json!(["p2", "p0", "p1"]));

    let json = body_json(get(app, "/api/v1/pipeline").await).await;
    assert_eq!(processor_ids(&json), vec!["p0", "p1", "p2"]);
    assert_eq!(json["data"]["drag"]["dragged_id"], "p2");
}

#[tokio::test]
async fn drag_over_while_idle_returns_null() {
    let app = app_with_three_processors().await;
    let response = post_json(
        app,
        "/api/v1/pipeline/drag/over",
        json!({"target_id": "p1"}),
    )
    .await;
    let json = body_json(response).await;
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn drop_on_self_is_ignored() {
    let app = app_with_three_processors().await;
    post_json(
        app.clone(),
        "/api/v1/pipeline/drag/start",
        json!({"processor_id": "p1"}),
    )
    .await;

    let response = post_json(
        app,
        "/api/v1/pipeline/drag/drop",
        json!({"target_id": "p1"}),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["detail"]["outcome"], "ignored");
    assert_eq!(json["data"]["detail"]["reason"], "dropped_on_self");
    assert_eq!(processor_ids(&json), vec!["p0", "p1", "p2"]);
    assert_eq!(json["data"]["drag"]["state"], "idle");
}

#[tokio::test]
async fn drop_without_drag_is_ignored() {
    let app = app_with_three_processors().await;
    let response = post_json(
        app,
        "/api/v1/pipeline/drag/drop",
        json!({"target_id": "p0"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["detail"]["reason"], "not_dragging");
}

#[tokio::test]
async fn drag_start_unknown_processor_returns_404() {
    let app = app_with_three_processors().await;
    let response = post_json(
        app.clone(),
        "/api/v1/pipeline/drag/start",
        json!({"processor_id": "p42"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(get(app, "/api/v1/pipeline/drag").await).await;
    assert_eq!(json["data"]["state"], "idle");
}

#[tokio::test]
async fn drag_end_cancels_gesture() {
    let app = app_with_three_processors().await;
    post_json(
        app.clone(),
        "/api/v1/pipeline/drag/start",
        json!({"processor_id": "p0"}),
    )
    .await;

    let response = post(app.clone(), "/api/v1/pipeline/drag/end").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["drag"]["state"], "idle");
    assert_eq!(processor_ids(&json), vec!["p0", "p1", "p2"]);
}

#[tokio::test]
async fn rejected_drag_start_keeps_active_gesture() {
    let app = app_with_three_processors().await;
    post_json(
        app.clone(),
        "/api/v1/pipeline/drag/start",
        json!({"processor_id": "p1"}),
    )
    .await;

    let response = post_json(
        app.clone(),
        "/api/v1/pipeline/drag/start",
        json!({"processor_id": "p42"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(get(app, "/api/v1/pipeline/drag").await).await;
    assert_eq!(json["data"]["state"], "dragging");
    assert_eq!(json["data"]["dragged_id"], "p1");
}
