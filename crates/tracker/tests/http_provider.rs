//! End-to-end tracking through the HTTP jobs API against a stub backend.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::Path;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use studio_client::ApiError;
use studio_core::job::JobStatus;
use studio_tracker::{JobTracker, TrackError, TrackerConfig, TrackerManager};
use tokio_util::sync::CancellationToken;

use common::spawn_backend;

fn fast() -> TrackerConfig {
    TrackerConfig::with_interval(Duration::from_millis(20))
}

#[tokio::test]
async fn tracks_job_through_http_until_success() {
    let polls = Arc::new(AtomicUsize::new(0));
    let polls_handler = Arc::clone(&polls);
    let router = Router::new().route(
        "/api/jobs/{id}",
        get(move |Path(id): Path<i64>| {
            let polls = Arc::clone(&polls_handler);
            async move {
                let n = polls.fetch_add(1, Ordering::SeqCst);
                let data = match n {
                    0 => json!({"id": id, "status": "PENDING", "progress": 0}),
                    1 => json!({"id": id, "status": "RUNNING", "progress": 50}),
                    _ => json!({"id": id, "status": "SUCCEEDED", "progress": 100, "resultUrl": "https://cdn.example/v.mp4"}),
                };
                Json(json!({"code": 200, "message": "操作成功", "data": data}))
            }
        }),
    );
    let tracker = JobTracker::new(spawn_backend(router).await, fast());

    let mut progress = Vec::new();
    let job = tracker
        .track(77, |job| progress.push(job.progress()), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(job.status, JobStatus::Succeeded);
    assert_eq!(job.result_url(), Some("https://cdn.example/v.mp4"));
    assert_eq!(progress, vec![Some(0), Some(50), Some(100)]);
    assert_eq!(polls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn business_error_surfaces_as_transport_with_api_error_source() {
    let router = Router::new().route(
        "/api/jobs/{id}",
        get(|| async { Json(json!({"code": 40800, "message": "任务不存在"})) }),
    );
    let tracker = JobTracker::new(spawn_backend(router).await, fast());

    let result = tracker.wait(1, &CancellationToken::new()).await;

    match result {
        Err(TrackError::Transport { source, .. }) => {
            let api_err = source.downcast_ref::<ApiError>().unwrap();
            assert!(api_err.is_not_found());
        }
        other => panic!("Expected Transport, got {other:?}"),
    }
}

#[tokio::test]
async fn manager_cancel_job_hits_backend_cancel_endpoint() {
    let cancels = Arc::new(AtomicUsize::new(0));
    let cancels_handler = Arc::clone(&cancels);
    let router = Router::new()
        .route(
            "/api/jobs/{id}",
            get(|Path(id): Path<i64>| async move {
                Json(json!({"code": 200, "data": {"id": id, "status": "RUNNING"}}))
            }),
        )
        .route(
            "/api/jobs/{id}/cancel",
            post(move || {
                let cancels = Arc::clone(&cancels_handler);
                async move {
                    cancels.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"code": 200}))
                }
            }),
        );
    let manager = TrackerManager::new(spawn_backend(router).await, fast()).unwrap();

    manager.watch(8).await.unwrap();
    manager.cancel_job(8).await.unwrap();
    manager.shutdown().await;

    assert_eq!(cancels.load(Ordering::SeqCst), 1);
    assert!(manager.watched_job_ids().await.is_empty());
}

#[tokio::test]
async fn manager_reports_rejected_cancel() {
    let router = Router::new().route(
        "/api/jobs/{id}/cancel",
        post(|| async { Json(json!({"code": 40802, "message": "任务已取消"})) }),
    );
    let manager = TrackerManager::new(spawn_backend(router).await, fast()).unwrap();

    let result = manager.cancel_job(8).await;
    assert_matches!(result, Err(studio_tracker::ManagerError::CancelFailed(ref msg)) if msg.contains("40802"));
}
