use axum::Router;
use crate::state::AppState;
use tower_http::trace::TraceLayer;

pub fn create_app(state: AppState) -> Router {
    crate::routes::configure_routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{BucketConfig, StagingConfig};
    use crate::infrastructure::staging::StagingArea;
    use crate::modules::video::model::{StatusRecord, VideoStatus};
    use crate::testing::{FakeEngine, FakeObjectStore, InMemoryStatusStore, envelope_for};
    use crate::workers::transcoder::JobOrchestrator;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn test_app(engine: FakeEngine) -> (tempfile::TempDir, Arc<InMemoryStatusStore>, Router) {
        test_app_with(engine, InMemoryStatusStore::default()).await
    }

    async fn test_app_with(
        engine: FakeEngine,
        status: InMemoryStatusStore,
    ) -> (tempfile::TempDir, Arc<InMemoryStatusStore>, Router) {
        let tmp = tempfile::tempdir().unwrap();
        let staging_config = StagingConfig {
            raw_dir: tmp.path().join("raw"),
            processed_dir: tmp.path().join("processed"),
            thumbnail_dir: tmp.path().join("thumbs"),
        };
        let staging = StagingArea::new(&staging_config);
        staging.ensure_directories().await.unwrap();

        let status = Arc::new(status);
        let orchestrator = JobOrchestrator::new(
            Arc::new(FakeObjectStore::default()),
            Arc::new(engine),
            status.clone(),
            staging,
            BucketConfig::default(),
        );
        let app = create_app(AppState::new(status.clone(), orchestrator));
        (tmp, status, app)
    }

    fn post_json(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/process-video")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (_tmp, _status, app) = test_app(FakeEngine::with_height(480)).await;
        let response = app
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn processes_pushed_notification() {
        let (_tmp, status, app) = test_app(FakeEngine::with_height(1080)).await;
        let body = serde_json::to_string(&envelope_for("abc123-user1.mp4")).unwrap();

        let response = app.oneshot(post_json(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["data"]["filename"], "processed-abc123-user1.mp4");
        assert_eq!(json["data"]["thumbnail"], "abc123-user1.png");
        assert_eq!(
            status.record("abc123-user1").unwrap().status,
            VideoStatus::Processed
        );
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let (_tmp, _status, app) = test_app(FakeEngine::with_height(480)).await;
        let response = app.oneshot(post_json("{not json".into())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn envelope_without_name_is_bad_request() {
        let (_tmp, _status, app) = test_app(FakeEngine::with_height(480)).await;
        let body = r#"{"message":{"data":"eyJidWNrZXQiOiJyYXcifQ=="}}"#.to_string();
        let response = app.oneshot(post_json(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_request_reports_the_payload_error() {
        let (_tmp, _status, app) = test_app(FakeEngine::with_height(480)).await;
        let body = serde_json::to_string(&envelope_for("../abc123-user1.mp4")).unwrap();
        let response = app.oneshot(post_json(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let message = json["message"].as_str().unwrap();
        assert!(message.contains("not a plain file name"), "{}", message);
        assert!(!message.contains("missing filename"), "{}", message);
    }

    #[tokio::test]
    async fn duplicate_is_conflict() {
        let (_tmp, status, app) = test_app(FakeEngine::with_height(480)).await;
        status.seed(StatusRecord {
            id: "abc123-user1".into(),
            uid: Some("abc123".into()),
            status: VideoStatus::Processing,
            filename: None,
            thumbnail: None,
            updated_at: None,
        });
        let body = serde_json::to_string(&envelope_for("abc123-user1.mp4")).unwrap();

        let response = app.oneshot(post_json(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn transcode_failure_is_server_error() {
        let engine = FakeEngine {
            fail_transcode: true,
            ..FakeEngine::with_height(480)
        };
        let (_tmp, _status, app) = test_app(engine).await;
        let body = serde_json::to_string(&envelope_for("abc123-user1.mp4")).unwrap();

        let response = app.oneshot(post_json(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn status_lookup() {
        let (_tmp, status, app) = test_app(FakeEngine::with_height(480)).await;
        status.seed(StatusRecord {
            id: "abc123-user1".into(),
            uid: Some("abc123".into()),
            status: VideoStatus::Processed,
            filename: Some("processed-abc123-user1.mp4".into()),
            thumbnail: Some("abc123-user1.png".into()),
            updated_at: None,
        });

        let response = app
            .clone()
            .oneshot(
                Request::get("/api/v1/videos/abc123-user1/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["data"]["status"], "processed");

        let missing = app
            .oneshot(Request::get("/api/v1/videos/nope/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_store_outage_is_server_error() {
        let status = InMemoryStatusStore {
            fail_reads: true,
            ..Default::default()
        };
        let (_tmp, _status, app) = test_app_with(FakeEngine::with_height(480), status).await;

        let response = app
            .oneshot(
                Request::get("/api/v1/videos/abc123-user1/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
