use crate::infra::AppState;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use job_portal::profiles::{ObjectStoreResumeStore, PDF_CONTENT_TYPE};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::error;

/// Liveness, readiness and Prometheus scrape endpoints.
pub(crate) fn with_operational_routes(router: Router) -> Router {
    router
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(Ordering::Acquire) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Serves uploaded resumes at the URLs handed out by the upload route.
pub(crate) fn file_router(resumes: Arc<ObjectStoreResumeStore>) -> Router {
    Router::new()
        .route("/files/*key", get(resume_file))
        .with_state(resumes)
}

async fn resume_file(
    State(resumes): State<Arc<ObjectStoreResumeStore>>,
    Path(key): Path<String>,
) -> Response {
    match resumes.fetch(&key).await {
        Ok(Some(body)) => ([(header::CONTENT_TYPE, PDF_CONTENT_TYPE)], body).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("file not found: {key}") })),
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, %key, "resume read failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}
