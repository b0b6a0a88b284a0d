use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::service::{JobDraft, JobPatch, JobService, JobServiceError};
use crate::auth::AuthenticatedIdentity;
use crate::directory::JobId;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Posting management routes. Listing, search and lookup are public; the rest
/// need an `Extension<Arc<Authenticator>>` layer.
pub fn job_router(service: Arc<JobService>) -> Router {
    Router::new()
        .route("/api/jobs", get(list_handler).post(create_handler))
        .route("/api/jobs/search", get(search_handler))
        .route("/api/jobs/recruiter/my-jobs", get(my_jobs_handler))
        .route(
            "/api/jobs/:job_id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .with_state(service)
}

async fn create_handler(
    State(service): State<Arc<JobService>>,
    AuthenticatedIdentity(identity): AuthenticatedIdentity,
    Json(draft): Json<JobDraft>,
) -> Result<Response, JobServiceError> {
    let job = service.create(draft, &identity.id)?;
    Ok((StatusCode::CREATED, Json(job)).into_response())
}

async fn list_handler(State(service): State<Arc<JobService>>) -> Result<Response, JobServiceError> {
    Ok(Json(service.list_active()?).into_response())
}

async fn search_handler(
    State(service): State<Arc<JobService>>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, JobServiceError> {
    Ok(Json(service.search(&query.q)?).into_response())
}

async fn my_jobs_handler(
    State(service): State<Arc<JobService>>,
    AuthenticatedIdentity(identity): AuthenticatedIdentity,
) -> Result<Response, JobServiceError> {
    Ok(Json(service.list_by_recruiter(&identity.id)?).into_response())
}

async fn get_handler(
    State(service): State<Arc<JobService>>,
    Path(job_id): Path<String>,
) -> Result<Response, JobServiceError> {
    Ok(Json(service.get(&JobId(job_id))?).into_response())
}

async fn update_handler(
    State(service): State<Arc<JobService>>,
    AuthenticatedIdentity(identity): AuthenticatedIdentity,
    Path(job_id): Path<String>,
    Json(patch): Json<JobPatch>,
) -> Result<Response, JobServiceError> {
    Ok(Json(service.update(&JobId(job_id), patch, &identity.id)?).into_response())
}

async fn delete_handler(
    State(service): State<Arc<JobService>>,
    AuthenticatedIdentity(identity): AuthenticatedIdentity,
    Path(job_id): Path<String>,
) -> Result<StatusCode, JobServiceError> {
    service.delete(&JobId(job_id), &identity.id)?;
    Ok(StatusCode::NO_CONTENT)
}

impl IntoResponse for JobServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            JobServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            JobServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            JobServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            JobServiceError::Directory(_) => {
                tracing::error!(error = %self, "job directory failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
