use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, ApplicationStatus};
use super::repository::ApplicationRepository;
use super::service::{ApplicationWorkflow, ApplicationWorkflowError};
use crate::auth::AuthenticatedIdentity;
use crate::directory::JobId;
use crate::scoring::ScoringOracle;

/// Body of `POST /api/applications`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplication {
    pub job_id: JobId,
    #[serde(default)]
    pub cover_letter: Option<String>,
}

/// Body of `PUT /api/applications/:id/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusChange {
    pub status: ApplicationStatus,
}

/// Routes for submitting and reviewing applications. Callers must layer an
/// `Extension<Arc<Authenticator>>` on the returned router.
pub fn application_router<R, O>(workflow: Arc<ApplicationWorkflow<R, O>>) -> Router
where
    R: ApplicationRepository + 'static,
    O: ScoringOracle + 'static,
{
    Router::new()
        .route("/api/applications", post(submit_handler::<R, O>))
        .route(
            "/api/applications/my-applications",
            get(my_applications_handler::<R, O>),
        )
        .route(
            "/api/applications/job/:job_id",
            get(job_applications_handler::<R, O>),
        )
        .route(
            "/api/applications/:application_id/status",
            put(status_handler::<R, O>),
        )
        .with_state(workflow)
}

pub(crate) async fn submit_handler<R, O>(
    State(workflow): State<Arc<ApplicationWorkflow<R, O>>>,
    AuthenticatedIdentity(identity): AuthenticatedIdentity,
    Json(body): Json<SubmitApplication>,
) -> Response
where
    R: ApplicationRepository + 'static,
    O: ScoringOracle + 'static,
{
    match workflow
        .submit(&body.job_id, &identity.id, body.cover_letter)
        .await
    {
        Ok(application) => (StatusCode::CREATED, Json(application.view())).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn my_applications_handler<R, O>(
    State(workflow): State<Arc<ApplicationWorkflow<R, O>>>,
    AuthenticatedIdentity(identity): AuthenticatedIdentity,
) -> Response
where
    R: ApplicationRepository + 'static,
    O: ScoringOracle + 'static,
{
    match workflow.list_by_job_seeker(&identity.id) {
        Ok(views) => (StatusCode::OK, Json(views)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn job_applications_handler<R, O>(
    State(workflow): State<Arc<ApplicationWorkflow<R, O>>>,
    AuthenticatedIdentity(identity): AuthenticatedIdentity,
    Path(job_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    O: ScoringOracle + 'static,
{
    match workflow.list_by_job(&JobId(job_id), &identity.id) {
        Ok(views) => (StatusCode::OK, Json(views)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn status_handler<R, O>(
    State(workflow): State<Arc<ApplicationWorkflow<R, O>>>,
    AuthenticatedIdentity(identity): AuthenticatedIdentity,
    Path(application_id): Path<String>,
    Json(body): Json<StatusChange>,
) -> Response
where
    R: ApplicationRepository + 'static,
    O: ScoringOracle + 'static,
{
    let id = ApplicationId(application_id);
    match workflow.update_status(&id, body.status, &identity.id) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error.into_response(),
    }
}

impl IntoResponse for ApplicationWorkflowError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApplicationWorkflowError::DuplicateApplication { .. } => StatusCode::CONFLICT,
            ApplicationWorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
            ApplicationWorkflowError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApplicationWorkflowError::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApplicationWorkflowError::Repository(_) | ApplicationWorkflowError::Directory(_) => {
                tracing::error!(error = %self, "application workflow storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let payload = json!({ "error": self.to_string() });
        (status, Json(payload)).into_response()
    }
}
