use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::service::{ProfilePatch, ProfileService, ProfileServiceError};
use super::storage::ResumeStorageError;
use crate::auth::AuthenticatedIdentity;
use crate::directory::UserId;

const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

/// Profile and resume routes. Requires an `Extension<Arc<Authenticator>>` layer.
pub fn profile_router(service: Arc<ProfileService>) -> Router {
    Router::new()
        .route("/api/users/me", get(me_handler))
        .route("/api/users/job-seekers", get(job_seekers_handler))
        .route("/api/users/:user_id", get(get_handler).put(update_handler))
        .route(
            "/api/upload/resume",
            post(upload_handler).layer(DefaultBodyLimit::max(MAX_RESUME_BYTES)),
        )
        .with_state(service)
}

async fn me_handler(
    State(service): State<Arc<ProfileService>>,
    AuthenticatedIdentity(identity): AuthenticatedIdentity,
) -> Result<Response, ProfileServiceError> {
    Ok(Json(service.me(&identity)?).into_response())
}

async fn job_seekers_handler(
    State(service): State<Arc<ProfileService>>,
    AuthenticatedIdentity(_): AuthenticatedIdentity,
) -> Result<Response, ProfileServiceError> {
    Ok(Json(service.list_job_seekers()?).into_response())
}

async fn get_handler(
    State(service): State<Arc<ProfileService>>,
    AuthenticatedIdentity(_): AuthenticatedIdentity,
    Path(user_id): Path<String>,
) -> Result<Response, ProfileServiceError> {
    Ok(Json(service.get(&UserId(user_id))?).into_response())
}

async fn update_handler(
    State(service): State<Arc<ProfileService>>,
    AuthenticatedIdentity(identity): AuthenticatedIdentity,
    Path(user_id): Path<String>,
    Json(patch): Json<ProfilePatch>,
) -> Result<Response, ProfileServiceError> {
    Ok(Json(service.update(&UserId(user_id), patch, &identity)?).into_response())
}

async fn upload_handler(
    State(service): State<Arc<ProfileService>>,
    AuthenticatedIdentity(identity): AuthenticatedIdentity,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProfileServiceError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let account = service
        .attach_resume(&identity.id, body, content_type)
        .await?;

    let payload = json!({
        "resumeUrl": account.profile.resume_url,
        "message": "Resume uploaded successfully",
    });
    Ok((StatusCode::OK, Json(payload)).into_response())
}

impl IntoResponse for ProfileServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProfileServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ProfileServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ProfileServiceError::Upload(ResumeStorageError::Empty) => StatusCode::BAD_REQUEST,
            ProfileServiceError::Upload(ResumeStorageError::UnsupportedType(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            ProfileServiceError::Upload(ResumeStorageError::Store(_))
            | ProfileServiceError::Directory(_) => {
                tracing::error!(error = %self, "profile storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
