use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::{
        candidate_dto::{SaveCandidatePayload, SaveCandidateResponse},
        search_dto::{ListQuery, MAX_SEARCH_LIMIT},
    },
    error::{Error, Result},
    models::{
        candidate::{CandidateProfile, CandidateStats},
        extraction::ProcessedResume,
    },
    routes::ApiJson,
    AppState,
};

const RESUME_FIELD: &str = "resume";

#[utoipa::path(
    post,
    path = "/api/resumes/process",
    request_body(content = String, content_type = "multipart/form-data", description = "PDF in the `resume` field"),
    responses(
        (status = 200, description = "Resume fully processed", body = ProcessedResume),
        (status = 207, description = "Only contact details could be recovered", body = ProcessedResume),
        (status = 400, description = "Missing or non-PDF file"),
        (status = 422, description = "No text could be extracted")
    )
)]
#[axum::debug_handler]
pub async fn process_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if file_name.trim().is_empty() {
            return Err(Error::BadRequest("No file selected".into()));
        }
        let data = field.bytes().await?;
        tracing::info!(file_name = %file_name, bytes = data.len(), "processing resume upload");

        let processed = state.intake_service.process(&file_name, data).await?;
        let status = if processed.partial {
            StatusCode::MULTI_STATUS
        } else {
            StatusCode::OK
        };
        return Ok((status, Json(processed)));
    }

    Err(Error::BadRequest("No file part".into()))
}

#[utoipa::path(
    post,
    path = "/api/candidates",
    request_body = SaveCandidatePayload,
    responses(
        (status = 201, description = "Candidate saved", body = SaveCandidateResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already belongs to a candidate")
    )
)]
#[axum::debug_handler]
pub async fn save_candidate(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SaveCandidatePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let id = state.candidate_service.insert(payload.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(SaveCandidateResponse {
            success: true,
            message: "Candidate saved successfully".to_string(),
            id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/candidates",
    params(
        ("limit" = Option<i64>, Query, description = "Maximum number of candidates")
    ),
    responses(
        (status = 200, description = "Candidates by ascending id", body = Vec<CandidateProfile>)
    )
)]
#[axum::debug_handler]
pub async fn list_candidates(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let limit = query
        .limit
        .unwrap_or(MAX_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT);
    let candidates = state.candidate_service.all(limit).await?;
    Ok(Json(candidates))
}

#[utoipa::path(
    get,
    path = "/api/candidates/{id}",
    params(
        ("id" = i64, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate found", body = CandidateProfile),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let candidate = state.candidate_service.get_by_id(id).await?;
    Ok(Json(candidate))
}

#[utoipa::path(
    put,
    path = "/api/candidates/{id}",
    params(
        ("id" = i64, Path, description = "Candidate ID")
    ),
    request_body = SaveCandidatePayload,
    responses(
        (status = 200, description = "Candidate replaced", body = CandidateProfile),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Candidate not found"),
        (status = 409, description = "Email already belongs to another candidate")
    )
)]
#[axum::debug_handler]
pub async fn update_candidate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<SaveCandidatePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let candidate = state.candidate_service.update(id, payload.into()).await?;
    Ok(Json(candidate))
}

#[utoipa::path(
    delete,
    path = "/api/candidates/{id}",
    params(
        ("id" = i64, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate and resume removed"),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_candidate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.candidate_service.delete(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Candidate deleted successfully"
    })))
}

#[utoipa::path(
    get,
    path = "/api/candidates/stats",
    responses(
        (status = 200, description = "Aggregate candidate statistics", body = CandidateStats)
    )
)]
#[axum::debug_handler]
pub async fn candidate_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state.candidate_service.stats().await?;
    Ok(Json(stats))
}
