use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::search_dto::{MatchJobPayload, SearchCriteria},
    error::{Error, Result},
    models::candidate::{CandidateProfile, RankedCandidate},
    routes::ApiJson,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/search",
    request_body = SearchCriteria,
    responses(
        (status = 200, description = "Matching candidates by ascending id", body = Vec<CandidateProfile>),
        (status = 400, description = "Invalid criteria")
    )
)]
#[axum::debug_handler]
pub async fn search_candidates(
    State(state): State<AppState>,
    ApiJson(criteria): ApiJson<SearchCriteria>,
) -> Result<impl IntoResponse> {
    criteria.validate()?;
    let candidates = state.candidate_service.filter(&criteria).await?;
    tracing::debug!(results = candidates.len(), "candidate search");
    Ok(Json(candidates))
}

#[utoipa::path(
    post,
    path = "/api/match-job",
    request_body = MatchJobPayload,
    responses(
        (status = 200, description = "Scored candidates in ranking order", body = Vec<RankedCandidate>),
        (status = 400, description = "No job requirements provided")
    )
)]
#[axum::debug_handler]
pub async fn match_job(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<MatchJobPayload>,
) -> Result<impl IntoResponse> {
    let requirements = payload
        .requirements
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| Error::BadRequest("No job requirements provided".into()))?;

    let candidates = state
        .candidate_service
        .all(state.match_candidate_limit)
        .await?;
    let ranked = state.ranking_service.rank(requirements, &candidates).await;
    Ok(Json(ranked))
}
