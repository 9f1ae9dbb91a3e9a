pub mod candidate_routes;
pub mod health;
pub mod search;

use axum::{
    extract::FromRequest,
    middleware::from_fn_with_state,
    response::Json,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;

use crate::{
    dto::{
        candidate_dto::{SaveCandidatePayload, SaveCandidateResponse},
        search_dto::{MatchJobPayload, SearchCriteria},
    },
    error::Error,
    middleware::auth::require_staff,
    models::{
        candidate::{CandidateProfile, CandidateStats, RankedCandidate, ValueCount},
        extraction::{ExtractionResult, ProcessedResume},
    },
    AppState,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        candidate_routes::process_resume,
        candidate_routes::save_candidate,
        candidate_routes::list_candidates,
        candidate_routes::get_candidate,
        candidate_routes::update_candidate,
        candidate_routes::delete_candidate,
        candidate_routes::candidate_stats,
        search::search_candidates,
        search::match_job,
    ),
    components(schemas(
        CandidateProfile,
        CandidateStats,
        ValueCount,
        RankedCandidate,
        ExtractionResult,
        ProcessedResume,
        SaveCandidatePayload,
        SaveCandidateResponse,
        SearchCriteria,
        MatchJobPayload,
    ))
)]
pub struct ApiDoc;

/// `Json` body extractor whose rejections use the API's error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// All routes with their state applied. Everything except `/health` needs a
/// staff bearer token.
pub fn router(state: AppState) -> Router {
    let staff_api = Router::new()
        .route("/api/resumes/process", post(candidate_routes::process_resume))
        .route(
            "/api/candidates",
            get(candidate_routes::list_candidates).post(candidate_routes::save_candidate),
        )
        .route("/api/candidates/stats", get(candidate_routes::candidate_stats))
        .route(
            "/api/candidates/:id",
            get(candidate_routes::get_candidate)
                .put(candidate_routes::update_candidate)
                .delete(candidate_routes::delete_candidate),
        )
        .route("/api/search", post(search::search_candidates))
        .route("/api/match-job", post(search::match_job))
        .route("/api/openapi.json", get(openapi_json))
        .layer(from_fn_with_state(state.auth.clone(), require_staff));

    Router::new()
        .route("/health", get(health::health))
        .merge(staff_api)
        .with_state(state)
}
