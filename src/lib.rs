pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::database::CandidateStore;
use crate::middleware::auth::AuthKeys;
use crate::services::{
    candidate_service::CandidateService, document_service::DocumentStore,
    extraction_service::ExtractionService, intake_service::IntakeService,
    llm_service::ChatBackend, ranking_service::RankingService,
};

#[derive(Clone)]
pub struct AppState {
    pub candidate_service: CandidateService,
    pub intake_service: IntakeService,
    pub ranking_service: RankingService,
    pub auth: AuthKeys,
    /// Upper bound on candidates sent to the ranking model per request.
    pub match_candidate_limit: i64,
}

impl AppState {
    pub fn new(
        config: &Config,
        store: Arc<dyn CandidateStore>,
        documents: Arc<dyn DocumentStore>,
        llm: Arc<dyn ChatBackend>,
    ) -> Self {
        let candidate_service = CandidateService::new(store, documents.clone());
        let intake_service = IntakeService::new(documents, ExtractionService::new(llm.clone()));
        let ranking_service = RankingService::new(llm);

        Self {
            candidate_service,
            intake_service,
            ranking_service,
            auth: AuthKeys::from_secret(&config.jwt_secret),
            match_candidate_limit: config.match_candidate_limit,
        }
    }
}
