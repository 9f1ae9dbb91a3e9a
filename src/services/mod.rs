pub mod candidate_service;
pub mod document_service;
pub mod extraction_service;
pub mod intake_service;
pub mod llm_service;
pub mod pdf_service;
pub mod query_builder;
pub mod ranking_service;
