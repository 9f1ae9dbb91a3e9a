pub mod candidate_dto;
pub mod search_dto;
