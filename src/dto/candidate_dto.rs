use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::candidate::CandidateDraft;

/// Reviewed profile sent by the UI, for both save and full update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SaveCandidatePayload {
    #[validate(length(min = 1))]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[validate(range(min = 0))]
    pub age: Option<i32>,
    pub education: Option<String>,
    pub experience: Option<String>,
    pub experience_level: Option<String>,
    pub industry: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub certifications: Option<Vec<String>>,
    pub resume_path: Option<String>,
}

impl From<SaveCandidatePayload> for CandidateDraft {
    fn from(payload: SaveCandidatePayload) -> Self {
        Self {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            age: payload.age,
            education: payload.education,
            experience: payload.experience,
            experience_level: payload.experience_level,
            industry: payload.industry,
            skills: payload.skills.unwrap_or_default(),
            certifications: payload.certifications.unwrap_or_default(),
            resume_path: payload.resume_path,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaveCandidateResponse {
    pub success: bool,
    pub message: String,
    pub id: i64,
}
