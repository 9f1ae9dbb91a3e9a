use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub const DEFAULT_SEARCH_LIMIT: i64 = 100;
pub const MAX_SEARCH_LIMIT: i64 = 1000;

/// Optional search dimensions. A missing or blank field does not filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct SearchCriteria {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub certifications: Option<Vec<String>>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub min_age: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub max_age: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<i64>,
}

impl SearchCriteria {
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct MatchJobPayload {
    #[serde(default)]
    pub requirements: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}
