use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CandidateProfile {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub age: Option<i32>,
    pub education: Option<String>,
    pub experience: Option<String>,
    pub experience_level: Option<String>,
    pub industry: Option<String>,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
    pub resume_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every user-editable field of a candidate. Used both for inserts and for
/// full replacement updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateDraft {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub age: Option<i32>,
    pub education: Option<String>,
    pub experience: Option<String>,
    pub experience_level: Option<String>,
    pub industry: Option<String>,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
    pub resume_path: Option<String>,
}

impl CandidateDraft {
    /// Trims every text field, turning blanks into `None` and dropping blank
    /// list entries.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: non_blank(self.email),
            phone: non_blank(self.phone),
            age: self.age,
            education: non_blank(self.education),
            experience: non_blank(self.experience),
            experience_level: non_blank(self.experience_level),
            industry: non_blank(self.industry),
            skills: non_blank_list(self.skills),
            certifications: non_blank_list(self.certifications),
            resume_path: non_blank(self.resume_path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RankedCandidate {
    #[serde(flatten)]
    pub candidate: CandidateProfile,
    /// Match score in `0..=100`.
    pub score: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ValueCount {
    pub value: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CandidateStats {
    pub total_candidates: i64,
    pub by_experience_level: Vec<ValueCount>,
    pub top_industries: Vec<ValueCount>,
    pub top_skills: Vec<ValueCount>,
    pub top_certifications: Vec<ValueCount>,
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn non_blank_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_draft_drops_blank_values() {
        let draft = CandidateDraft {
            name: "  Jane Doe ".into(),
            email: Some("  jane@example.com ".into()),
            phone: Some("   ".into()),
            skills: vec!["Python".into(), " ".into(), " SQL ".into()],
            ..Default::default()
        }
        .normalized();

        assert_eq!(draft.name, "Jane Doe");
        assert_eq!(draft.email.as_deref(), Some("jane@example.com"));
        assert_eq!(draft.phone, None);
        assert_eq!(draft.skills, vec!["Python".to_string(), "SQL".to_string()]);
    }
}
