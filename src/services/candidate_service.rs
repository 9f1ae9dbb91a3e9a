use std::sync::Arc;

use crate::database::{CandidateStore, GroupField};
use crate::dto::search_dto::SearchCriteria;
use crate::error::{Error, Result};
use crate::models::candidate::{CandidateDraft, CandidateProfile, CandidateStats, ValueCount};
use crate::services::document_service::DocumentStore;
use crate::services::query_builder::CandidateFilter;

const TOP_INDUSTRIES: i64 = 5;
const TOP_SKILLS: i64 = 10;
const TOP_CERTIFICATIONS: i64 = 5;

/// Candidate repository: the store plus the document store holding each
/// candidate's resume.
#[derive(Clone)]
pub struct CandidateService {
    store: Arc<dyn CandidateStore>,
    documents: Arc<dyn DocumentStore>,
}

impl CandidateService {
    pub fn new(store: Arc<dyn CandidateStore>, documents: Arc<dyn DocumentStore>) -> Self {
        Self { store, documents }
    }

    pub async fn exists_by_email(&self, email: &str) -> Result<bool> {
        Ok(self.store.find_id_by_email(email).await?.is_some())
    }

    pub async fn insert(&self, draft: CandidateDraft) -> Result<i64> {
        let draft = checked(draft)?;
        if let Some(email) = draft.email.as_deref() {
            if self.exists_by_email(email).await? {
                return Err(duplicate_email());
            }
        }

        let candidate = self.store.insert(&draft).await?;
        tracing::info!(candidate_id = candidate.id, "candidate saved");
        Ok(candidate.id)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<CandidateProfile> {
        self.store.get(id).await?.ok_or_else(|| not_found(id))
    }

    /// Full replacement of every editable field. A resume the new record no
    /// longer points at is released.
    pub async fn update(&self, id: i64, draft: CandidateDraft) -> Result<CandidateProfile> {
        let draft = checked(draft)?;
        if let Some(email) = draft.email.as_deref() {
            if let Some(owner) = self.store.find_id_by_email(email).await? {
                if owner != id {
                    return Err(duplicate_email());
                }
            }
        }

        let previous = self.get_by_id(id).await?.resume_path;
        let candidate = self.store.replace(id, &draft).await?.ok_or_else(|| not_found(id))?;
        if let Some(old) = previous.filter(|old| candidate.resume_path.as_ref() != Some(old)) {
            self.release_resume(id, &old).await;
        }

        tracing::info!(candidate_id = id, "candidate updated");
        Ok(candidate)
    }

    /// Deletes the record, then releases its resume. A resume that cannot be
    /// removed is logged and left behind; the delete still succeeds.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let removed = self.store.delete(id).await?.ok_or_else(|| not_found(id))?;

        if let Some(path) = removed.resume_path.as_deref() {
            self.release_resume(id, path).await;
        }

        tracing::info!(candidate_id = id, "candidate deleted");
        Ok(())
    }

    async fn release_resume(&self, id: i64, path: &str) {
        if let Err(e) = self.documents.remove(path).await {
            tracing::warn!(candidate_id = id, path, error = %e, "failed to remove resume file");
        }
    }

    pub async fn filter(&self, criteria: &SearchCriteria) -> Result<Vec<CandidateProfile>> {
        let filter = CandidateFilter::from_criteria(criteria);
        self.store.filter(&filter, criteria.effective_limit()).await
    }

    pub async fn all(&self, limit: i64) -> Result<Vec<CandidateProfile>> {
        self.store.filter(&CandidateFilter::default(), limit).await
    }

    pub async fn count(&self) -> Result<i64> {
        self.store.count().await
    }

    pub async fn count_by_experience_level(&self) -> Result<Vec<ValueCount>> {
        self.store.count_by(GroupField::ExperienceLevel, None).await
    }

    pub async fn top_industries(&self, n: i64) -> Result<Vec<ValueCount>> {
        self.store.count_by(GroupField::Industry, Some(n)).await
    }

    pub async fn top_skills(&self, n: i64) -> Result<Vec<ValueCount>> {
        self.store.count_by(GroupField::Skills, Some(n)).await
    }

    pub async fn top_certifications(&self, n: i64) -> Result<Vec<ValueCount>> {
        self.store.count_by(GroupField::Certifications, Some(n)).await
    }

    pub async fn stats(&self) -> Result<CandidateStats> {
        Ok(CandidateStats {
            total_candidates: self.count().await?,
            by_experience_level: self.count_by_experience_level().await?,
            top_industries: self.top_industries(TOP_INDUSTRIES).await?,
            top_skills: self.top_skills(TOP_SKILLS).await?,
            top_certifications: self.top_certifications(TOP_CERTIFICATIONS).await?,
        })
    }
}

fn checked(draft: CandidateDraft) -> Result<CandidateDraft> {
    let draft = draft.normalized();
    if draft.name.is_empty() {
        return Err(Error::BadRequest("Invalid data. Name is required.".into()));
    }
    if draft.age.is_some_and(|age| age < 0) {
        return Err(Error::BadRequest("Age must not be negative".into()));
    }
    Ok(draft)
}

fn duplicate_email() -> Error {
    Error::Conflict("A candidate with this email already exists".to_string())
}

fn not_found(id: i64) -> Error {
    Error::NotFound(format!("Candidate {} not found", id))
}
