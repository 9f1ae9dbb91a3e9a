use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::database::candidate_store::{CandidateStore, GroupField};
use crate::error::{Error, Result};
use crate::models::candidate::{CandidateDraft, CandidateProfile, ValueCount};
use crate::services::query_builder::CandidateFilter;

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    rows: BTreeMap<i64, CandidateProfile>,
}

/// Process-local candidate store used when no database is configured.
/// Holds the same contract as the Postgres store; the email uniqueness check
/// runs under the same lock as the write.
#[derive(Default)]
pub struct MemoryCandidateStore {
    state: Mutex<MemoryState>,
}

impl MemoryCandidateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().expect("candidate store mutex poisoned")
    }
}

fn email_taken(state: &MemoryState, email: Option<&str>, except: Option<i64>) -> bool {
    let Some(email) = email else {
        return false;
    };
    state
        .rows
        .values()
        .any(|c| c.email.as_deref() == Some(email) && Some(c.id) != except)
}

fn duplicate_email() -> Error {
    Error::Conflict("A candidate with this email already exists".to_string())
}

#[async_trait]
impl CandidateStore for MemoryCandidateStore {
    async fn find_id_by_email(&self, email: &str) -> Result<Option<i64>> {
        let state = self.lock();
        Ok(state
            .rows
            .values()
            .find(|c| c.email.as_deref() == Some(email))
            .map(|c| c.id))
    }

    async fn insert(&self, draft: &CandidateDraft) -> Result<CandidateProfile> {
        let mut state = self.lock();
        if email_taken(&state, draft.email.as_deref(), None) {
            return Err(duplicate_email());
        }

        state.next_id += 1;
        let now = Utc::now();
        let candidate = CandidateProfile {
            id: state.next_id,
            name: draft.name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            age: draft.age,
            education: draft.education.clone(),
            experience: draft.experience.clone(),
            experience_level: draft.experience_level.clone(),
            industry: draft.industry.clone(),
            skills: draft.skills.clone(),
            certifications: draft.certifications.clone(),
            resume_path: draft.resume_path.clone(),
            created_at: now,
            updated_at: now,
        };
        state.rows.insert(candidate.id, candidate.clone());
        Ok(candidate)
    }

    async fn get(&self, id: i64) -> Result<Option<CandidateProfile>> {
        Ok(self.lock().rows.get(&id).cloned())
    }

    async fn replace(&self, id: i64, draft: &CandidateDraft) -> Result<Option<CandidateProfile>> {
        let mut state = self.lock();
        if !state.rows.contains_key(&id) {
            return Ok(None);
        }
        if email_taken(&state, draft.email.as_deref(), Some(id)) {
            return Err(duplicate_email());
        }

        let Some(existing) = state.rows.get_mut(&id) else {
            return Ok(None);
        };
        let updated = CandidateProfile {
            id,
            name: draft.name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            age: draft.age,
            education: draft.education.clone(),
            experience: draft.experience.clone(),
            experience_level: draft.experience_level.clone(),
            industry: draft.industry.clone(),
            skills: draft.skills.clone(),
            certifications: draft.certifications.clone(),
            resume_path: draft.resume_path.clone(),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        *existing = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> Result<Option<CandidateProfile>> {
        Ok(self.lock().rows.remove(&id))
    }

    async fn filter(&self, filter: &CandidateFilter, limit: i64) -> Result<Vec<CandidateProfile>> {
        let state = self.lock();
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(state
            .rows
            .values()
            .filter(|c| filter.matches(c))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.lock().rows.len() as i64)
    }

    async fn count_by(&self, field: GroupField, limit: Option<i64>) -> Result<Vec<ValueCount>> {
        let state = self.lock();
        let values = state.rows.values().flat_map(|c| -> Vec<String> {
            match field {
                GroupField::ExperienceLevel => c.experience_level.iter().cloned().collect(),
                GroupField::Industry => c.industry.iter().cloned().collect(),
                GroupField::Skills => c.skills.clone(),
                GroupField::Certifications => c.certifications.clone(),
            }
        });
        Ok(tally(values, limit))
    }
}

/// Counts distinct values, most frequent first, ties by value.
pub(crate) fn tally(values: impl IntoIterator<Item = String>, limit: Option<i64>) -> Vec<ValueCount> {
    let mut counts: HashMap<String, i64> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut ranked: Vec<ValueCount> = counts
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

    if let Some(limit) = limit {
        ranked.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
    }
    ranked
}
