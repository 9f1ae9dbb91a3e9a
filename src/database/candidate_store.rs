use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::Result;
use crate::models::candidate::{CandidateDraft, CandidateProfile, ValueCount};
use crate::services::query_builder::CandidateFilter;

/// Column groups the statistics endpoint counts over. List columns are
/// flattened so every entry counts once per candidate that carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    ExperienceLevel,
    Industry,
    Skills,
    Certifications,
}

impl GroupField {
    fn column(self) -> &'static str {
        match self {
            GroupField::ExperienceLevel => "experience_level",
            GroupField::Industry => "industry",
            GroupField::Skills => "skills",
            GroupField::Certifications => "certifications",
        }
    }

    fn is_list(self) -> bool {
        matches!(self, GroupField::Skills | GroupField::Certifications)
    }
}

/// Persistence for candidate records.
///
/// Results of `filter` are ordered by ascending id. Grouped counts are
/// ordered by count descending, then by value (byte order); null values are
/// not counted. `insert` and `replace` fail with `Error::Conflict` when the
/// email already belongs to another candidate.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn find_id_by_email(&self, email: &str) -> Result<Option<i64>>;
    async fn insert(&self, draft: &CandidateDraft) -> Result<CandidateProfile>;
    async fn get(&self, id: i64) -> Result<Option<CandidateProfile>>;
    async fn replace(&self, id: i64, draft: &CandidateDraft) -> Result<Option<CandidateProfile>>;
    async fn delete(&self, id: i64) -> Result<Option<CandidateProfile>>;
    async fn filter(&self, filter: &CandidateFilter, limit: i64) -> Result<Vec<CandidateProfile>>;
    async fn count(&self) -> Result<i64>;
    async fn count_by(&self, field: GroupField, limit: Option<i64>) -> Result<Vec<ValueCount>>;
}

const CANDIDATE_COLUMNS: &str = "id, name, email, phone, age, education, experience, \
    experience_level, industry, skills, certifications, resume_path, created_at, updated_at";

#[derive(Clone)]
pub struct PgCandidateStore {
    pool: PgPool,
}

impl PgCandidateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CandidateStore for PgCandidateStore {
    async fn find_id_by_email(&self, email: &str) -> Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM candidates WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    async fn insert(&self, draft: &CandidateDraft) -> Result<CandidateProfile> {
        let sql = format!(
            r#"
            INSERT INTO candidates (
                name, email, phone, age, education, experience,
                experience_level, industry, skills, certifications, resume_path
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {CANDIDATE_COLUMNS}
            "#
        );

        let mut tx = self.pool.begin().await?;
        let candidate = sqlx::query_as::<_, CandidateProfile>(&sql)
            .bind(&draft.name)
            .bind(&draft.email)
            .bind(&draft.phone)
            .bind(draft.age)
            .bind(&draft.education)
            .bind(&draft.experience)
            .bind(&draft.experience_level)
            .bind(&draft.industry)
            .bind(&draft.skills)
            .bind(&draft.certifications)
            .bind(&draft.resume_path)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(candidate)
    }

    async fn get(&self, id: i64) -> Result<Option<CandidateProfile>> {
        let sql = format!("SELECT {CANDIDATE_COLUMNS} FROM candidates WHERE id = $1");
        let candidate = sqlx::query_as::<_, CandidateProfile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(candidate)
    }

    async fn replace(&self, id: i64, draft: &CandidateDraft) -> Result<Option<CandidateProfile>> {
        let sql = format!(
            r#"
            UPDATE candidates
            SET name = $1, email = $2, phone = $3, age = $4, education = $5,
                experience = $6, experience_level = $7, industry = $8,
                skills = $9, certifications = $10, resume_path = $11,
                updated_at = NOW()
            WHERE id = $12
            RETURNING {CANDIDATE_COLUMNS}
            "#
        );

        let mut tx = self.pool.begin().await?;
        let candidate = sqlx::query_as::<_, CandidateProfile>(&sql)
            .bind(&draft.name)
            .bind(&draft.email)
            .bind(&draft.phone)
            .bind(draft.age)
            .bind(&draft.education)
            .bind(&draft.experience)
            .bind(&draft.experience_level)
            .bind(&draft.industry)
            .bind(&draft.skills)
            .bind(&draft.certifications)
            .bind(&draft.resume_path)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(candidate)
    }

    async fn delete(&self, id: i64) -> Result<Option<CandidateProfile>> {
        let sql = format!("DELETE FROM candidates WHERE id = $1 RETURNING {CANDIDATE_COLUMNS}");

        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query_as::<_, CandidateProfile>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(removed)
    }

    async fn filter(&self, filter: &CandidateFilter, limit: i64) -> Result<Vec<CandidateProfile>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {CANDIDATE_COLUMNS} FROM candidates"
        ));
        filter.push_where(&mut qb);
        qb.push(" ORDER BY id ASC LIMIT ").push_bind(limit);

        let candidates = qb
            .build_query_as::<CandidateProfile>()
            .fetch_all(&self.pool)
            .await?;
        Ok(candidates)
    }

    async fn count(&self) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM candidates")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn count_by(&self, field: GroupField, limit: Option<i64>) -> Result<Vec<ValueCount>> {
        let column = field.column();
        let source = if field.is_list() {
            format!("(SELECT unnest({column}) AS value FROM candidates) AS flattened")
        } else {
            format!("(SELECT {column} AS value FROM candidates) AS scalar_values")
        };

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT value, COUNT(*) AS count FROM {source} WHERE value IS NOT NULL \
             GROUP BY value ORDER BY count DESC, value COLLATE \"C\" ASC"
        ));
        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(limit);
        }

        let rows = qb
            .build_query_as::<(String, i64)>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(value, count)| ValueCount { value, count })
            .collect())
    }
}
