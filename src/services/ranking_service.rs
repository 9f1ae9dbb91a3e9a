use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::models::candidate::{CandidateProfile, RankedCandidate};
use crate::services::llm_service::{ChatBackend, ChatRequest};

const RANKING_PROMPT: &str = r#"You are an expert HR recruiter specializing in candidate matching.
You will receive job requirements followed by candidate profiles.
Evaluate how well each candidate matches the job requirements on a scale of 0-100.
Consider skills, experience level, education, certifications, and industry background.
Focus particularly on relevant technical skills and domain knowledge.
For finance roles, give higher importance to relevant certifications like CA, CIMA, or CFA.
Return a JSON object whose "rankings" field is an array of candidate IDs with their match scores, sorted from highest to lowest score.
Format: {"rankings": [{"id": candidate_id, "score": match_score}, ...]}"#;

const RANKING_TEMPERATURE: f32 = 0.3;

/// Scores candidates against a job description with one model call.
#[derive(Clone)]
pub struct RankingService {
    llm: Arc<dyn ChatBackend>,
}

impl RankingService {
    pub fn new(llm: Arc<dyn ChatBackend>) -> Self {
        Self { llm }
    }

    /// Returns the candidates the model scored, in the model's order. Any
    /// failure, including an unparseable reply, yields an empty list.
    pub async fn rank(
        &self,
        requirements: &str,
        candidates: &[CandidateProfile],
    ) -> Vec<RankedCandidate> {
        if requirements.trim().is_empty() || candidates.is_empty() {
            return Vec::new();
        }

        let request = ChatRequest {
            system: RANKING_PROMPT.to_string(),
            user: build_prompt(requirements, candidates),
            temperature: RANKING_TEMPERATURE,
        };

        let reply = match self.llm.complete_json(request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %e, "candidate ranking call failed");
                return Vec::new();
            }
        };

        let Some(scores) = parse_scores(&reply) else {
            tracing::warn!("candidate ranking reply has no score list");
            return Vec::new();
        };

        let ranked = join_scores(scores, candidates);
        tracing::info!(
            candidates = candidates.len(),
            ranked = ranked.len(),
            "ranked candidates"
        );
        ranked
    }
}

pub(crate) fn build_prompt(requirements: &str, candidates: &[CandidateProfile]) -> String {
    let blocks: Vec<String> = candidates.iter().map(candidate_block).collect();
    format!(
        "Job Requirements:\n{}\n\nCandidates:\n{}",
        requirements,
        blocks.join("\n\n")
    )
}

fn candidate_block(c: &CandidateProfile) -> String {
    let certifications = if c.certifications.is_empty() {
        "None".to_string()
    } else {
        c.certifications.join(", ")
    };
    format!(
        "Candidate ID: {}\nName: {}\nSkills: {}\nExperience: {}\nExperience Level: {}\nEducation: {}\nCertifications: {}\nIndustry: {}",
        c.id,
        c.name,
        c.skills.join(", "),
        or_none(&c.experience),
        or_none(&c.experience_level),
        or_none(&c.education),
        certifications,
        or_none(&c.industry),
    )
}

fn or_none(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("None")
}

/// Accepts a bare array or an object holding the array, preferably under
/// `rankings`. Entries without a usable id and score are skipped.
fn parse_scores(reply: &JsonValue) -> Option<Vec<(i64, i32)>> {
    let items = match reply {
        JsonValue::Array(items) => items,
        JsonValue::Object(map) => match map.get("rankings").and_then(JsonValue::as_array) {
            Some(items) => items,
            None => map.values().find_map(JsonValue::as_array)?,
        },
        _ => return None,
    };

    Some(
        items
            .iter()
            .filter_map(|item| {
                let id = as_i64(item.get("id")?)?;
                let score = as_f64(item.get("score")?)?;
                Some((id, score.round().clamp(0.0, 100.0) as i32))
            })
            .collect(),
    )
}

fn as_i64(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &JsonValue) -> Option<f64> {
    let number = match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

fn join_scores(scores: Vec<(i64, i32)>, candidates: &[CandidateProfile]) -> Vec<RankedCandidate> {
    let by_id: HashMap<i64, &CandidateProfile> = candidates.iter().map(|c| (c.id, c)).collect();
    let mut seen = HashSet::new();

    scores
        .into_iter()
        .filter(|(id, _)| seen.insert(*id))
        .filter_map(|(id, score)| {
            by_id.get(&id).map(|c| RankedCandidate {
                candidate: (*c).clone(),
                score,
            })
        })
        .collect()
}
