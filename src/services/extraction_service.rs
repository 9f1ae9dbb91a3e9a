use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::models::extraction::ExtractionResult;
use crate::services::llm_service::{ChatBackend, ChatRequest};

const EXTRACTION_PROMPT: &str = r#"You are an expert HR recruiter assistant specialized in analyzing CVs/resumes.
Extract the following information from the provided resume text:

1. Full Name
2. Email address
3. Phone number
4. Skills (as a list)
5. Work experience and determine level (Junior, Mid, Senior)
6. Education details
7. Professional certifications (especially note CA, CIMA, or CFA)
8. Main industry experience
9. Approximate age (if provided or can be inferred from graduation dates)

Format your response ONLY as a single JSON object with exactly this structure:
{
    "name": "Full Name",
    "email": "email@example.com",
    "phone": "Phone number",
    "skills": ["Skill 1", "Skill 2", "Skill 3"],
    "experience": "Summary of experience",
    "experience_level": "Junior/Mid/Senior",
    "education": "Education details",
    "certifications": ["Certification 1", "Certification 2"],
    "industry": "Main industry",
    "age": null or approximate age as integer
}

Make your best inference if information is not explicitly stated.
For certifications, look specifically for accounting/finance qualifications like CA, CIMA, or CFA.
Include only the JSON in your response, no additional text."#;

const EXTRACTION_TEMPERATURE: f32 = 0.2;

/// Turns normalized resume text into structured candidate fields with a
/// single model call.
#[derive(Clone)]
pub struct ExtractionService {
    llm: Arc<dyn ChatBackend>,
}

impl ExtractionService {
    pub fn new(llm: Arc<dyn ChatBackend>) -> Self {
        Self { llm }
    }

    /// Returns `None` for blank input (without calling the model), for a
    /// failed call, and for a reply that is not a JSON object. Never retries.
    pub async fn extract(&self, resume_text: &str) -> Option<ExtractionResult> {
        if resume_text.trim().is_empty() {
            return None;
        }

        let request = ChatRequest {
            system: EXTRACTION_PROMPT.to_string(),
            user: resume_text.to_string(),
            temperature: EXTRACTION_TEMPERATURE,
        };

        let reply = match self.llm.complete_json(request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %e, "structured extraction call failed");
                return None;
            }
        };

        parse_extraction(reply)
    }
}

fn parse_extraction(reply: JsonValue) -> Option<ExtractionResult> {
    if !reply.is_object() {
        tracing::warn!("structured extraction reply is not a JSON object");
        return None;
    }
    match serde_json::from_value(reply) {
        Ok(result) => Some(result),
        Err(e) => {
            tracing::warn!(error = %e, "structured extraction reply has an unexpected shape");
            None
        }
    }
}
