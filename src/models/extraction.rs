use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

use crate::models::candidate::non_blank;

/// Fields recovered from a resume. Every field is optional because the reply
/// comes from a service this system does not control.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExtractionResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub experience: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub experience_level: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub education: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub certifications: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub industry: Option<String>,
    #[serde(default, deserialize_with = "lenient_age")]
    pub age: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ExtractionResult {
    pub fn from_contact(contact: ContactInfo) -> Self {
        Self {
            email: contact.email,
            phone: contact.phone,
            ..Default::default()
        }
    }

    /// Fills email and phone from the regex fallback where the model left
    /// them empty. Values the model did return are kept.
    pub fn with_contact_fallback(mut self, contact: &ContactInfo) -> Self {
        if self.email.is_none() {
            self.email = contact.email.clone();
        }
        if self.phone.is_none() {
            self.phone = contact.phone.clone();
        }
        self
    }
}

/// Reply from the upload endpoint, shown to a reviewer before saving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProcessedResume {
    #[serde(flatten)]
    pub extracted: ExtractionResult,
    pub resume_path: String,
    /// True when only the regex fallback produced data.
    pub partial: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(JsonValue::String(s)) => non_blank(Some(s)),
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        Some(JsonValue::Array(items)) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_to_string).collect();
            non_blank(Some(parts.join("; ")))
        }
        _ => None,
    })
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(JsonValue::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(JsonValue::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_age<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    let age = match value {
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(JsonValue::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(age
        .filter(|a| a.is_finite() && *a >= 0.0 && *a <= i32::MAX as f64)
        .map(|a| a.round() as i32))
}

fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => non_blank(Some(s.clone())),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
