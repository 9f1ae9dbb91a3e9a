use std::sync::Arc;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::models::extraction::{ExtractionResult, ProcessedResume};
use crate::services::document_service::{validate_pdf_upload, DocumentStore};
use crate::services::extraction_service::ExtractionService;
use crate::services::pdf_service::{extract_pdf_text_blocking, ExtractionError};
use crate::utils::text::{extract_contact_info, normalize_text};

pub const PARTIAL_WARNING: &str = "Partial processing only. Structured extraction failed.";

/// Turns an uploaded resume into a reviewable profile. Nothing is written to
/// the candidate store here; the stored document survives only when text
/// could be extracted.
#[derive(Clone)]
pub struct IntakeService {
    documents: Arc<dyn DocumentStore>,
    extraction: ExtractionService,
}

impl IntakeService {
    pub fn new(documents: Arc<dyn DocumentStore>, extraction: ExtractionService) -> Self {
        Self {
            documents,
            extraction,
        }
    }

    pub async fn process(&self, original_name: &str, data: Bytes) -> Result<ProcessedResume> {
        validate_pdf_upload(original_name, &data)?;
        let resume_path = self.documents.save(original_name, &data).await?;

        let raw_text = match extract_pdf_text_blocking(data).await {
            Ok(text) if text.trim().is_empty() => {
                self.discard(&resume_path).await;
                return Err(ExtractionError::NoText.into());
            }
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "resume text extraction failed");
                self.discard(&resume_path).await;
                return Err(Error::Extraction(e));
            }
        };

        let text = normalize_text(&raw_text);
        tracing::debug!(chars = text.len(), "normalized resume text");
        let contact = extract_contact_info(&text);

        let processed = match self.extraction.extract(&text).await {
            Some(extracted) => ProcessedResume {
                extracted: extracted.with_contact_fallback(&contact),
                resume_path,
                partial: false,
                warning: None,
            },
            None => ProcessedResume {
                extracted: ExtractionResult::from_contact(contact),
                resume_path,
                partial: true,
                warning: Some(PARTIAL_WARNING.to_string()),
            },
        };
        Ok(processed)
    }

    async fn discard(&self, path: &str) {
        if let Err(e) = self.documents.remove(path).await {
            tracing::warn!(path, error = %e, "failed to remove rejected resume");
        }
    }
}
