//! Upload extraction: turns an uploaded résumé file into a candidate
//! document for the session's upload view.

pub mod prompts;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::{LlmClient, LlmError};
use crate::schema::json_schema_text;
use crate::validation::{validate_candidate, FieldError};

const PDF_MIME: &str = "application/pdf";
const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn is_pdf(&self) -> bool {
        self.content_type.as_deref() == Some(PDF_MIME) || self.bytes.starts_with(PDF_MAGIC)
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Only PDF files are allowed")]
    UnsupportedFormat,

    #[error("The uploaded file is empty")]
    Empty,

    #[error("The uploaded file is {size} bytes; the limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("Could not read text from the PDF: {0}")]
    Unreadable(String),

    #[error("The PDF contains no extractable text")]
    NoText,

    #[error("Extraction service failed: {0}")]
    Service(#[from] LlmError),

    #[error("Failed to parse resume data correctly")]
    SchemaMismatch(Vec<FieldError>),
}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// A schema-valid candidate extracted from `file`.
    async fn extract(&self, file: UploadedFile) -> Result<Value, ExtractionError>;
}

pub fn check_upload(file: &UploadedFile, max_bytes: usize) -> Result<(), ExtractionError> {
    if file.bytes.is_empty() {
        return Err(ExtractionError::Empty);
    }
    if file.bytes.len() > max_bytes {
        return Err(ExtractionError::TooLarge {
            size: file.bytes.len(),
            limit: max_bytes,
        });
    }
    if !file.is_pdf() {
        return Err(ExtractionError::UnsupportedFormat);
    }
    Ok(())
}

/// Drops `null`s the model emits for unknown fields, then validates.
pub fn finish_candidate(mut candidate: Value) -> Result<Value, ExtractionError> {
    prune_nulls(&mut candidate);
    let validation = validate_candidate(&candidate);
    if !validation.is_valid() {
        warn!(
            "Extracted resume failed validation with {} error(s)",
            validation.errors().len()
        );
        return Err(ExtractionError::SchemaMismatch(validation.errors().to_vec()));
    }
    Ok(candidate)
}

fn prune_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(prune_nulls);
        }
        Value::Array(items) => {
            items.retain(|v| !v.is_null());
            items.iter_mut().for_each(prune_nulls);
        }
        _ => {}
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PDF extractor
// ────────────────────────────────────────────────────────────────────────────

pub struct PdfResumeExtractor {
    llm: LlmClient,
    max_bytes: usize,
}

impl PdfResumeExtractor {
    pub fn new(llm: LlmClient, max_bytes: usize) -> Self {
        Self { llm, max_bytes }
    }
}

#[async_trait]
impl DocumentExtractor for PdfResumeExtractor {
    async fn extract(&self, file: UploadedFile) -> Result<Value, ExtractionError> {
        check_upload(&file, self.max_bytes)?;
        let name = file.file_name.clone().unwrap_or_else(|| "upload.pdf".into());

        let bytes = file.bytes;
        let text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| ExtractionError::Unreadable(e.to_string()))?
        .map_err(ExtractionError::Unreadable)?;
        if text.trim().is_empty() {
            return Err(ExtractionError::NoText);
        }
        info!("Extracted {} chars of text from {name}", text.len());

        let prompt = prompts::build_extract_prompt(json_schema_text(), &text);
        let candidate: Value = self.llm.call_json(&prompt, prompts::EXTRACT_SYSTEM).await?;
        finish_candidate(candidate)
    }
}

/// Fixed-output extractor for handler tests.
#[cfg(test)]
pub struct StaticExtractor {
    pub candidate: Value,
    pub max_bytes: usize,
}

#[cfg(test)]
#[async_trait]
impl DocumentExtractor for StaticExtractor {
    async fn extract(&self, file: UploadedFile) -> Result<Value, ExtractionError> {
        check_upload(&file, self.max_bytes)?;
        finish_candidate(self.candidate.clone())
    }
}
