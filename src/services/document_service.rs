use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::error::{Error, Result};

/// Where uploaded resumes live. Paths handed out by `save` are opaque to
/// callers and only ever passed back to `remove`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn save(&self, original_name: &str, data: &[u8]) -> Result<String>;

    /// Discards a stored document. A document that is already gone is not an
    /// error; a path this store never handed out is refused.
    async fn remove(&self, path: &str) -> Result<()>;
}

/// Accepts only `.pdf` names whose content starts with the PDF magic bytes.
pub fn validate_pdf_upload(original_name: &str, data: &[u8]) -> Result<()> {
    if original_name.trim().is_empty() {
        return Err(Error::BadRequest("No file selected".into()));
    }

    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if ext != "pdf" {
        return Err(Error::BadRequest("Only PDF files are allowed".into()));
    }

    if !data.starts_with(b"%PDF") {
        return Err(Error::BadRequest("Invalid PDF file content".into()));
    }
    Ok(())
}

/// Stores documents as files under one directory, each named with a fresh
/// uuid so uploads never overwrite each other.
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    dir: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn save(&self, original_name: &str, data: &[u8]) -> Result<String> {
        fs::create_dir_all(&self.dir).await?;

        let file_name = format!("{}_{}", uuid::Uuid::new_v4(), sanitize_file_name(original_name));
        let path = self.dir.join(file_name);
        fs::write(&path, data).await.map_err(|e| {
            tracing::error!(error = %e, path = %path.display(), "failed to write resume file");
            Error::Internal(format!("Failed to save file: {}", e))
        })?;

        Ok(path.to_string_lossy().into_owned())
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let Some(resolved) = self.resolve_stored(path).await? else {
            return Ok(());
        };
        match fs::remove_file(&resolved).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl LocalDocumentStore {
    /// Canonical form of `path` when it names a file directly inside the
    /// store directory. `None` when the file (or the directory) is gone.
    async fn resolve_stored(&self, path: &str) -> Result<Option<PathBuf>> {
        let dir = match canonical(&self.dir).await? {
            Some(dir) => dir,
            None => return Ok(None),
        };
        let resolved = match canonical(Path::new(path)).await? {
            Some(resolved) => resolved,
            None => return Ok(None),
        };

        if resolved.parent() != Some(dir.as_path()) {
            tracing::warn!(path, "refusing to remove a file outside the resume store");
            return Err(Error::BadRequest(
                "Document path is outside the document store".into(),
            ));
        }
        Ok(Some(resolved))
    }
}

async fn canonical(path: &Path) -> Result<Option<PathBuf>> {
    match fs::canonicalize(path).await {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Keeps the base name's ASCII alphanumerics, `-`, `_` and `.`; everything
/// else becomes `_`.
fn sanitize_file_name(original_name: &str) -> String {
    let base = Path::new(original_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("resume.pdf");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "resume.pdf".to_string()
    } else {
        cleaned.to_string()
    }
}
