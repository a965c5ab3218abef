use std::path::Path;

use crate::types::{AppResult, ExtractError, ExtractionResult};

/// A file handed over by the front-end, with its content already in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub declared_type: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// Read a local file once, declaring its MIME type from the extension
    pub async fn from_path(path: &Path) -> AppResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let declared_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self::new(name, declared_type, bytes))
    }

    pub fn details(&self) -> FileDetails {
        FileDetails {
            filename: self.name.clone(),
            filetype: self.declared_type.clone(),
            filesize: self.size,
        }
    }
}

/// Metadata echoed next to every extraction, successful or not
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileDetails {
    pub filename: String,
    pub filetype: String,
    pub filesize: u64,
}

/// One processed upload, ready for prompt assembly.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExtractionRecord {
    pub name: String,
    pub content: ExtractionResult,
    pub mime_type: String,
    is_image: bool,
    pub details: FileDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ExtractError>,
}

impl ExtractionRecord {
    /// `mime_type` is the resolved type the file was classified under;
    /// `is_image` is derived from it here and nowhere else.
    pub fn new(
        file: &UploadedFile,
        mime_type: impl Into<String>,
        content: ExtractionResult,
        error: Option<ExtractError>,
    ) -> Self {
        let mime_type = mime_type.into();
        Self {
            name: file.name.clone(),
            is_image: mime_type.starts_with("image/"),
            mime_type,
            content,
            details: file.details(),
            error,
        }
    }

    pub fn is_image(&self) -> bool {
        self.is_image
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
