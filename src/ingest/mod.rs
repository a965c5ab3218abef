//! File Ingestion
//!
//! Turns uploaded files into extraction records for prompt assembly:
//!
//! ```text
//! UploadedFile ──► classifier ──► FormatExtractor ──► ExtractionRecord
//!                  (MIME / ext)    (text, pdf, word,
//!                                   excel, csv, json,
//!                                   image)
//! ```
//!
//! Failures never escape a single file: an extractor error becomes the
//! record's text content and the batch carries on.

pub mod classifier;
pub mod csv;
pub mod excel;
pub mod image;
pub mod json;
pub mod pdf;
pub mod tabular;
pub mod text;
pub mod word;

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{info, warn};

pub use classifier::{classify, classify_file, Classification};

use crate::config::ExtractionConfig;
use crate::models::{ExtractionRecord, FileDetails, UploadedFile};
use crate::types::{ExtractError, ExtractionResult, FormatKind};

/// Outcome of running one extractor: content is always present.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub content: ExtractionResult,
    pub error: Option<ExtractError>,
}

impl From<ExtractError> for Extraction {
    fn from(error: ExtractError) -> Self {
        Self {
            content: ExtractionResult::Text(error.to_string()),
            error: Some(error),
        }
    }
}

/// One implementation per `FormatKind`.
pub trait FormatExtractor: Send + Sync {
    fn kind(&self) -> FormatKind;

    fn try_extract(&self, file: &UploadedFile) -> Result<ExtractionResult, ExtractError>;

    /// Never fails: errors are folded into the textual content.
    fn extract(&self, file: &UploadedFile) -> Extraction {
        match self.try_extract(file) {
            Ok(content) => Extraction { content, error: None },
            Err(error) => {
                warn!(file = %file.name, kind = %self.kind(), error = %error, "Extraction failed");
                error.into()
            }
        }
    }
}

/// Runs the classify → extract → record pipeline over upload batches.
#[derive(Debug, Clone, Default)]
pub struct Ingestor {
    config: ExtractionConfig,
}

impl Ingestor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn extractor_for(&self, kind: FormatKind) -> Box<dyn FormatExtractor> {
        match kind {
            FormatKind::Text => Box::new(text::TextExtractor),
            FormatKind::Pdf => Box::new(pdf::PdfExtractor),
            FormatKind::Word => Box::new(word::WordExtractor),
            FormatKind::Excel => Box::new(excel::ExcelExtractor {
                preview_rows: self.config.preview_rows,
                max_rows: self.config.max_table_rows,
            }),
            FormatKind::Csv => Box::new(csv::CsvExtractor {
                preview_rows: self.config.preview_rows,
                max_rows: self.config.max_table_rows,
            }),
            FormatKind::Json => Box::new(json::JsonExtractor),
            FormatKind::Image => Box::new(image::ImageExtractor),
        }
    }

    /// Process one file into exactly one record.
    pub fn process_file(&self, file: &UploadedFile) -> ExtractionRecord {
        let (mime_type, classification) = classify_file(&file.name, &file.declared_type);

        let extraction = match classification {
            Classification::Supported(kind) => extract_contained(self.extractor_for(kind).as_ref(), file),
            Classification::Unsupported(declared) => ExtractError::UnsupportedType(declared).into(),
        };

        info!(
            file = %file.name,
            mime_type = %mime_type,
            size = file.size,
            ok = extraction.error.is_none(),
            "Processed upload"
        );
        ExtractionRecord::new(file, mime_type, extraction.content, extraction.error)
    }

    /// One record per input file, in input order.
    pub fn process_all(&self, files: &[UploadedFile]) -> Vec<ExtractionRecord> {
        files.iter().map(|file| self.process_file(file)).collect()
    }
}

/// Run one extractor with panics turned into `ExtractError::Internal`.
///
/// Parsers of untrusted input may panic; that stays inside this file's record.
pub fn extract_contained(extractor: &dyn FormatExtractor, file: &UploadedFile) -> Extraction {
    catch_unwind(AssertUnwindSafe(|| extractor.extract(file))).unwrap_or_else(|panic| {
        let cause = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "extractor panicked".to_string());
        warn!(file = %file.name, kind = %extractor.kind(), cause = %cause, "Extractor panicked");
        ExtractError::Internal(cause).into()
    })
}

/// Process a batch with default settings.
pub fn process_all(files: &[UploadedFile]) -> Vec<ExtractionRecord> {
    Ingestor::default().process_all(files)
}

/// Single-file entry point returning the content and the echoed metadata.
pub fn process_uploaded_file(file: &UploadedFile) -> (ExtractionResult, FileDetails) {
    let record = Ingestor::default().process_file(file);
    (record.content, record.details)
}
