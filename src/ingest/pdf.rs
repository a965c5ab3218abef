use std::fmt::Write as _;

use lopdf::Document;
use tracing::{debug, warn};

use super::FormatExtractor;
use crate::models::UploadedFile;
use crate::types::{ExtractError, ExtractionResult, FormatKind};

/// Page-by-page PDF text extraction. Blank pages are skipped.
pub struct PdfExtractor;

impl FormatExtractor for PdfExtractor {
    fn kind(&self) -> FormatKind {
        FormatKind::Pdf
    }

    fn try_extract(&self, file: &UploadedFile) -> Result<ExtractionResult, ExtractError> {
        let document =
            Document::load_mem(&file.bytes).map_err(|e| ExtractError::decode(FormatKind::Pdf, e))?;

        let pages = document.get_pages();
        debug!(file = %file.name, pages = pages.len(), "Extracting PDF text");

        let mut content = String::new();
        for page_num in pages.keys() {
            let page_text = match document.extract_text(&[*page_num]) {
                Ok(text) => text,
                Err(e) => {
                    warn!(file = %file.name, page = *page_num, error = %e, "Skipping unreadable PDF page");
                    continue;
                }
            };
            if page_text.trim().is_empty() {
                continue;
            }
            let _ = write!(content, "--- Page {page_num} ---\n{page_text}\n\n");
        }

        if content.trim().is_empty() {
            return Err(ExtractError::EmptyContent { kind: FormatKind::Pdf });
        }
        Ok(ExtractionResult::Text(content))
    }
}
