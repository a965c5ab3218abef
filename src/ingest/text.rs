use super::FormatExtractor;
use crate::models::UploadedFile;
use crate::types::{ExtractError, ExtractionResult, FormatKind};

/// Plain UTF-8 text, passed through verbatim.
pub struct TextExtractor;

impl FormatExtractor for TextExtractor {
    fn kind(&self) -> FormatKind {
        FormatKind::Text
    }

    fn try_extract(&self, file: &UploadedFile) -> Result<ExtractionResult, ExtractError> {
        let text = std::str::from_utf8(&file.bytes)
            .map_err(|e| ExtractError::decode(FormatKind::Text, e))?;
        Ok(ExtractionResult::Text(text.to_string()))
    }
}
