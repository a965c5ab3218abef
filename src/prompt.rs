//! Prompt Assembly
//!
//! Folds extraction records and the user's question into one prompt.
//! Text content is inlined (truncated); decoded images travel separately.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{ColorType, DynamicImage, ImageFormat};

use crate::models::ExtractionRecord;
use crate::types::{AppError, AppResult, ContentPart, ExtractionResult, LLMMessage, MessageContent};

pub const DEFAULT_PREVIEW_CHARS: usize = 2000;

const CLOSING_INSTRUCTION: &str =
    "Please analyze the uploaded files in the context of the user's question.";

/// Prompt text plus the images to submit alongside it, in record order.
#[derive(Debug, Clone)]
pub struct AssembledPrompt {
    pub text: String,
    pub images: Vec<DynamicImage>,
}

pub struct PromptAssembler {
    preview_chars: usize,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_CHARS)
    }
}

impl PromptAssembler {
    pub fn new(preview_chars: usize) -> Self {
        Self { preview_chars }
    }

    pub fn assemble(&self, question: &str, records: &[ExtractionRecord]) -> AssembledPrompt {
        if records.is_empty() {
            return AssembledPrompt {
                text: question.to_string(),
                images: Vec::new(),
            };
        }

        let mut context = String::from("\n\n📁 **Uploaded Files Context:**\n");
        let mut images = Vec::new();
        for record in records {
            match &record.content {
                ExtractionResult::Image(image) => {
                    let _ = writeln!(context, "\n**Image File: {}** (Image analysis available)", record.name);
                    images.push(image.image.clone());
                }
                // An image upload that failed to decode: keep the note visible
                ExtractionResult::Text(note) if record.is_image() => {
                    let _ = writeln!(context, "\n**Image File: {}** (Image could not be decoded)", record.name);
                    let _ = writeln!(context, "Content: {}", truncate_preview(note, self.preview_chars));
                }
                ExtractionResult::Text(text) => {
                    let _ = writeln!(context, "\n**File: {}**", record.name);
                    let _ = writeln!(context, "Content: {}", truncate_preview(text, self.preview_chars));
                }
            }
        }

        AssembledPrompt {
            text: format!("User question: {question}\n{context}\n\n{CLOSING_INSTRUCTION}"),
            images,
        }
    }
}

/// Assemble with the default preview length.
pub fn assemble(question: &str, records: &[ExtractionRecord]) -> AssembledPrompt {
    PromptAssembler::default().assemble(question, records)
}

/// First `limit` characters, with "..." appended only when something was cut
pub fn truncate_preview(content: &str, limit: usize) -> Cow<'_, str> {
    match content.char_indices().nth(limit) {
        Some((byte_idx, _)) => Cow::Owned(format!("{}...", &content[..byte_idx])),
        None => Cow::Borrowed(content),
    }
}

impl AssembledPrompt {
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    /// User message for the chat endpoint: plain text, or text followed by
    /// one base64 PNG part per image.
    pub fn into_message(self) -> AppResult<LLMMessage> {
        if self.images.is_empty() {
            return Ok(LLMMessage::user(self.text));
        }

        let mut parts = vec![ContentPart::Text { text: self.text }];
        for image in &self.images {
            parts.push(ContentPart::ImageBase64 {
                base64: BASE64.encode(encode_png(image)?),
                media_type: mime::IMAGE_PNG.to_string(),
            });
        }
        Ok(LLMMessage::with_content("user", MessageContent::Multimodal(parts)))
    }
}

fn encode_png(image: &DynamicImage) -> AppResult<Vec<u8>> {
    // PNG has no float channels
    let image: Cow<'_, DynamicImage> = match image.color() {
        ColorType::Rgb32F | ColorType::Rgba32F => Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8())),
        _ => Cow::Borrowed(image),
    };
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| AppError::Encoding(e.to_string()))?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UploadedFile;
    use crate::types::ImageContent;
    use std::collections::BTreeMap;

    fn text_record(name: &str, content: &str) -> ExtractionRecord {
        let file = UploadedFile::new(name, "text/plain", content.as_bytes().to_vec());
        ExtractionRecord::new(&file, "text/plain", content.to_string().into(), None)
    }

    fn image_record(name: &str) -> ExtractionRecord {
        let file = UploadedFile::new(name, "image/png", vec![]);
        let image = DynamicImage::new_rgb8(2, 2);
        let content = ExtractionResult::Image(ImageContent {
            image,
            width: 2,
            height: 2,
            format: "PNG".to_string(),
            color_mode: "RGB".to_string(),
            metadata: BTreeMap::new(),
            caption: String::new(),
        });
        ExtractionRecord::new(&file, "image/png", content, None)
    }

    #[test]
    fn test_no_records_returns_question() {
        let prompt = assemble("What is this?", &[]);
        assert_eq!(prompt.text, "What is this?");
        assert!(prompt.images.is_empty());
    }

    #[test]
    fn test_text_and_image_records() {
        let records = vec![text_record("a.txt", "alpha"), image_record("b.png"), image_record("c.png")];
        let prompt = assemble("Compare them", &records);

        assert!(prompt.text.starts_with("User question: Compare them\n"));
        assert!(prompt.text.contains("**File: a.txt**\nContent: alpha\n"));
        assert!(prompt.text.contains("**Image File: b.png** (Image analysis available)"));
        assert!(prompt.text.ends_with(CLOSING_INSTRUCTION));
        assert_eq!(prompt.images.len(), 2);
    }

    #[test]
    fn test_exact_layout() {
        let prompt = assemble("Why?", &[text_record("a.txt", "alpha")]);
        assert_eq!(
            prompt.text,
            "User question: Why?\n\n\n📁 **Uploaded Files Context:**\n\n**File: a.txt**\nContent: alpha\n\n\n\
             Please analyze the uploaded files in the context of the user's question."
        );
    }

    #[test]
    fn test_truncation_law() {
        let exact = "x".repeat(2000);
        assert_eq!(truncate_preview(&exact, 2000), exact.as_str());

        let long = "y".repeat(2001);
        let cut = truncate_preview(&long, 2000);
        assert_eq!(cut.len(), 2003);
        assert!(cut.ends_with("y..."));

        let prompt = assemble("q", &[text_record("long.txt", &long)]);
        assert!(prompt.text.contains(&format!("Content: {}...\n", "y".repeat(2000))));
    }

    #[test]
    fn test_truncation_counts_characters() {
        let text = "é".repeat(5);
        assert_eq!(truncate_preview(&text, 3), "ééé...");
        assert_eq!(truncate_preview(&text, 5), text.as_str());
    }

    #[test]
    fn test_failed_image_keeps_note() {
        let file = UploadedFile::new("bad.png", "image/png", vec![1]);
        let record = ExtractionRecord::new(&file, "image/png", "Error processing image file: nope".to_string().into(), None);
        let prompt = assemble("q", &[record]);
        assert!(prompt.text.contains("Content: Error processing image file: nope"));
        assert!(prompt.images.is_empty());
    }

    #[test]
    fn test_into_message() {
        let text_only = assemble("q", &[text_record("a.txt", "alpha")]).into_message().unwrap();
        assert!(!text_only.content.has_images());

        let with_image = assemble("q", &[image_record("b.png")]).into_message().unwrap();
        assert_eq!(with_image.role, "user");
        assert!(with_image.content.has_images());
        assert!(with_image.content.as_text().unwrap().starts_with("User question: q"));
    }
}
