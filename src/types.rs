// Type definitions and enums

use std::collections::BTreeMap;

use image::DynamicImage;
use serde::{Serialize, Serializer};

/// Format families the ingestion pipeline knows how to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Text,
    Pdf,
    Word,
    Excel,
    Csv,
    Json,
    Image,
}

impl FormatKind {
    /// Label used in user-facing processing messages
    pub fn label(&self) -> &'static str {
        match self {
            FormatKind::Text => "text",
            FormatKind::Pdf => "PDF",
            FormatKind::Word => "Word",
            FormatKind::Excel => "Excel",
            FormatKind::Csv => "CSV",
            FormatKind::Json => "JSON",
            FormatKind::Image => "image",
        }
    }

    /// Message used when a document parses but carries no text
    pub fn empty_message(&self) -> String {
        match self {
            FormatKind::Pdf => "No readable text found in the PDF file.".to_string(),
            FormatKind::Word => "No readable content found in the Word document.".to_string(),
            other => format!("No readable content found in the {} file.", other.label()),
        }
    }
}

impl std::fmt::Display for FormatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatKind::Text => write!(f, "text"),
            FormatKind::Pdf => write!(f, "pdf"),
            FormatKind::Word => write!(f, "word"),
            FormatKind::Excel => write!(f, "excel"),
            FormatKind::Csv => write!(f, "csv"),
            FormatKind::Json => write!(f, "json"),
            FormatKind::Image => write!(f, "image"),
        }
    }
}

/// A decoded image together with the description sent alongside it.
#[derive(Debug, Clone)]
pub struct ImageContent {
    pub image: DynamicImage,
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub color_mode: String,
    /// Embedded metadata found while decoding (e.g. ICC profile)
    pub metadata: BTreeMap<String, String>,
    pub caption: String,
}

/// Output of a single extractor: either text or a decoded image, never both.
#[derive(Debug, Clone)]
pub enum ExtractionResult {
    Text(String),
    Image(ImageContent),
}

impl ExtractionResult {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExtractionResult::Text(text) => Some(text),
            ExtractionResult::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageContent> {
        match self {
            ExtractionResult::Text(_) => None,
            ExtractionResult::Image(image) => Some(image),
        }
    }

    /// Text for display: the content itself, or the caption of an image
    pub fn describe(&self) -> &str {
        match self {
            ExtractionResult::Text(text) => text,
            ExtractionResult::Image(image) => &image.caption,
        }
    }
}

impl From<String> for ExtractionResult {
    fn from(s: String) -> Self {
        ExtractionResult::Text(s)
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ExtractionResultView<'a> {
    Text {
        text: &'a str,
    },
    Image {
        width: u32,
        height: u32,
        format: &'a str,
        color_mode: &'a str,
        metadata: &'a BTreeMap<String, String>,
        caption: &'a str,
    },
}

// Pixel data is not serialized; images are reported by their description.
impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let view = match self {
            ExtractionResult::Text(text) => ExtractionResultView::Text { text },
            ExtractionResult::Image(image) => ExtractionResultView::Image {
                width: image.width,
                height: image.height,
                format: &image.format,
                color_mode: &image.color_mode,
                metadata: &image.metadata,
                caption: &image.caption,
            },
        };
        view.serialize(serializer)
    }
}

/// Per-file failure. Its `Display` text is what ends up in the record content.
#[derive(Debug, Clone, PartialEq, thiserror::Error, serde::Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Error processing {} file: {cause}", .kind.label())]
    Decode { kind: FormatKind, cause: String },

    #[error("Invalid JSON format: {0}")]
    MalformedJson(String),

    #[error("{}", .kind.empty_message())]
    EmptyContent { kind: FormatKind },

    #[error("Error processing file: {0}")]
    Internal(String),
}

impl ExtractError {
    pub fn decode(kind: FormatKind, cause: impl std::fmt::Display) -> Self {
        ExtractError::Decode {
            kind,
            cause: cause.to_string(),
        }
    }
}

/// Content part for multimodal messages (text, images)
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_base64")]
    ImageBase64 {
        base64: String,
        media_type: String, // e.g., "image/png"
    },
}

/// Message content - can be simple text or multimodal (text + images)
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Multimodal(Vec<ContentPart>),
}

impl MessageContent {
    /// Get the text content (for simple text or first text part in multimodal)
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(s) => Some(s),
            MessageContent::Multimodal(parts) => parts.iter().find_map(|p| match p {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            }),
        }
    }

    /// Check if this content contains images
    pub fn has_images(&self) -> bool {
        match self {
            MessageContent::Text(_) => false,
            MessageContent::Multimodal(parts) => parts
                .iter()
                .any(|p| matches!(p, ContentPart::ImageBase64 { .. })),
        }
    }
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        MessageContent::Text(s)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMMessage {
    pub role: String, // "user", "assistant", "system"
    pub content: MessageContent,
}

impl LLMMessage {
    /// Create a new message with text content
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a new message with multimodal content
    pub fn with_content(role: impl Into<String>, content: MessageContent) -> Self {
        Self {
            role: role.into(),
            content,
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chat error: {0}")]
    Chat(#[from] crate::llm::ChatError),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ExtractError::UnsupportedType("application/zip".to_string()).to_string(),
            "Unsupported file type: application/zip"
        );
        assert_eq!(
            ExtractError::decode(FormatKind::Pdf, "bad xref").to_string(),
            "Error processing PDF file: bad xref"
        );
        assert_eq!(
            ExtractError::MalformedJson("EOF while parsing".to_string()).to_string(),
            "Invalid JSON format: EOF while parsing"
        );
        assert_eq!(
            ExtractError::EmptyContent { kind: FormatKind::Word }.to_string(),
            "No readable content found in the Word document."
        );
    }

    #[test]
    fn test_text_result_serializes_with_tag() {
        let value = serde_json::to_value(ExtractionResult::Text("hi".to_string())).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["text"], "hi");
    }

    #[test]
    fn test_message_content_helpers() {
        let content = MessageContent::Multimodal(vec![
            ContentPart::Text { text: "describe".to_string() },
            ContentPart::ImageBase64 {
                base64: "AAAA".to_string(),
                media_type: "image/png".to_string(),
            },
        ]);
        assert_eq!(content.as_text(), Some("describe"));
        assert!(content.has_images());
        assert!(!MessageContent::from("plain".to_string()).has_images());
    }
}
