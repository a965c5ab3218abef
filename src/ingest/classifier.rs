//! Maps declared MIME types (and, failing that, file extensions) to the
//! format family that knows how to extract them.

use std::path::Path;

use crate::types::FormatKind;

pub const WORD_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const XLS_MIME: &str = "application/vnd.ms-excel";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Registry of explicitly supported types and their descriptions.
/// Image subtypes not listed here are still accepted through the `image/` class.
const SUPPORTED_TYPES: &[(&str, &str)] = &[
    ("text/plain", "Text files (.txt)"),
    ("application/pdf", "PDF documents (.pdf)"),
    (WORD_MIME, "Word documents (.docx)"),
    (XLS_MIME, "Excel files (.xls)"),
    (XLSX_MIME, "Excel files (.xlsx)"),
    ("text/csv", "CSV files (.csv)"),
    ("application/json", "JSON files (.json)"),
    ("image/jpeg", "JPEG images (.jpg, .jpeg)"),
    ("image/png", "PNG images (.png)"),
    ("image/gif", "GIF images (.gif)"),
    ("image/bmp", "BMP images (.bmp)"),
    ("image/webp", "WebP images (.webp)"),
];

const EXTENSION_TYPES: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("pdf", "application/pdf"),
    ("docx", WORD_MIME),
    ("xls", XLS_MIME),
    ("xlsx", XLSX_MIME),
    ("csv", "text/csv"),
    ("json", "application/json"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Supported(FormatKind),
    /// Carries the declared type as given, for the error message
    Unsupported(String),
}

/// Classify a declared MIME type. Parameters such as `; charset=utf-8` and
/// letter case are ignored.
pub fn classify(declared_type: &str) -> Classification {
    let essence = normalize(declared_type);
    let kind = match essence.as_str() {
        "text/plain" => Some(FormatKind::Text),
        "application/pdf" => Some(FormatKind::Pdf),
        WORD_MIME => Some(FormatKind::Word),
        XLS_MIME | XLSX_MIME => Some(FormatKind::Excel),
        "text/csv" => Some(FormatKind::Csv),
        "application/json" => Some(FormatKind::Json),
        other if other.starts_with("image/") => Some(FormatKind::Image),
        _ => None,
    };

    match kind {
        Some(kind) => Classification::Supported(kind),
        None => Classification::Unsupported(declared_type.to_string()),
    }
}

/// The type a file is processed under. A specific declared type always wins;
/// an empty or generic `application/octet-stream` falls back to the extension.
pub fn resolve_type(name: &str, declared_type: &str) -> String {
    let essence = normalize(declared_type);
    if !essence.is_empty() && essence != mime::APPLICATION_OCTET_STREAM.essence_str() {
        return essence;
    }

    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .and_then(|ext| {
            EXTENSION_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, mime)| mime.to_string())
        })
        .unwrap_or_else(|| declared_type.to_string())
}

/// Resolve the effective type of a named upload and classify it.
pub fn classify_file(name: &str, declared_type: &str) -> (String, Classification) {
    let resolved = resolve_type(name, declared_type);
    let classification = match classify(&resolved) {
        Classification::Unsupported(_) => Classification::Unsupported(declared_type.to_string()),
        supported => supported,
    };
    (resolved, classification)
}

pub fn supported_file_types() -> &'static [(&'static str, &'static str)] {
    SUPPORTED_TYPES
}

pub fn is_supported_file_type(declared_type: &str) -> bool {
    matches!(classify(declared_type), Classification::Supported(_))
}

/// Human readable description of a supported type
pub fn describe(declared_type: &str) -> Option<&'static str> {
    let essence = normalize(declared_type);
    SUPPORTED_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, description)| *description)
        .or_else(|| essence.starts_with("image/").then_some("Image files"))
}

fn normalize(declared_type: &str) -> String {
    match declared_type.trim().parse::<mime::Mime>() {
        Ok(parsed) => parsed.essence_str().to_ascii_lowercase(),
        Err(_) => declared_type.trim().to_ascii_lowercase(),
    }
}
