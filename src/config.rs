use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Value shipped in sample secrets files; treated as "no key configured"
pub const PLACEHOLDER_API_KEY: &str = "your-gemini-api-key-here";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub llm: LLMConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Rows shown in table previews (CSV and Excel)
    pub preview_rows: usize,
    /// Characters of each file's text carried into the prompt
    pub prompt_preview_chars: usize,
    /// Optional hard cap on data rows read per table; `None` reads everything
    pub max_table_rows: Option<usize>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            preview_rows: 10,
            prompt_preview_chars: 2000,
            max_table_rows: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub api_key: Option<String>,
    pub chat_model: String,
    pub vision_model: String,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            chat_model: "gemini-3-flash-preview".to_string(),
            vision_model: "gemini-3-pro-preview".to_string(),
        }
    }
}

impl LLMConfig {
    /// Multimodal requests go to the vision model
    pub fn model_for(&self, has_images: bool) -> &str {
        if has_images {
            &self.vision_model
        } else {
            &self.chat_model
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();
        Ok(Self {
            extraction: ExtractionConfig {
                preview_rows: parse_var("PREVIEW_ROWS", defaults.extraction.preview_rows)?,
                prompt_preview_chars: parse_var(
                    "PROMPT_PREVIEW_CHARS",
                    defaults.extraction.prompt_preview_chars,
                )?,
                max_table_rows: match env::var("MAX_TABLE_ROWS") {
                    Ok(raw) => Some(
                        raw.trim()
                            .parse()
                            .with_context(|| format!("MAX_TABLE_ROWS is not a number: {raw}"))?,
                    ),
                    Err(_) => None,
                },
            },
            llm: LLMConfig {
                api_key: sanitize_api_key(env::var("API_KEY").ok())
                    .or_else(|| sanitize_api_key(env::var("GOOGLE_API_KEY").ok())),
                chat_model: env::var("CHAT_MODEL").unwrap_or(defaults.llm.chat_model),
                vision_model: env::var("VISION_MODEL").unwrap_or(defaults.llm.vision_model),
            },
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

/// Blank keys and the sample placeholder count as missing
pub fn sanitize_api_key(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && k != PLACEHOLDER_API_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.extraction.preview_rows, 10);
        assert_eq!(config.extraction.prompt_preview_chars, 2000);
        assert!(config.extraction.max_table_rows.is_none());
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_sanitize_api_key() {
        assert_eq!(sanitize_api_key(Some(" abc ".to_string())), Some("abc".to_string()));
        assert_eq!(sanitize_api_key(Some("   ".to_string())), None);
        assert_eq!(sanitize_api_key(Some(PLACEHOLDER_API_KEY.to_string())), None);
        assert_eq!(sanitize_api_key(None), None);
    }

    #[test]
    fn test_model_for() {
        let llm = LLMConfig::default();
        assert_eq!(llm.model_for(false), "gemini-3-flash-preview");
        assert_eq!(llm.model_for(true), "gemini-3-pro-preview");
    }
}
