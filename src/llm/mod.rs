// Chat boundary: one question-plus-files turn against an external endpoint

pub mod provider;

pub use provider::*;

use tracing::info;

use crate::config::Config;
use crate::ingest::Ingestor;
use crate::models::{ExtractionRecord, UploadedFile};
use crate::prompt::PromptAssembler;
use crate::types::{AppError, AppResult, LLMMessage};

/// A completed turn: what was sent, what came back, what was extracted.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub user: LLMMessage,
    pub reply: LLMMessage,
    pub records: Vec<ExtractionRecord>,
}

/// Ingest `files`, assemble the prompt and send it after `history`.
///
/// Extraction runs on the blocking pool since the parsers are CPU-bound.
pub async fn ask(
    backend: &dyn ChatBackend,
    config: &Config,
    history: &[LLMMessage],
    question: &str,
    files: Vec<UploadedFile>,
) -> AppResult<ChatTurn> {
    let ingestor = Ingestor::new(config.extraction.clone());
    let records = tokio::task::spawn_blocking(move || ingestor.process_all(&files))
        .await
        .map_err(|e| AppError::Internal(format!("ingestion task failed: {e}")))?;

    let prompt = PromptAssembler::new(config.extraction.prompt_preview_chars).assemble(question, &records);
    let model = config.llm.model_for(prompt.has_images()).to_string();
    info!(
        model = %model,
        files = records.len(),
        images = prompt.images.len(),
        "Sending chat turn"
    );

    let user = prompt.into_message()?;
    let mut messages = history.to_vec();
    messages.push(user.clone());

    let reply = backend.send(&model, &messages).await?;
    Ok(ChatTurn {
        user,
        reply: LLMMessage::assistant(reply),
        records,
    })
}
