// Chatbot Hub - file ingestion and prompt assembly for a multimodal chat assistant

pub mod config;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use ingest::{process_all, process_uploaded_file, Ingestor};
pub use models::{ExtractionRecord, FileDetails, UploadedFile};
pub use prompt::{assemble, AssembledPrompt, PromptAssembler};
