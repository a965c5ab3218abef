use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use chatbot_hub::{
    config::Config, prompt::PromptAssembler, utils::{format_file_size, init_logger}, Ingestor,
    UploadedFile,
};

/// Extract the content of local files and print the prompt a chat model would receive.
#[derive(Debug, Parser)]
#[command(name = "chatbot-hub", version)]
struct Cli {
    /// File to attach (repeatable)
    #[arg(short, long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,

    /// Print the extraction records as JSON instead of the prompt
    #[arg(long)]
    records: bool,

    /// The user's question
    question: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    info!(
        preview_rows = config.extraction.preview_rows,
        prompt_preview_chars = config.extraction.prompt_preview_chars,
        "Configuration loaded"
    );

    let mut files = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let file = UploadedFile::from_path(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        eprintln!("Attached {} ({}, {})", file.name, file.declared_type, format_file_size(file.size));
        files.push(file);
    }

    let ingestor = Ingestor::new(config.extraction.clone());
    let records = tokio::task::spawn_blocking(move || ingestor.process_all(&files)).await?;

    if cli.records {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let prompt = PromptAssembler::new(config.extraction.prompt_preview_chars).assemble(&cli.question, &records);
    println!("{}", prompt.text);
    eprintln!(
        "{} image(s) attached; model: {}",
        prompt.images.len(),
        config.llm.model_for(prompt.has_images())
    );
    Ok(())
}
