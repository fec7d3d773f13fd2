use chrono::Utc;
use clap::{Parser, Subcommand};
use pdf_kb_core::{
    load_index, FallbackExtractor, IngestPipeline, IngestionOptions, LocalStore,
    OcrEndpointConfig, DEFAULT_CATEGORY, DEFAULT_MAX_CHUNK_CHARS, INGESTED_AT_SUFFIX,
};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-kb", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Folder scanned for source PDFs (not recursive).
    #[arg(long, env = "PDF_KB_INPUT_DIR", default_value = "knowledge/pdfs")]
    input_dir: PathBuf,

    /// Folder that receives one markdown file per document.
    #[arg(long, env = "PDF_KB_OUTPUT_DIR", default_value = "knowledge/documents")]
    output_dir: PathBuf,

    /// Knowledge-base index shared with other ingestion sources.
    #[arg(long, env = "PDF_KB_INDEX_PATH", default_value = "knowledge/index.json")]
    index_path: PathBuf,

    /// Category tag of this batch; its documents are replaced on every run.
    #[arg(long, env = "PDF_KB_CATEGORY", default_value = DEFAULT_CATEGORY)]
    category: String,

    /// Maximum chunk size in characters.
    #[arg(long, env = "PDF_KB_MAX_CHUNK_CHARS", default_value_t = DEFAULT_MAX_CHUNK_CHARS)]
    max_chunk_chars: usize,

    /// Multimodal OCR endpoint used when a PDF has no readable text layer.
    #[arg(long, env = "LLM_OCR_ENDPOINT")]
    ocr_endpoint: Option<String>,

    /// Bearer token for the OCR endpoint.
    #[arg(long, env = "LLM_OCR_API_KEY", hide_env_values = true)]
    ocr_api_key: Option<String>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Ingest every PDF in the input folder and rewrite the index (default).
    Ingest,
    /// Print document counts and ingestion times recorded in the index.
    Status,
}

impl Cli {
    fn options(&self) -> IngestionOptions {
        IngestionOptions {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            index_path: self.index_path.clone(),
            category: self.category.clone(),
            max_chunk_chars: self.max_chunk_chars,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "pdf-kb boot"
    );

    match cli.command.unwrap_or(Command::Ingest) {
        Command::Ingest => ingest(&cli).await,
        Command::Status => status(&cli).await,
    }
}

async fn ingest(cli: &Cli) -> anyhow::Result<()> {
    let ocr = OcrEndpointConfig::from_parts(cli.ocr_endpoint.clone(), cli.ocr_api_key.clone());
    if let Some(ocr) = &ocr {
        info!(endpoint = %ocr.endpoint, "multimodal OCR fallback enabled");
    }

    let pipeline = IngestPipeline::new(FallbackExtractor::new(ocr), LocalStore, cli.options())
        .map_err(|error| anyhow::anyhow!(error.to_string()))?;

    match pipeline.run().await {
        Ok(report) => {
            print!("{report}");
            Ok(())
        }
        Err(failure) => {
            print!("{}", failure.report);
            error!(reason = %failure.source, "ingestion aborted");
            Err(anyhow::anyhow!(failure.to_string()))
        }
    }
}

async fn status(cli: &Cli) -> anyhow::Result<()> {
    let index = load_index(&LocalStore, &cli.index_path)
        .await
        .map_err(|error| anyhow::anyhow!(error.to_string()))?;

    println!("index: {}", cli.index_path.display());
    println!("total documents: {}", index.total_docs);
    for (category, count) in index.category_counts() {
        let label = if category.is_empty() {
            "(uncategorized)"
        } else {
            category.as_str()
        };
        println!("  {label}: {count}");
    }

    for (key, value) in &index.extra {
        if let (Some(category), Some(stamp)) =
            (key.strip_suffix(INGESTED_AT_SUFFIX), value.as_str())
        {
            println!("{category} ingested at {stamp}");
        }
    }

    Ok(())
}
