use crate::artifact::{artifact_path, render_markdown};
use crate::chunking::{build_chunks, normalize_text, ChunkingConfig};
use crate::error::{IngestError, RunFailure};
use crate::extractor::PdfExtractor;
use crate::index::{load_index, save_index};
use crate::models::{Chunk, DocumentRecord, ExtractedText, IngestionOptions, ProcessedDocument};
use crate::naming::{generate_id, generate_title};
use crate::report::{RunReport, RunStatus, SkippedPdf};
use crate::store::ByteStore;
use chrono::Utc;
use serde_json::Map;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// PDFs directly inside `folder`, sorted by path. The extension match ignores case.
///
/// A `folder` that is not a directory, or one that cannot be listed, is an error.
pub fn discover_pdf_files(folder: &Path) -> Result<Vec<PathBuf>, IngestError> {
    if !folder.is_dir() {
        return Err(IngestError::NotADirectory(folder.display().to_string()));
    }

    let mut files = Vec::new();

    for item in WalkDir::new(folder).min_depth(1).max_depth(1) {
        let entry = item.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            files.push(entry.into_path());
        }
    }

    files.sort_unstable();
    Ok(files)
}

pub fn build_document_record(
    file_name: &str,
    category: &str,
    page_count: u32,
    chunks: &[Chunk],
) -> DocumentRecord {
    DocumentRecord {
        id: generate_id(file_name),
        title: generate_title(file_name),
        category: category.to_string(),
        source: file_name.to_string(),
        page_count,
        chunk_count: chunks.len(),
        chunk_types: chunks.iter().map(|chunk| chunk.kind).collect(),
        extra: Map::new(),
    }
}

/// Normalize, chunk, classify and describe one extracted document.
pub fn process_extracted(
    file_name: &str,
    extracted: &ExtractedText,
    category: &str,
    config: ChunkingConfig,
) -> ProcessedDocument {
    let normalized_text = normalize_text(&extracted.text);
    let chunks = build_chunks(&normalized_text, config);
    let record = build_document_record(file_name, category, extracted.page_count, &chunks);

    ProcessedDocument {
        record,
        normalized_text,
        chunks,
    }
}

fn file_name_of(path: &Path) -> Result<&str, IngestError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| IngestError::MissingFileName(path.display().to_string()))
}

/// Runs the whole batch: one file at a time, then a single index merge.
pub struct IngestPipeline<E, S> {
    extractor: E,
    store: S,
    options: IngestionOptions,
    chunking: ChunkingConfig,
}

impl<E, S> IngestPipeline<E, S>
where
    E: PdfExtractor,
    S: ByteStore,
{
    pub fn new(extractor: E, store: S, options: IngestionOptions) -> Result<Self, IngestError> {
        let chunking = ChunkingConfig::try_from(&options)?;
        Ok(Self {
            extractor,
            store,
            options,
            chunking,
        })
    }

    pub fn options(&self) -> &IngestionOptions {
        &self.options
    }

    /// Extracts and processes one source file and writes its markdown artifact.
    pub async fn ingest_file(&self, path: &Path) -> Result<ProcessedDocument, IngestError> {
        let file_name = file_name_of(path)?;
        let bytes = self
            .store
            .get(path)
            .await?
            .ok_or_else(|| IngestError::MissingSource(path.display().to_string()))?;

        let extracted = self.extractor.extract(file_name, &bytes).await?;
        let document =
            process_extracted(file_name, &extracted, &self.options.category, self.chunking);

        let artifact = render_markdown(&document, Utc::now());
        self.store
            .put(
                &artifact_path(&self.options.output_dir, &document.record.id),
                artifact.as_bytes(),
            )
            .await?;

        debug!(
            source = file_name,
            id = %document.record.id,
            pages = document.record.page_count,
            chunks = document.record.chunk_count,
            "document processed"
        );
        Ok(document)
    }

    pub async fn run(&self) -> Result<RunReport, RunFailure> {
        let input_dir = &self.options.input_dir;

        let input_unavailable = |error: std::io::Error| {
            RunFailure::new(RunReport::empty(RunStatus::InputCreated), error.into())
        };

        if !tokio::fs::try_exists(input_dir).await.map_err(input_unavailable)? {
            tokio::fs::create_dir_all(input_dir)
                .await
                .map_err(input_unavailable)?;
            info!(folder = %input_dir.display(), "created missing input folder");
            return Ok(RunReport::empty(RunStatus::InputCreated));
        }

        let files = discover_pdf_files(input_dir)
            .map_err(|error| RunFailure::new(RunReport::empty(RunStatus::Completed), error))?;
        if files.is_empty() {
            info!(folder = %input_dir.display(), "no pdf files found");
            return Ok(RunReport::empty(RunStatus::NoSourceFiles));
        }

        let index = load_index(&self.store, &self.options.index_path)
            .await
            .map_err(|error| RunFailure::new(RunReport::empty(RunStatus::Completed), error))?;

        info!(
            folder = %input_dir.display(),
            file_count = files.len(),
            category = %self.options.category,
            "ingesting pdfs"
        );

        let mut processed = Vec::new();
        let mut skipped_files = Vec::new();

        for path in files {
            match self.ingest_file(&path).await {
                Ok(document) => processed.push(document),
                Err(error) => {
                    warn!(path = %path.display(), reason = %error, "skipped pdf");
                    skipped_files.push(SkippedPdf {
                        path,
                        reason: error.to_string(),
                    });
                }
            }
        }

        let report = RunReport::completed(&processed, skipped_files);
        let merged = index.merge_category(
            &self.options.category,
            report.documents.clone(),
            Utc::now(),
        );

        if let Err(error) = save_index(&self.store, &self.options.index_path, &merged).await {
            return Err(RunFailure::new(report, error));
        }

        info!(
            documents = report.documents.len(),
            chunks = report.total_chunks(),
            skipped = report.skipped_files.len(),
            total_docs = merged.total_docs,
            "index updated"
        );
        Ok(report)
    }
}
