pub mod artifact;
pub mod chunking;
pub mod classify;
pub mod error;
pub mod extractor;
pub mod index;
pub mod ingest;
pub mod models;
pub mod naming;
pub mod report;
pub mod store;

pub use artifact::{artifact_path, render_markdown};
pub use chunking::{build_chunks, chunk_by_paragraph, normalize_text, ChunkingConfig};
pub use classify::{classify_chunk, CLASSIFICATION_RULES};
pub use error::{IngestError, RunFailure};
pub use extractor::{
    FallbackExtractor, LlmOcrExtractor, LopdfExtractor, OcrEndpointConfig, PdfExtractor,
};
pub use index::{
    ingested_at_key, load_index, save_index, DocumentIndex, IndexedDocument, INGESTED_AT_SUFFIX,
};
pub use ingest::{build_document_record, discover_pdf_files, process_extracted, IngestPipeline};
pub use models::{
    Chunk, ChunkType, DocumentRecord, ExtractedText, IngestionOptions, ProcessedDocument,
    DEFAULT_CATEGORY, DEFAULT_MAX_CHUNK_CHARS,
};
pub use naming::{generate_id, generate_title};
pub use report::{ChunkTypeTally, RunReport, RunStatus, SkippedPdf};
pub use store::{ByteStore, LocalStore};
