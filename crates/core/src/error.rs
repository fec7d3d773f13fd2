use crate::report::RunReport;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("input path is not a directory: {0}")]
    NotADirectory(String),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("source file not found: {0}")]
    MissingSource(String),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("multimodal OCR failed: {0}")]
    OcrFailed(String),

    #[error("index at {path} is malformed: {source}")]
    MalformedIndex {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("index serialization failed: {0}")]
    IndexSerialization(#[from] serde_json::Error),
}

/// A batch-level failure. Carries whatever the run completed before it stopped.
#[derive(Debug, Error)]
#[error("ingestion run aborted: {source}")]
pub struct RunFailure {
    pub report: RunReport,
    #[source]
    pub source: IngestError,
}

impl RunFailure {
    pub fn new(report: RunReport, source: IngestError) -> Self {
        Self { report, source }
    }
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
