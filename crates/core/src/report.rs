use crate::models::{Chunk, ChunkType, DocumentRecord, ProcessedDocument};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Chunk counts per content type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkTypeTally {
    counts: BTreeMap<ChunkType, usize>,
}

impl ChunkTypeTally {
    pub fn from_chunks<'a>(chunks: impl IntoIterator<Item = &'a Chunk>) -> Self {
        chunks.into_iter().fold(Self::default(), Self::with)
    }

    #[must_use]
    pub fn with(mut self, chunk: &Chunk) -> Self {
        *self.counts.entry(chunk.kind).or_insert(0) += 1;
        self
    }

    pub fn get(&self, kind: ChunkType) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Non-zero counts in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkType, usize)> + '_ {
        self.counts.iter().map(|(kind, count)| (*kind, *count))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPdf {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The input directory did not exist and was created empty.
    InputCreated,
    /// The input directory holds no PDFs; the index was not touched.
    NoSourceFiles,
    Completed,
}

/// Structured result of one ingestion run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub status: RunStatus,
    pub documents: Vec<DocumentRecord>,
    pub skipped_files: Vec<SkippedPdf>,
    pub chunk_types: ChunkTypeTally,
}

impl RunReport {
    pub fn empty(status: RunStatus) -> Self {
        Self {
            status,
            documents: Vec::new(),
            skipped_files: Vec::new(),
            chunk_types: ChunkTypeTally::default(),
        }
    }

    pub fn completed(processed: &[ProcessedDocument], skipped_files: Vec<SkippedPdf>) -> Self {
        Self {
            status: RunStatus::Completed,
            documents: processed
                .iter()
                .map(|document| document.record.clone())
                .collect(),
            skipped_files,
            chunk_types: ChunkTypeTally::from_chunks(
                processed.iter().flat_map(|document| &document.chunks),
            ),
        }
    }

    pub fn total_chunks(&self) -> usize {
        self.chunk_types.total()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            RunStatus::InputCreated => {
                return writeln!(f, "input folder created; add PDFs and run again")
            }
            RunStatus::NoSourceFiles => return writeln!(f, "no PDF files found"),
            RunStatus::Completed => {}
        }

        writeln!(f, "documents processed: {}", self.documents.len())?;
        writeln!(f, "chunks created: {}", self.total_chunks())?;
        for (kind, count) in self.chunk_types.iter() {
            writeln!(f, "  {kind}: {count}")?;
        }

        if !self.skipped_files.is_empty() {
            writeln!(f, "skipped files: {}", self.skipped_files.len())?;
            for skipped in &self.skipped_files {
                writeln!(f, "  {}: {}", skipped.path.display(), skipped.reason)?;
            }
        }

        Ok(())
    }
}
