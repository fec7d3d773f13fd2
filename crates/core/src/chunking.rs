use crate::classify::classify_chunk;
use crate::error::IngestError;
use crate::models::{Chunk, IngestionOptions};
use regex::Regex;
use std::sync::LazyLock;

static LINE_ENDINGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n?").expect("valid regex"));
static BLANK_LINE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static HORIZONTAL_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid regex"));
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid regex"));

const PARAGRAPH_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    /// Upper bound on chunk length, in characters.
    pub max_chars: usize,
}

impl TryFrom<&IngestionOptions> for ChunkingConfig {
    type Error = IngestError;

    fn try_from(value: &IngestionOptions) -> Result<Self, Self::Error> {
        if value.max_chunk_chars == 0 {
            return Err(IngestError::InvalidChunkConfig(
                "max_chunk_chars must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            max_chars: value.max_chunk_chars,
        })
    }
}

/// Canonicalizes extracted text: unix line endings, at most one blank line in
/// a row, single spaces, no surrounding whitespace.
pub fn normalize_text(text: &str) -> String {
    let unix = LINE_ENDINGS.replace_all(text, "\n");
    let capped = BLANK_LINE_RUNS.replace_all(&unix, PARAGRAPH_SEPARATOR);
    let spaced = HORIZONTAL_WHITESPACE.replace_all(&capped, " ");
    spaced.trim().to_string()
}

/// Greedily packs paragraphs into chunks of at most `max_chars` characters.
///
/// Paragraphs are never split, so a paragraph longer than the limit becomes a
/// chunk of its own.
pub fn chunk_by_paragraph(normalized: &str, config: ChunkingConfig) -> Vec<String> {
    let paragraphs = PARAGRAPH_BREAK
        .split(normalized)
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty());

    let separator_chars = PARAGRAPH_SEPARATOR.chars().count();
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for paragraph in paragraphs {
        let paragraph_chars = paragraph.chars().count();

        if current.is_empty() {
            current.push_str(paragraph);
            current_chars = paragraph_chars;
            continue;
        }

        if current_chars + separator_chars + paragraph_chars > config.max_chars {
            chunks.push(std::mem::take(&mut current));
            current.push_str(paragraph);
            current_chars = paragraph_chars;
        } else {
            current.push_str(PARAGRAPH_SEPARATOR);
            current.push_str(paragraph);
            current_chars += separator_chars + paragraph_chars;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Chunks normalized text and tags every chunk with its content type.
pub fn build_chunks(normalized: &str, config: ChunkingConfig) -> Vec<Chunk> {
    chunk_by_paragraph(normalized, config)
        .into_iter()
        .map(|text| Chunk {
            kind: classify_chunk(&text),
            text,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChunkType;

    fn config(max_chars: usize) -> ChunkingConfig {
        ChunkingConfig { max_chars }
    }

    #[test]
    fn line_endings_are_unified() {
        assert_eq!(normalize_text("a\r\nb\rc\nd"), "a\nb\nc\nd");
    }

    #[test]
    fn blank_line_runs_are_capped_at_one() {
        assert_eq!(normalize_text("a\n\n\n\n\nb\r\n\r\n\r\nc"), "a\n\nb\n\nc");
    }

    #[test]
    fn horizontal_whitespace_is_collapsed_and_text_trimmed() {
        let input = "  \n A  \t  lot\nof   spacing \n\n ";
        assert_eq!(normalize_text(input), "A lot\nof spacing");
    }

    #[test]
    fn empty_text_normalizes_to_empty() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" \t\r\n "), "");
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_by_paragraph("", config(600)).is_empty());
    }

    #[test]
    fn small_paragraphs_are_packed_together() {
        let chunks = chunk_by_paragraph("one\n\ntwo\n\nthree", config(600));
        assert_eq!(chunks, vec!["one\n\ntwo\n\nthree".to_string()]);
    }

    #[test]
    fn buffer_flushes_before_exceeding_limit() {
        // "aaaa\n\nbbbb" is exactly 10 characters, adding "\n\ncc" would make 14.
        let chunks = chunk_by_paragraph("aaaa\n\nbbbb\n\ncc", config(10));
        assert_eq!(chunks, vec!["aaaa\n\nbbbb".to_string(), "cc".to_string()]);
    }

    #[test]
    fn oversized_paragraph_is_kept_whole() {
        let long = "x".repeat(25);
        let text = format!("short\n\n{long}\n\ntail");
        let chunks = chunk_by_paragraph(&text, config(10));

        assert_eq!(chunks, vec!["short".to_string(), long, "tail".to_string()]);
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        // Each paragraph is 4 characters but 8 bytes.
        let chunks = chunk_by_paragraph("éééé\n\nüüüü", config(10));
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn chunks_respect_the_size_bound_and_lose_no_text() {
        let paragraphs: Vec<String> = (0..40)
            .map(|index| format!("Paragraph {index} {}", "word ".repeat(index % 7 + 1).trim()))
            .collect();
        let normalized = normalize_text(&paragraphs.join("\n\n\n"));

        let chunks = chunk_by_paragraph(&normalized, config(120));

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.is_empty());
            assert_eq!(chunk.trim(), chunk);
            assert!(chunk.chars().count() <= 120);
        }
        assert_eq!(chunks.join("\n\n"), normalized);
    }

    #[test]
    fn build_chunks_classifies_each_chunk() {
        let text = "Call 911 if the wound bleeds.\n\nDay 1: rest.";
        let chunks = build_chunks(text, config(30));

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].kind, ChunkType::Emergency);
        assert_eq!(chunks[1].kind, ChunkType::Timeline);
    }

    #[test]
    fn zero_limit_is_rejected() {
        let options = IngestionOptions {
            max_chunk_chars: 0,
            ..IngestionOptions::default()
        };
        assert!(matches!(
            ChunkingConfig::try_from(&options),
            Err(IngestError::InvalidChunkConfig(_))
        ));
    }
}
