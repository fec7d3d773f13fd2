use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_MAX_CHUNK_CHARS: usize = 600;
pub const DEFAULT_CATEGORY: &str = "pdf";

/// Content type of a chunk. Declaration order is the serialization order of
/// `DocumentRecord::chunk_types`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChunkType {
    Emergency,
    Timeline,
    Protocol,
    Advice,
    Faq,
    General,
}

impl ChunkType {
    pub const ALL: [ChunkType; 6] = [
        ChunkType::Emergency,
        ChunkType::Timeline,
        ChunkType::Protocol,
        ChunkType::Advice,
        ChunkType::Faq,
        ChunkType::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChunkType::Emergency => "emergency",
            ChunkType::Timeline => "timeline",
            ChunkType::Protocol => "protocol",
            ChunkType::Advice => "advice",
            ChunkType::Faq => "faq",
            ChunkType::General => "general",
        }
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: ChunkType,
}

/// Output of a text extractor for one source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: u32,
    pub metadata: BTreeMap<String, String>,
}

/// Index entry describing one ingested source file.
///
/// Fields this crate does not know about land in `extra` and are written back
/// untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: String,
    pub title: String,
    pub category: String,
    pub source: String,
    pub page_count: u32,
    pub chunk_count: usize,
    pub chunk_types: BTreeSet<ChunkType>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A source file that made it through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedDocument {
    pub record: DocumentRecord,
    pub normalized_text: String,
    pub chunks: Vec<Chunk>,
}

#[derive(Debug, Clone)]
pub struct IngestionOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub index_path: PathBuf,
    pub category: String,
    pub max_chunk_chars: usize,
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("knowledge/pdfs"),
            output_dir: PathBuf::from("knowledge/documents"),
            index_path: PathBuf::from("knowledge/index.json"),
            category: DEFAULT_CATEGORY.to_string(),
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_types_serialize_lowercase_in_vocabulary_order() {
        let record = DocumentRecord {
            id: "doc".to_string(),
            title: "Doc".to_string(),
            category: "pdf".to_string(),
            source: "doc.pdf".to_string(),
            page_count: 2,
            chunk_count: 3,
            chunk_types: [ChunkType::General, ChunkType::Emergency, ChunkType::Faq]
                .into_iter()
                .collect(),
            extra: Map::new(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value["chunkTypes"],
            serde_json::json!(["emergency", "faq", "general"])
        );
        assert_eq!(value["pageCount"], 2);
        assert_eq!(value["chunkCount"], 3);
    }

    #[test]
    fn unknown_record_fields_survive_a_round_trip() {
        let raw = r#"{
            "id": "faq-page",
            "title": "Faq Page",
            "category": "web",
            "source": "faq.html",
            "pageCount": 1,
            "chunkCount": 4,
            "chunkTypes": ["faq"],
            "url": "https://example.org/faq"
        }"#;
        let record: DocumentRecord = serde_json::from_str(raw).unwrap();

        assert_eq!(record.chunk_count, 4);
        assert_eq!(record.extra["url"], "https://example.org/faq");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["url"], "https://example.org/faq");
    }
}
