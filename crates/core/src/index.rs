//! The persisted document index shared by every ingestion source.
//!
//! Entries written by other sources are kept as raw JSON unless they have the
//! full [`DocumentRecord`] shape, so a merge never rewrites what it does not own.

use crate::error::IngestError;
use crate::models::DocumentRecord;
use crate::store::ByteStore;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

pub const INGESTED_AT_SUFFIX: &str = "IngestedAt";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum IndexedDocument {
    Record(DocumentRecord),
    Foreign(Map<String, Value>),
}

impl IndexedDocument {
    pub fn category(&self) -> Option<&str> {
        match self {
            IndexedDocument::Record(record) => Some(&record.category),
            IndexedDocument::Foreign(fields) => fields.get("category").and_then(Value::as_str),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            IndexedDocument::Record(record) => Some(&record.id),
            IndexedDocument::Foreign(fields) => fields.get("id").and_then(Value::as_str),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentIndex {
    pub documents: Vec<IndexedDocument>,
    #[serde(default)]
    pub total_docs: usize,
    /// Per-category `<category>IngestedAt` stamps and any other top-level keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub fn ingested_at_key(category: &str) -> String {
    format!("{category}{INGESTED_AT_SUFFIX}")
}

impl DocumentIndex {
    pub fn from_slice(bytes: &[u8], path: &Path) -> Result<Self, IngestError> {
        serde_json::from_slice(bytes).map_err(|source| IngestError::MalformedIndex {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, IngestError> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Replaces every document of `category` with `records`.
    ///
    /// Documents of other categories keep their position and content. Prior
    /// documents of `category` missing from `records` are dropped.
    pub fn merge_category(
        mut self,
        category: &str,
        records: Vec<DocumentRecord>,
        ingested_at: DateTime<Utc>,
    ) -> Self {
        self.documents
            .retain(|document| document.category() != Some(category));
        self.documents
            .extend(records.into_iter().map(IndexedDocument::Record));
        self.total_docs = self.documents.len();
        self.extra.insert(
            ingested_at_key(category),
            Value::String(ingested_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        self
    }

    pub fn documents_in<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a IndexedDocument> {
        self.documents
            .iter()
            .filter(move |document| document.category() == Some(category))
    }

    pub fn ingested_at(&self, category: &str) -> Option<DateTime<Utc>> {
        self.extra
            .get(&ingested_at_key(category))
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|stamp| stamp.with_timezone(&Utc))
    }

    /// Document count per category; uncategorized entries are counted under `""`.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        self.documents
            .iter()
            .fold(BTreeMap::new(), |mut counts, document| {
                *counts
                    .entry(document.category().unwrap_or_default().to_string())
                    .or_insert(0) += 1;
                counts
            })
    }
}

/// Reads the index at `path`. A missing index is the empty default; a present
/// but unparsable one is an error.
pub async fn load_index<S: ByteStore + ?Sized>(
    store: &S,
    path: &Path,
) -> Result<DocumentIndex, IngestError> {
    match store.get(path).await? {
        Some(bytes) => DocumentIndex::from_slice(&bytes, path),
        None => Ok(DocumentIndex::default()),
    }
}

pub async fn save_index<S: ByteStore + ?Sized>(
    store: &S,
    path: &Path,
    index: &DocumentIndex,
) -> Result<(), IngestError> {
    store.put(path, &index.to_json_bytes()?).await
}
