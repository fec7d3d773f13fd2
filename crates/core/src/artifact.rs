use crate::models::ProcessedDocument;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Where the markdown artifact for document `id` lives.
pub fn artifact_path(output_dir: &Path, id: &str) -> PathBuf {
    output_dir.join(format!("{id}.md"))
}

/// Renders a document as markdown: a front-matter header followed by the
/// normalized text under its title.
pub fn render_markdown(document: &ProcessedDocument, extracted_at: DateTime<Utc>) -> String {
    let record = &document.record;
    let mut out = String::new();

    // Strings are written as JSON literals, which front-matter parsers read as
    // quoted scalars.
    let _ = writeln!(out, "---");
    let _ = writeln!(out, "title: {}", quoted(&record.title));
    let _ = writeln!(out, "source: {}", quoted(&record.source));
    let _ = writeln!(out, "category: {}", quoted(&record.category));
    let _ = writeln!(out, "pageCount: {}", record.page_count);
    let _ = writeln!(
        out,
        "extractedAt: {}",
        quoted(&extracted_at.to_rfc3339_opts(SecondsFormat::Millis, true))
    );
    let _ = writeln!(out, "chunkCount: {}", record.chunk_count);
    let _ = writeln!(out, "---");
    let _ = writeln!(out);
    let _ = writeln!(out, "# {}", record.title);

    if !document.normalized_text.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", document.normalized_text);
    }

    out
}

fn quoted(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}
