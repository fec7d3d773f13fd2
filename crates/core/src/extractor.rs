use crate::error::IngestError;
use crate::models::ExtractedText;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use lopdf::{Document, Object};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

const PAGE_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Serialize)]
struct LlmOcrRequest {
    pdf_base64: String,
    source_path: String,
}

#[derive(Debug, Clone, Deserialize)]
struct LlmOcrResponse {
    pages: Option<Vec<LlmOcrPage>>,
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct LlmOcrPage {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OcrEndpointConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl OcrEndpointConfig {
    /// Builds a config from optional raw values, ignoring blank ones.
    pub fn from_parts(endpoint: Option<String>, api_key: Option<String>) -> Option<Self> {
        let endpoint = endpoint?.trim().to_string();
        if endpoint.is_empty() {
            return None;
        }

        let api_key = api_key.and_then(|value| {
            let key = value.trim().to_string();
            if key.is_empty() {
                None
            } else {
                Some(key)
            }
        });

        Some(Self { endpoint, api_key })
    }
}

/// Turns raw document bytes into plain text.
#[async_trait]
pub trait PdfExtractor: Send + Sync {
    async fn extract(&self, source: &str, bytes: &[u8]) -> Result<ExtractedText, IngestError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl LopdfExtractor {
    fn extract_sync(&self, bytes: &[u8]) -> Result<ExtractedText, IngestError> {
        let document =
            Document::load_mem(bytes).map_err(|error| IngestError::PdfParse(error.to_string()))?;

        let pages = document.get_pages();
        let mut texts = Vec::new();
        for page_no in pages.keys() {
            let text = document
                .extract_text(&[*page_no])
                .map_err(|error| IngestError::PdfParse(error.to_string()))?;

            if !text.trim().is_empty() {
                texts.push(text);
            }
        }

        Ok(ExtractedText {
            text: texts.join(PAGE_SEPARATOR),
            page_count: pages.len() as u32,
            metadata: document_info(&document),
        })
    }
}

#[async_trait]
impl PdfExtractor for LopdfExtractor {
    async fn extract(&self, _source: &str, bytes: &[u8]) -> Result<ExtractedText, IngestError> {
        let extractor = *self;
        let bytes = bytes.to_vec();

        // A panic inside lopdf surfaces as a join error; treat it as unreadable input.
        tokio::task::spawn_blocking(move || extractor.extract_sync(&bytes))
            .await
            .map_err(|error| IngestError::PdfParse(format!("lopdf task failed: {error}")))?
    }
}

fn document_info(document: &Document) -> BTreeMap<String, String> {
    let info = document
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .and_then(|id| document.get_dictionary(id));

    let Ok(info) = info else {
        return BTreeMap::new();
    };

    info.iter()
        .filter_map(|(key, value)| {
            let raw = value.as_str().ok()?;
            Some((
                String::from_utf8_lossy(key).into_owned(),
                String::from_utf8_lossy(raw).into_owned(),
            ))
        })
        .collect()
}

/// Sends the whole PDF to a multimodal OCR endpoint.
#[derive(Debug, Clone)]
pub struct LlmOcrExtractor {
    config: OcrEndpointConfig,
    client: Client,
}

impl LlmOcrExtractor {
    pub fn new(config: OcrEndpointConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl PdfExtractor for LlmOcrExtractor {
    async fn extract(&self, source: &str, bytes: &[u8]) -> Result<ExtractedText, IngestError> {
        let payload = LlmOcrRequest {
            pdf_base64: STANDARD.encode(bytes),
            source_path: source.to_string(),
        };

        let mut request = self
            .client
            .post(&self.config.endpoint)
            .header("content-type", "application/json")
            .json(&payload);

        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(IngestError::OcrFailed(format!(
                "multimodal OCR request to {} returned {}",
                self.config.endpoint,
                response.status()
            )));
        }

        let payload: LlmOcrResponse = response.json().await?;
        payload_to_text(&payload, source)
    }
}

fn payload_to_text(payload: &LlmOcrResponse, source: &str) -> Result<ExtractedText, IngestError> {
    if let Some(listed) = &payload.pages {
        let mut pages = listed
            .iter()
            .enumerate()
            .filter_map(|(index, page)| {
                let text = page.text.as_deref().map(str::trim).unwrap_or_default();
                if text.is_empty() {
                    None
                } else {
                    Some((page.page.unwrap_or(index as u32 + 1), text))
                }
            })
            .collect::<Vec<_>>();

        if !pages.is_empty() {
            pages.sort_by_key(|(number, _)| *number);
            let last_page = pages.last().map(|(number, _)| *number).unwrap_or_default();
            return Ok(ExtractedText {
                text: join_pages(pages.iter().map(|(_, text)| *text)),
                page_count: last_page.max(listed.len() as u32),
                metadata: BTreeMap::new(),
            });
        }
    }

    if let Some(raw_text) = &payload.text {
        let pages = raw_text.split('\u{000c}').collect::<Vec<_>>();
        let text = join_pages(pages.iter().map(|page| page.trim()));

        if !text.is_empty() {
            return Ok(ExtractedText {
                text,
                page_count: pages.len() as u32,
                metadata: BTreeMap::new(),
            });
        }
    }

    Err(IngestError::OcrFailed(format!(
        "multimodal OCR response was empty for {source}"
    )))
}

fn join_pages<'a>(pages: impl Iterator<Item = &'a str>) -> String {
    pages
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR)
}

/// Text-layer extraction first; the OCR extractor, when configured, for PDFs
/// the primary cannot read or that carry no text layer.
#[derive(Debug, Clone)]
pub struct FallbackExtractor<P = LopdfExtractor, O = LlmOcrExtractor> {
    primary: P,
    ocr: Option<O>,
}

impl FallbackExtractor {
    pub fn new(ocr: Option<OcrEndpointConfig>) -> Self {
        Self::with_parts(LopdfExtractor, ocr.map(LlmOcrExtractor::new))
    }
}

impl Default for FallbackExtractor {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<P, O> FallbackExtractor<P, O> {
    pub fn with_parts(primary: P, ocr: Option<O>) -> Self {
        Self { primary, ocr }
    }
}

#[async_trait]
impl<P, O> PdfExtractor for FallbackExtractor<P, O>
where
    P: PdfExtractor,
    O: PdfExtractor,
{
    async fn extract(&self, source: &str, bytes: &[u8]) -> Result<ExtractedText, IngestError> {
        let extracted = self.primary.extract(source, bytes).await;

        let Some(ocr) = &self.ocr else {
            return extracted;
        };

        match extracted {
            Ok(text) if !text.text.trim().is_empty() => Ok(text),
            Ok(empty) => {
                debug!(source, "no text layer, trying multimodal OCR");
                let mut recovered = ocr.extract(source, bytes).await?;
                recovered.page_count = recovered.page_count.max(empty.page_count);
                recovered.metadata = empty.metadata;
                Ok(recovered)
            }
            Err(IngestError::PdfParse(parse_error)) => {
                debug!(source, error = %parse_error, "lopdf failed, trying multimodal OCR");
                ocr.extract(source, bytes).await.map_err(|ocr_error| {
                    IngestError::PdfParse(format!(
                        "{parse_error}; multimodal OCR fallback failed: {ocr_error}"
                    ))
                })
            }
            Err(error) => Err(error),
        }
    }
}
