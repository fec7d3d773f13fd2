use crate::models::ChunkType;

/// Ordered classification rules. The first rule with a matching keyword wins,
/// so safety-critical types sit at the top.
pub const CLASSIFICATION_RULES: &[(ChunkType, &[&str])] = &[
    (
        ChunkType::Emergency,
        &["emergency", "call 911", "red flag", "seek immediate"],
    ),
    (
        ChunkType::Timeline,
        &["day 1", "week 1", "timeline", "day-by-day"],
    ),
    (
        ChunkType::Protocol,
        &["protocol", "step 1", "procedure", "instructions"],
    ),
    (
        ChunkType::Advice,
        &["tip", "recommendation", "advice", "best practice"],
    ),
    (ChunkType::Faq, &["q:", "question", "faq", "a:"]),
];

pub fn classify_chunk(text: &str) -> ChunkType {
    let lowered = text.to_lowercase();
    CLASSIFICATION_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map(|(kind, _)| *kind)
        .unwrap_or(ChunkType::General)
}
