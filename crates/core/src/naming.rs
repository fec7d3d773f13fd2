use regex::Regex;
use std::sync::LazyLock;

static PDF_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.pdf$").expect("valid regex"));
static NON_SLUG_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));
static WORD_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w").expect("valid regex"));

fn strip_extension(file_name: &str) -> &str {
    match PDF_EXTENSION.find(file_name) {
        Some(found) => &file_name[..found.start()],
        None => file_name,
    }
}

/// Slug identifier for a source file: `"Hip Precautions_v2.pdf"` becomes
/// `"hip-precautions-v2"`.
pub fn generate_id(file_name: &str) -> String {
    let lowered = strip_extension(file_name).to_lowercase();
    NON_SLUG_RUN
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Display title for a source file: `"hip-precautions_v2.pdf"` becomes
/// `"Hip Precautions V2"`.
pub fn generate_title(file_name: &str) -> String {
    let spaced = strip_extension(file_name).replace(['-', '_'], " ");
    WORD_START
        .replace_all(&spaced, |captures: &regex::Captures<'_>| captures[0].to_uppercase())
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_a_lowercase_slug() {
        assert_eq!(generate_id("Hip Precautions_v2.pdf"), "hip-precautions-v2");
    }

    #[test]
    fn id_strips_edge_hyphens_and_collapses_runs() {
        assert_eq!(generate_id("  (Draft) -- Knee Rehab!!.PDF"), "draft-knee-rehab");
    }

    #[test]
    fn id_only_strips_the_final_pdf_extension() {
        assert_eq!(generate_id("report.pdf.pdf"), "report-pdf");
    }

    #[test]
    fn title_capitalizes_word_starts() {
        assert_eq!(generate_title("hip-precautions_v2.pdf"), "Hip Precautions V2");
    }

    #[test]
    fn title_keeps_remaining_letters_untouched() {
        assert_eq!(generate_title("post-op FAQ_mRNA.Pdf"), "Post Op FAQ MRNA");
    }

    #[test]
    fn derivation_is_deterministic() {
        let name = "Week 1 Timeline.pdf";
        assert_eq!(generate_id(name), generate_id(name));
        assert_eq!(generate_title(name), "Week 1 Timeline");
    }
}
