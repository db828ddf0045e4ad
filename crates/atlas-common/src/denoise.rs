/// Removal of PDF/OCR artifacts from definitions and captions.
///
/// Extracted journal text carries download stamps, licensing footers, running headers
/// and figure captions that bleed into neighbouring definitions. The denoiser deletes
/// ids, links and citations first, then boilerplate sentences, then caption leakage
/// (`FIG. N.` up to the next `FIG.` or end). Whitespace is collapsed and stray
/// punctuation left at either end is trimmed.
use std::sync::LazyLock;

use regex::Regex;

use crate::text::collapse_whitespace;

/// Artifacts deleted outright, before any boilerplate phrase is considered.
const TOKEN_PATTERNS: &[&str] = &[
    r"15524833\S*(?:\s*\d+,)*",
    r"https?://\S+",
    r"www\.\S+",
    r"\bDOI\b:?\s*\S+",
    r"\[[\d\s,]+\]",
    r"\[\d{1,2}/\d{1,2}/\d{2,4}\]",
];

/// Boilerplate openers. A deletion runs from the opener through the end of its
/// sentence and stops early in front of a `See` cross reference.
const PHRASE_PATTERNS: &[&str] = &[
    r"Downloaded from",
    r"See the Terms and Conditions",
    r"on Wiley Online Library",
    r"Wiley Online Library",
    r"Spanish Cochrane",
    r"Ministerio de",
    r"for rules of use",
    r"OA articles are governed",
    r"Creative Commons License",
    r"HUNTER ET AL\.",
    r"AMERICAN JOURNAL",
    r"Courtesy of Dr\.",
    r"Reprinted with permission",
    r"Panel [A-Z] reprinted",
];

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(?:\s|$)").expect("valid regex"));
static SEE_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bSee\b").expect("valid regex"));
static FIGURE_CAPTION_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)FIG\.\s+\d+\.").expect("valid regex"));
static FIGURE_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)FIG\.").expect("valid regex"));
static TRAILING_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+[,;:]\s*$").expect("valid regex"));
static LEADING_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s.,;:]+").expect("valid regex"));
static GENERIC_CAPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^fig\.?\s*\d+\.?\s*$").expect("valid regex"));

/// Cleans free text extracted from the source documents.
pub trait TextDenoiser {
    fn denoise(&self, text: &str) -> String;
}

/// Regex-list denoiser tuned for the morphology journal PDFs.
pub struct GarbageDenoiser {
    tokens: Vec<Regex>,
    phrases: Vec<Regex>,
}

fn case_insensitive(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).expect("valid regex"))
        .collect()
}

impl GarbageDenoiser {
    pub fn new() -> Self {
        Self {
            tokens: case_insensitive(TOKEN_PATTERNS),
            phrases: case_insensitive(PHRASE_PATTERNS),
        }
    }
}

impl Default for GarbageDenoiser {
    fn default() -> Self {
        Self::new()
    }
}

impl TextDenoiser for GarbageDenoiser {
    fn denoise(&self, text: &str) -> String {
        let mut cleaned = text.to_string();
        for pattern in &self.tokens {
            if pattern.is_match(&cleaned) {
                cleaned = pattern.replace_all(&cleaned, "").into_owned();
            }
        }
        for opener in &self.phrases {
            if opener.is_match(&cleaned) {
                cleaned = strip_phrase(&cleaned, opener);
            }
        }
        // Runs last: earlier patterns must not eat the FIG. anchors it stops at.
        let cleaned = strip_figure_captions(&cleaned);
        let cleaned = collapse_whitespace(&cleaned);
        let cleaned = LEADING_PUNCT.replace(&cleaned, "");
        TRAILING_PUNCT.replace(&cleaned, "").trim().to_string()
    }
}

/// Remove each `opener` span through its closing period, or up to the next `See`.
fn strip_phrase(text: &str, opener: &Regex) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(found) = opener.find_at(text, pos) {
        out.push_str(&text[pos..found.start()]);
        let sentence_end = SENTENCE_END
            .find_at(text, found.end())
            .map(|m| m.end())
            .unwrap_or(text.len());
        let see = SEE_ANCHOR
            .find_at(text, found.end())
            .map(|m| m.start())
            .unwrap_or(text.len());
        pos = sentence_end.min(see);
        out.push(' ');
    }
    out.push_str(&text[pos..]);
    out
}

/// Remove every `FIG. N. ...` span up to (not including) the next `FIG.` or the end.
fn strip_figure_captions(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(start) = FIGURE_CAPTION_START.find_at(text, pos) {
        out.push_str(&text[pos..start.start()]);
        pos = FIGURE_ANCHOR
            .find_at(text, start.end())
            .map(|next| next.start())
            .unwrap_or(text.len());
    }
    out.push_str(&text[pos..]);
    out
}

/// A caption that says nothing beyond its number, e.g. "Fig. 3".
pub fn is_generic_caption(caption: &str) -> bool {
    GENERIC_CAPTION.is_match(caption.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn denoise(text: &str) -> String {
        GarbageDenoiser::new().denoise(text)
    }

    #[test]
    fn test_removes_urls_and_ids() {
        let cleaned = denoise(
            "A ridge of cartilage https://onlinelibrary.wiley.com/doi/x 15524833, 2009 see www.example.org today",
        );
        assert_eq!(cleaned, "A ridge of cartilage 2009 see today");
    }

    #[test]
    fn test_removes_doi_without_touching_words() {
        assert_eq!(denoise("Doing well DOI: 10.1002/ajmg.a.32596 here"), "Doing well here");
    }

    #[test]
    fn test_removes_boilerplate_phrases() {
        let cleaned = denoise(
            "The helix rim. Downloaded from https://x.y by Spanish Cochrane National Provider. See the Terms and Conditions on Wiley Online Library for rules of use. OA articles are governed by the applicable Creative Commons License. See Tragus.",
        );
        assert_eq!(cleaned, "The helix rim. See Tragus.");
    }

    #[test]
    fn test_footer_without_period_stops_at_see() {
        assert_eq!(
            denoise("OA articles are governed by the applicable Creative Commons License See Tragus."),
            "See Tragus."
        );
    }

    #[test]
    fn test_wiley_download_stamp_is_removed_whole() {
        assert_eq!(
            denoise(
                "15524833, 2009, 12, Downloaded from https://onlinelibrary.wiley.com/doi/10.1002/ajmg.a.32596 by Spanish Cochrane National Provider (Ministerio de Sanidad), Wiley Online Library on [13/11/2025]. Small notch of the helix."
            ),
            "Small notch of the helix."
        );
    }

    #[test]
    fn test_leading_punctuation_is_trimmed() {
        assert_eq!(denoise(". ; Folded rim"), "Folded rim");
    }

    #[test]
    fn test_removes_citation_brackets() {
        assert_eq!(denoise("Measured [12, 14] directly"), "Measured directly");
    }

    #[test]
    fn test_strips_caption_leakage_until_next_fig() {
        let cleaned = denoise(
            "Upward rotation of the lobe. FIG. 4. Prominent lobe, note crease. FIG. 5. Another view FIG. see below",
        );
        assert_eq!(cleaned, "Upward rotation of the lobe. FIG. see below");
    }

    #[test]
    fn test_keeps_inline_figure_references() {
        assert_eq!(
            denoise("Absence of the tragus (Fig. 3)"),
            "Absence of the tragus (Fig. 3)"
        );
    }

    #[test]
    fn test_trims_trailing_punctuation() {
        assert_eq!(denoise("Lateral canthus  ;"), "Lateral canthus");
        assert_eq!(denoise("Lateral canthus ,  "), "Lateral canthus");
    }

    #[test]
    fn test_generic_caption() {
        assert!(is_generic_caption("Fig. 3"));
        assert!(is_generic_caption("FIG 12."));
        assert!(!is_generic_caption("Fig. 3. Detailed view of the antihelix"));
        assert!(!is_generic_caption("Document image (Fig. 3)"));
    }
}
