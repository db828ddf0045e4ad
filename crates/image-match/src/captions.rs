/// Figure caption extraction from raw document text.
///
/// A caption starts at `FIG. N.` (case-insensitive, period and letter suffix optional)
/// and runs to the next line starting with `FIG.`, the next blank line, or the end.
use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use atlas_common::model::CaptionIndex;
use atlas_common::text::{collapse_whitespace, truncate_with_ellipsis};

static CAPTION_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)FIG\.?\s+(\d+)[a-z]?\.?\s+").expect("valid regex")
});
static CAPTION_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\n\s*FIG\.|\n\n").expect("valid regex"));

const CAPTION_MAX_CHARS: usize = 200;

/// Figure number -> caption text for one document. A later caption with the same
/// number overwrites an earlier one.
pub fn extract_captions(text: &str) -> BTreeMap<u32, String> {
    let mut captions = BTreeMap::new();
    let mut pos = 0;
    while let Some(caps) = CAPTION_START.captures_at(text, pos) {
        let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let body_start = whole.end();
        let Some(first_char) = text[body_start..].chars().next() else {
            break;
        };
        let body_end = CAPTION_END
            .find_at(text, body_start + first_char.len_utf8())
            .map(|m| m.start())
            .unwrap_or(text.len());
        pos = body_end;

        let Ok(figure) = number.as_str().parse::<u32>() else {
            debug!(number = number.as_str(), "figure number out of range, skipping");
            continue;
        };
        let caption = collapse_whitespace(&text[body_start..body_end]);
        if caption.is_empty() {
            continue;
        }
        captions.insert(figure, truncate_with_ellipsis(&caption, CAPTION_MAX_CHARS));
    }
    captions
}

/// Captions for every document that has at least one.
pub fn build_caption_index(documents: &[(String, String)]) -> CaptionIndex {
    documents
        .iter()
        .filter_map(|(key, text)| {
            let captions = extract_captions(text);
            (!captions.is_empty()).then(|| (key.clone(), captions))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiline_caption_until_blank_line() {
        let text = "Body text.\nFIG. 3. The antihelix, a Y-shaped ridge,\nseparates the concha from the scapha.\n\nMore body text.";
        let captions = extract_captions(text);
        assert_eq!(captions.len(), 1);
        assert_eq!(
            captions[&3],
            "The antihelix, a Y-shaped ridge, separates the concha from the scapha."
        );
    }

    #[test]
    fn test_consecutive_captions_split_on_fig_line() {
        let text = "FIG. 1. Normal ear.\nFIG. 2a. Prominent lobe with crease.\n";
        let captions = extract_captions(text);
        assert_eq!(captions[&1], "Normal ear.");
        assert_eq!(captions[&2], "Prominent lobe with crease.");
    }

    #[test]
    fn test_later_caption_overwrites() {
        let text = "Fig 4 first mention\n\nFIG. 4. Actual caption of figure four.";
        let captions = extract_captions(text);
        assert_eq!(captions[&4], "Actual caption of figure four.");
    }

    #[test]
    fn test_long_caption_capped() {
        let text = format!("FIG. 7. {}", "word ".repeat(100));
        let captions = extract_captions(&text);
        assert_eq!(captions[&7].chars().count(), 200);
        assert!(captions[&7].ends_with("..."));
    }

    #[test]
    fn test_index_skips_documents_without_captions() {
        let docs = vec![
            ("ear".to_string(), "FIG. 1. Ear.".to_string()),
            ("nose".to_string(), "No figures here.".to_string()),
        ];
        let index = build_caption_index(&docs);
        assert_eq!(index.len(), 1);
        assert_eq!(index["ear"][&1], "Ear.");
    }
}
