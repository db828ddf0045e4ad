/// Pruning of matcher output: duplicate images and uninformative captions.
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use atlas_common::denoise::{is_generic_caption, TextDenoiser};
use atlas_common::model::ImageAssociation;

static STANDARD_TERMINOLOGY_ARTIFACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_standard_terminology_for_t-?").expect("valid regex"));
static IMAGE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_]\d{1,3}\.png$").expect("valid regex"));

/// (base image name, figure number) identifying one picture.
pub fn dedup_key(association: &ImageAssociation) -> (String, u32) {
    let base = IMAGE_SUFFIX.replace(&association.image, "");
    let base = STANDARD_TERMINOLOGY_ARTIFACT.replace_all(&base, "");
    (base.into_owned(), association.figure)
}

/// Collapse associations sharing a [`dedup_key`]. The survivor takes the slot of the
/// first occurrence and carries the most informative caption.
pub fn dedupe(associations: Vec<ImageAssociation>) -> Vec<ImageAssociation> {
    let mut slots: HashMap<(String, u32), usize> = HashMap::new();
    let mut kept: Vec<ImageAssociation> = Vec::with_capacity(associations.len());
    for association in associations {
        let key = dedup_key(&association);
        match slots.get(&key) {
            Some(&slot) => {
                if more_informative(&association.caption, &kept[slot].caption) {
                    kept[slot] = association;
                }
            }
            None => {
                slots.insert(key, kept.len());
                kept.push(association);
            }
        }
    }
    kept
}

/// A non-generic caption beats a generic one; otherwise the longer caption wins.
fn more_informative(candidate: &str, current: &str) -> bool {
    match (is_generic_caption(candidate), is_generic_caption(current)) {
        (false, true) => true,
        (true, false) => false,
        _ => candidate.chars().count() > current.chars().count(),
    }
}

/// Denoise captions and drop associations left with an empty or generic caption.
pub fn clean_captions<D: TextDenoiser>(
    associations: Vec<ImageAssociation>,
    denoiser: &D,
) -> Vec<ImageAssociation> {
    associations
        .into_iter()
        .filter_map(|mut association| {
            let cleaned = denoiser.denoise(&association.caption);
            if cleaned.is_empty() || is_generic_caption(&cleaned) {
                return None;
            }
            association.caption = cleaned;
            Some(association)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_common::denoise::GarbageDenoiser;
    use atlas_common::model::MatchType;

    fn association(image: &str, figure: u32, caption: &str) -> ImageAssociation {
        ImageAssociation {
            term: "Antihelix".to_string(),
            image: image.to_string(),
            figure,
            caption: caption.to_string(),
            confidence: Some(1.0),
            match_type: MatchType::DirectReference,
            match_score: None,
            matched_components: Vec::new(),
        }
    }

    #[test]
    fn test_key_strips_suffix_and_artifact() {
        assert_eq!(
            dedup_key(&association("elements_of_morphology_ear-003.png", 3, "")),
            ("elements_of_morphology_ear".to_string(), 3)
        );
        assert_eq!(
            dedup_key(&association("elements_of_morphology_standard_terminology_for_t-012.png", 12, "")),
            ("elements_of_morphology".to_string(), 12)
        );
    }

    #[test]
    fn test_dedupe_keeps_informative_caption() {
        let deduped = dedupe(vec![
            association("elements_of_morphology_ear-003.png", 3, "Fig. 3"),
            association(
                "elements_of_morphology_ear_003.png",
                3,
                "Fig. 3. Detailed view of the antihelix",
            ),
        ]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].caption, "Fig. 3. Detailed view of the antihelix");
        assert_eq!(deduped[0].image, "elements_of_morphology_ear_003.png");
    }

    #[test]
    fn test_generic_caption_never_replaces_informative_one() {
        let deduped = dedupe(vec![
            association("ear-003.png", 3, "Ridge"),
            association("ear_03.png", 3, "Fig. 3."),
        ]);
        assert_eq!(deduped[0].caption, "Ridge");
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let input = vec![
            association("ear-001.png", 1, "Normal ear"),
            association("ear-003.png", 3, "Fig. 3"),
            association("ear_003.png", 3, "Antihelix in profile"),
            association("nose-003.png", 3, "Nasal bridge"),
        ];
        let once = dedupe(input);
        let twice = dedupe(once.clone());
        assert_eq!(once.len(), 3);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clean_captions_drops_generic() {
        let cleaned = clean_captions(
            vec![
                association("ear-001.png", 1, "Fig. 1"),
                association("ear-002.png", 2, "Prominent antihelix [3, 4]"),
                association("ear-004.png", 4, "https://x.org/fig4"),
            ],
            &GarbageDenoiser::new(),
        );
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].caption, "Prominent antihelix");
    }
}
