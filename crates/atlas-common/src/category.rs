/// Anatomical category assignment from document file names.

/// Ordered keyword table; the first category with a keyword contained in the
/// lowercased file name wins.
const TOPICS: &[(&str, &[&str])] = &[
    ("ear", &["ear", "auricul"]),
    ("head_face", &["head", "face", "facial", "cranium"]),
    ("nose_philtrum", &["nose", "philtrum", "nasal"]),
    ("lips_mouth", &["lip", "mouth", "oral"]),
    ("periorbital", &["periorbital", "eye", "eyelid"]),
    ("hands_feet", &["hand", "feet", "finger", "toe", "nail"]),
    ("genitalia", &["genital"]),
    ("teeth", &["teeth", "dental", "tooth", "dent"]),
    ("introduction", &["introduction"]),
    ("phenotypic_variations", &["phenotypic", "variation"]),
];

pub const DEFAULT_CATEGORY: &str = "general";

/// Category for a document, e.g. "Elements of morphology: the ear.pdf" -> "ear".
pub fn categorize(file_name: &str) -> &'static str {
    let name = file_name.to_lowercase();
    TOPICS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| name.contains(k)))
        .map(|(topic, _)| *topic)
        .unwrap_or(DEFAULT_CATEGORY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize() {
        assert_eq!(
            categorize("Elements of morphology - Standard terminology for the ear.pdf"),
            "ear"
        );
        assert_eq!(
            categorize("Elements of Morphology: Standard Terminology for the Nose and Philtrum"),
            "nose_philtrum"
        );
        assert_eq!(categorize("PERIORBITAL region"), "periorbital");
        assert_eq!(categorize("Standard terminology for the hands and feet"), "hands_feet");
        assert_eq!(categorize("something unrelated"), "general");
    }

    #[test]
    fn test_first_matching_topic_wins() {
        // "auricular" hits "ear" before anything else could.
        assert_eq!(categorize("auricular tags of the face"), "ear");
    }
}
