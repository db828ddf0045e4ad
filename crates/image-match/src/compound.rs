/// Re-ranking of a term's candidate images by how many of its word components the
/// caption mentions. Longer components weigh more.
use atlas_common::model::ImageAssociation;
use atlas_common::text::{is_stop_word, normalize_text, words};

const MULTI_COMPONENT_BONUS: f64 = 1.5;
const WHOLE_TERM_BONUS: f64 = 2.0;

/// Word components of a possibly compound term, in order and without repeats.
///
/// `"Palpebral fissure, lateral canthus"` ->
/// `["palpebral", "fissure", "palpebralfissure", "lateral", "canthus", "lateralcanthus"]`
pub fn compound_components(term: &str) -> Vec<String> {
    let mut components: Vec<String> = Vec::new();
    for part in term.split(',') {
        let part = normalize_text(part);
        let part_words: Vec<&str> = words(&part)
            .into_iter()
            .filter(|w| w.chars().count() > 2 && !is_stop_word(w))
            .collect();
        components.extend(part_words.iter().map(|w| w.to_string()));
        if part_words.len() > 1 {
            components.push(part.replace([' ', '-'], ""));
        }
    }

    let mut unique = Vec::with_capacity(components.len());
    for component in components {
        if component.chars().count() > 2 && !unique.contains(&component) {
            unique.push(component);
        }
    }
    unique
}

/// Score every association against the term's components and keep the best `max`.
///
/// Associations whose caption mentions no component keep a score of 0 and sort last;
/// ties keep their incoming order.
pub fn rescore(term: &str, associations: Vec<ImageAssociation>, max: usize) -> Vec<ImageAssociation> {
    let components = compound_components(term);
    let squashed_term = normalize_text(term).replace(' ', "");

    let mut scored: Vec<ImageAssociation> = associations
        .into_iter()
        .map(|mut association| {
            let caption = normalize_text(&association.caption);
            let matched: Vec<String> = components
                .iter()
                .filter(|c| caption.contains(c.as_str()))
                .cloned()
                .collect();

            let mut score: f64 = matched.iter().map(|c| c.chars().count() as f64).sum();
            if matched.len() > 1 {
                score *= MULTI_COMPONENT_BONUS;
            }
            if caption.replace(' ', "").contains(&squashed_term) {
                score *= WHOLE_TERM_BONUS;
            }

            association.match_score = Some(score);
            association.matched_components = matched;
            association
        })
        .collect();

    scored.sort_by(|a, b| {
        b.match_score
            .unwrap_or(0.0)
            .total_cmp(&a.match_score.unwrap_or(0.0))
    });
    scored.truncate(max);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_common::model::MatchType;

    fn association(image: &str, caption: &str) -> ImageAssociation {
        ImageAssociation {
            term: "Palpebral fissure".to_string(),
            image: image.to_string(),
            figure: 1,
            caption: caption.to_string(),
            confidence: Some(1.0),
            match_type: MatchType::Partial,
            match_score: None,
            matched_components: Vec::new(),
        }
    }

    #[test]
    fn test_components_of_compound_term() {
        assert_eq!(
            compound_components("Palpebral fissure, lateral canthus"),
            vec![
                "palpebral",
                "fissure",
                "palpebralfissure",
                "lateral",
                "canthus",
                "lateralcanthus"
            ]
        );
    }

    #[test]
    fn test_components_drop_short_and_stop_words() {
        assert_eq!(compound_components("Crus of the helix"), vec!["crus", "helix", "crusofthehelix"]);
        assert_eq!(compound_components("Ear"), vec!["ear"]);
        assert!(compound_components("of, an").is_empty());
    }

    #[test]
    fn test_components_have_no_repeats() {
        let components = compound_components("Helix, helix root, Helix");
        assert_eq!(components, vec!["helix", "root", "helixroot"]);
    }

    #[test]
    fn test_rescore_orders_by_score() {
        let ranked = rescore(
            "Palpebral fissure",
            vec![
                association("a.png", "Lateral view of the nose"),
                association("b.png", "Short palpebral fissure in a child"),
                association("c.png", "Palpebral region"),
            ],
            6,
        );
        let images: Vec<&str> = ranked.iter().map(|a| a.image.as_str()).collect();
        assert_eq!(images, vec!["b.png", "c.png", "a.png"]);
        // (9 + 7) * 1.5 * 2
        assert_eq!(ranked[0].match_score, Some(48.0));
        assert_eq!(ranked[0].matched_components, vec!["palpebral", "fissure"]);
        assert_eq!(ranked[1].match_score, Some(9.0));
        assert_eq!(ranked[2].match_score, Some(0.0));
        assert!(ranked[2].matched_components.is_empty());
    }

    #[test]
    fn test_rescore_keeps_top_n_stable() {
        let ranked = rescore(
            "Palpebral fissure",
            vec![
                association("a.png", "Palpebral"),
                association("b.png", "Palpebral"),
                association("c.png", "Palpebral"),
            ],
            2,
        );
        let images: Vec<&str> = ranked.iter().map(|a| a.image.as_str()).collect();
        assert_eq!(images, vec!["a.png", "b.png"]);
    }
}
