/// Unified term -> image matcher.
///
/// Strategies run in priority order and the first one that yields anything wins:
/// 1. direct figure references in the definition
/// 2. caption matching (exact phrase, partial word overlap, single-word containment)
/// 3. fuzzy similarity between term and caption
/// 4. fallback to the first images of the term's document
use std::collections::{BTreeMap, HashSet};

use atlas_common::model::{ImageAssociation, MatchType, Term};
use atlas_common::text::{contains_phrase, is_stop_word, normalize_text, words};

use crate::config::MatcherConfig;
use crate::figures::{extract_figure_references, image_for_figure, image_number};
use crate::similarity::ratio;

/// Share of a compound term's words a caption must contain for a partial match.
const PARTIAL_MATCH_RATIO: f64 = 0.7;
/// Terms must be longer than this (normalized chars) to be fuzzy matched.
const FUZZY_MIN_TERM_CHARS: usize = 8;

pub struct TermImageMatcher {
    config: MatcherConfig,
}

impl TermImageMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Candidate images for `term` among its document's `captions` and `images`.
    pub fn match_term(
        &self,
        term: &Term,
        captions: &BTreeMap<u32, String>,
        images: &[String],
    ) -> Vec<ImageAssociation> {
        if images.is_empty() {
            return Vec::new();
        }

        let found = direct_references(term, captions, images);
        if !found.is_empty() {
            return found;
        }

        let normalized_term = normalize_text(&term.term);
        if normalized_term.is_empty() {
            return self.fallback(term, captions, images);
        }
        let normalized_captions: Vec<(u32, &String, String)> = captions
            .iter()
            .map(|(figure, caption)| (*figure, caption, normalize_text(caption)))
            .collect();

        let found = caption_matches(term, &normalized_term, &normalized_captions, images);
        if !found.is_empty() {
            return found;
        }

        let found = self.fuzzy_matches(term, &normalized_term, &normalized_captions, images);
        if !found.is_empty() {
            return found;
        }

        self.fallback(term, captions, images)
    }

    fn fuzzy_matches(
        &self,
        term: &Term,
        normalized_term: &str,
        captions: &[(u32, &String, String)],
        images: &[String],
    ) -> Vec<ImageAssociation> {
        if normalized_term.chars().count() <= FUZZY_MIN_TERM_CHARS {
            return Vec::new();
        }
        captions
            .iter()
            .filter_map(|(figure, caption, normalized)| {
                let similarity = ratio(normalized_term, normalized);
                if similarity < self.config.fuzzy_threshold {
                    return None;
                }
                let image = image_for_figure(images, *figure)?;
                Some(association(
                    term,
                    image,
                    *figure,
                    caption,
                    Some(similarity),
                    MatchType::Fuzzy,
                ))
            })
            .collect()
    }

    fn fallback(
        &self,
        term: &Term,
        captions: &BTreeMap<u32, String>,
        images: &[String],
    ) -> Vec<ImageAssociation> {
        images
            .iter()
            .take(self.config.fallback_images)
            .enumerate()
            .map(|(i, image)| {
                let figure = image_number(image).unwrap_or(i as u32 + 1);
                let caption = captions
                    .get(&figure)
                    .cloned()
                    .unwrap_or_else(|| format!("Document image (Fig. {figure})"));
                association(term, image, figure, &caption, None, MatchType::Fallback)
            })
            .collect()
    }
}

fn direct_references(
    term: &Term,
    captions: &BTreeMap<u32, String>,
    images: &[String],
) -> Vec<ImageAssociation> {
    extract_figure_references(&term.definition)
        .into_iter()
        .filter_map(|figure| {
            let image = image_for_figure(images, figure)?;
            let caption = captions
                .get(&figure)
                .cloned()
                .unwrap_or_else(|| format!("Fig. {figure}"));
            Some(association(
                term,
                image,
                figure,
                &caption,
                Some(1.0),
                MatchType::DirectReference,
            ))
        })
        .collect()
}

fn caption_matches(
    term: &Term,
    normalized_term: &str,
    captions: &[(u32, &String, String)],
    images: &[String],
) -> Vec<ImageAssociation> {
    let meaningful: Vec<&str> = words(normalized_term)
        .into_iter()
        .filter(|w| w.chars().count() > 2 && !is_stop_word(w))
        .collect();

    captions
        .iter()
        .filter_map(|(figure, caption, normalized)| {
            let (match_type, confidence) = match_caption(normalized_term, &meaningful, normalized)?;
            let image = image_for_figure(images, *figure)?;
            Some(association(
                term,
                image,
                *figure,
                caption,
                Some(confidence),
                match_type,
            ))
        })
        .collect()
}

/// How a normalized caption mentions a normalized term, if at all.
fn match_caption(
    normalized_term: &str,
    meaningful: &[&str],
    caption: &str,
) -> Option<(MatchType, f64)> {
    if contains_phrase(caption, normalized_term) {
        return Some((MatchType::Exact, 1.0));
    }

    if meaningful.len() >= 2 {
        let caption_words: HashSet<&str> = words(caption).into_iter().collect();
        let matched = meaningful.iter().filter(|w| caption_words.contains(*w)).count();
        let share = matched as f64 / meaningful.len() as f64;
        return (share >= PARTIAL_MATCH_RATIO).then_some((MatchType::Partial, share));
    }

    let start = caption.find(normalized_term)?;
    let end = start + normalized_term.len();
    let span_start = caption[..start].rfind(' ').map(|i| i + 1).unwrap_or(0);
    let span_end = caption[end..]
        .find(' ')
        .map(|i| end + i)
        .unwrap_or(caption.len());
    let span_chars = caption[span_start..span_end].chars().count().max(1);
    let confidence = normalized_term.chars().count() as f64 / span_chars as f64;
    Some((MatchType::CaptionMatch, confidence))
}

fn association(
    term: &Term,
    image: &str,
    figure: u32,
    caption: &str,
    confidence: Option<f64>,
    match_type: MatchType,
) -> ImageAssociation {
    ImageAssociation {
        term: term.term.clone(),
        image: image.to_string(),
        figure,
        caption: caption.to_string(),
        confidence: confidence.map(|c| c.clamp(0.0, 1.0)),
        match_type,
        match_score: None,
        matched_components: Vec::new(),
    }
}
