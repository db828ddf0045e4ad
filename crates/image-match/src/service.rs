/// Term/image mapping over the whole data set.
///
/// Loads terms, the image catalog and every document text, extracts figure captions,
/// matches each term, then dedupes, cleans and re-ranks its candidates before writing
/// the term -> images map, the list of illustrated terms and the image -> terms index.
use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use atlas_common::denoise::TextDenoiser;
use atlas_common::model::{AssociationMap, CaptionIndex, ImageTermLink, ImageTermMap, MatchType};
use atlas_common::store::AtlasStore;

use crate::captions::build_caption_index;
use crate::compound::rescore;
use crate::error::AppError;
use crate::matcher::TermImageMatcher;
use crate::prune::{clean_captions, dedupe};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingReport {
    pub terms: usize,
    pub terms_with_images: usize,
    pub associations: usize,
    pub images: usize,
    pub caption_documents: usize,
    pub by_match_type: BTreeMap<String, usize>,
}

pub struct MappingService<'a, S: AtlasStore, D: TextDenoiser> {
    store: &'a S,
    denoiser: D,
    matcher: TermImageMatcher,
}

impl<'a, S: AtlasStore, D: TextDenoiser> MappingService<'a, S, D> {
    pub fn new(store: &'a S, denoiser: D, matcher: TermImageMatcher) -> Self {
        Self {
            store,
            denoiser,
            matcher,
        }
    }

    pub fn run(&self) -> Result<MappingReport, AppError> {
        let terms = self.store.load_terms()?;
        let catalog = self.store.load_catalog()?;
        let captions = build_caption_index(&self.store.document_texts()?);
        self.store.save_captions(&captions)?;
        info!(
            terms = terms.len(),
            documents = catalog.by_category.len(),
            caption_documents = captions.len(),
            "inputs loaded"
        );

        let no_captions = BTreeMap::new();
        let max_images = self.matcher.config().max_images_per_term;
        let mut associations = AssociationMap::new();
        let mut terms_with_images = Vec::new();
        for term in &terms {
            // Same label in another category: the first one with images keeps the slot.
            if associations.contains_key(&term.term) {
                debug!(term = %term.term, "term already mapped, skipping");
                continue;
            }
            let document = term.document_key();
            let images = catalog.images_for(document);
            let document_captions = captions_for(&captions, document).unwrap_or(&no_captions);

            let found = self.matcher.match_term(term, document_captions, images);
            let found = dedupe(found);
            let found = clean_captions(found, &self.denoiser);
            let found = rescore(&term.term, found, max_images);
            if found.is_empty() {
                continue;
            }
            debug!(term = %term.term, images = found.len(), "term mapped");
            terms_with_images.push(term.term.clone());
            associations.insert(term.term.clone(), found);
        }

        let image_terms = build_image_index(&associations);
        self.store.save_associations(&associations)?;
        self.store.save_terms_with_images(&terms_with_images)?;
        self.store.save_image_terms(&image_terms)?;

        Ok(MappingReport {
            terms: terms.len(),
            terms_with_images: terms_with_images.len(),
            associations: associations.values().map(Vec::len).sum(),
            images: image_terms.len(),
            caption_documents: captions.len(),
            by_match_type: count_by_match_type(&associations),
        })
    }
}

/// Captions of a document: exact key first, then key containment either way.
fn captions_for<'c>(index: &'c CaptionIndex, document: &str) -> Option<&'c BTreeMap<u32, String>> {
    if let Some(captions) = index.get(document) {
        return Some(captions);
    }
    if document.is_empty() {
        return None;
    }
    index
        .iter()
        .find(|(key, _)| key.contains(document) || document.contains(key.as_str()))
        .map(|(_, captions)| captions)
}

/// Image file -> every term it illustrates.
pub fn build_image_index(associations: &AssociationMap) -> ImageTermMap {
    let mut index = ImageTermMap::new();
    for found in associations.values() {
        for association in found {
            index
                .entry(association.image.clone())
                .or_default()
                .push(ImageTermLink {
                    term: association.term.clone(),
                    confidence: association.confidence,
                    match_type: association.match_type,
                    figure: association.figure,
                    caption: association.caption.clone(),
                });
        }
    }
    index
}

fn count_by_match_type(associations: &AssociationMap) -> BTreeMap<String, usize> {
    let mut counts: HashMap<MatchType, usize> = HashMap::new();
    for association in associations.values().flatten() {
        *counts.entry(association.match_type).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(match_type, count)| (match_type.to_string(), count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_common::config::AtlasPaths;
    use atlas_common::denoise::GarbageDenoiser;
    use atlas_common::model::{CatalogEntry, ImageCatalog, Term};
    use atlas_common::store::{files, JsonStore};

    use crate::config::MatcherConfig;

    const EAR: &str = "elements_of_morphology_ear";

    fn term(name: &str, definition: &str) -> Term {
        Term {
            term: name.to_string(),
            definition: definition.to_string(),
            category: "ear".to_string(),
            document: "Elements of morphology - ear".to_string(),
            source: format!("{EAR}.txt"),
            comment: None,
            reference_to: None,
        }
    }

    fn seeded_store(dir: &std::path::Path, terms: &[Term]) -> JsonStore {
        let paths = AtlasPaths::rooted_at(dir);
        std::fs::create_dir_all(&paths.data_dir).unwrap();
        std::fs::create_dir_all(&paths.output_dir).unwrap();
        std::fs::write(
            paths.data_dir.join(format!("{EAR}.txt")),
            "Glossary body.\n\
             FIG. 1. Normal ear, lateral view.\n\
             FIG. 3. The antihelix, a Y-shaped ridge,\nseparates the concha from the scapha.\n\n\
             Antihelix: A ridge.\n",
        )
        .unwrap();

        let store = JsonStore::new(paths);
        let mut catalog = ImageCatalog::default();
        catalog.by_category.insert(
            EAR.to_string(),
            CatalogEntry {
                category: "ear".to_string(),
                document: "Elements of morphology - ear".to_string(),
                all_images: vec![
                    format!("{EAR}-001.png"),
                    format!("{EAR}-003.png"),
                    format!("{EAR}-005.png"),
                ],
            },
        );
        store.save_catalog(&catalog).unwrap();
        store.save_terms(terms).unwrap();
        store
    }

    fn service(store: &JsonStore) -> MappingService<'_, JsonStore, GarbageDenoiser> {
        MappingService::new(
            store,
            GarbageDenoiser::new(),
            TermImageMatcher::new(MatcherConfig::default()),
        )
    }

    #[test]
    fn test_antihelix_maps_to_figure_three() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(dir.path(), &[term("Antihelix", "A Y-shaped ridge.")]);

        let report = service(&store).run().unwrap();
        assert_eq!(report.terms_with_images, 1);
        assert_eq!(report.by_match_type["exact"], 1);

        let associations = store.load_associations().unwrap();
        let found = &associations["Antihelix"];
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].figure, 3);
        assert_eq!(found[0].image, format!("{EAR}-003.png"));
        assert_eq!(found[0].confidence, Some(1.0));
        // "antihelix" (9) doubled for the whole-term bonus
        assert_eq!(found[0].match_score, Some(18.0));
        assert_eq!(
            found[0].caption,
            "The antihelix, a Y-shaped ridge, separates the concha from the scapha."
        );

        let captions = store.load_captions().unwrap();
        assert_eq!(captions[EAR].len(), 2);
        assert!(store.paths().output_file(files::IMAGE_TERMS).exists());
    }

    #[test]
    fn test_generic_direct_reference_is_dropped_and_others_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(
            dir.path(),
            &[
                // Figure 5 has an image but only the synthetic "Fig. 5" caption.
                term("Pinna", "The external ear (Figs. 1, 5)."),
                term("Tragus", "A small flap."),
            ],
        );

        let report = service(&store).run().unwrap();
        let associations = store.load_associations().unwrap();
        assert_eq!(associations["Pinna"].len(), 1);
        assert_eq!(associations["Pinna"][0].match_type, MatchType::DirectReference);
        assert_eq!(associations["Pinna"][0].caption, "Normal ear, lateral view.");
        assert_eq!(associations["Tragus"].len(), 2);
        assert!(associations["Tragus"]
            .iter()
            .all(|a| a.match_type == MatchType::Fallback));
        assert_eq!(report.images, 2);
    }

    #[test]
    fn test_rerun_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(dir.path(), &[term("Antihelix", "A Y-shaped ridge.")]);
        service(&store).run().unwrap();
        let first = store.load_associations().unwrap();
        service(&store).run().unwrap();
        assert_eq!(store.load_associations().unwrap(), first);
    }

    #[test]
    fn test_image_index_lists_every_term() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(
            dir.path(),
            &[term("Antihelix", "x"), term("Concha", "Bowl of the ear (Fig. 3).")],
        );
        service(&store).run().unwrap();

        let associations = store.load_associations().unwrap();
        let index = build_image_index(&associations);
        let linked: Vec<&str> = index[&format!("{EAR}-003.png")]
            .iter()
            .map(|l| l.term.as_str())
            .collect();
        assert_eq!(linked, vec!["Antihelix", "Concha"]);
    }

    #[test]
    fn test_missing_terms_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(AtlasPaths::rooted_at(dir.path()));
        assert!(service(&store).run().is_err());
    }
}
