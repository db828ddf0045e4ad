/// Term extraction over every extracted document.
///
/// Parse -> categorize -> dedupe -> sort -> denoise -> resolve "See X" references,
/// then write the term list, the per-category view, the index and the reference map.
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use tracing::{debug, info};

use atlas_common::category::categorize;
use atlas_common::denoise::TextDenoiser;
use atlas_common::model::{ExtractionRecord, Term, TermsIndex};
use atlas_common::store::AtlasStore;

use crate::error::AppError;
use crate::parser::Layout;
use crate::references::{detect_see_reference, reference_definition};

const INDEX_SAMPLE_SIZE: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub documents: usize,
    pub terms: usize,
    pub references: usize,
    pub categories: usize,
}

pub struct TermPipeline<'a, S: AtlasStore, D: TextDenoiser> {
    store: &'a S,
    denoiser: D,
    layout: Layout,
}

impl<'a, S: AtlasStore, D: TextDenoiser> TermPipeline<'a, S, D> {
    pub fn new(store: &'a S, denoiser: D, layout: Layout) -> Self {
        Self {
            store,
            denoiser,
            layout,
        }
    }

    pub fn run(&self) -> Result<ExtractionReport, AppError> {
        let records = self.store.load_metadata()?;

        let mut all_terms = Vec::new();
        let mut documents = 0;
        for record in &records {
            let Some(text) = self.store.load_document_text(&record.text_file)? else {
                debug!(text_file = %record.text_file, "text file missing, skipping");
                continue;
            };
            documents += 1;
            let terms = self.parse_document(record, &text);
            info!(
                document = %record.safe_name,
                terms = terms.len(),
                layout = ?self.layout.resolve(&text),
                "parsed document"
            );
            all_terms.extend(terms);
        }

        let mut terms = dedupe_and_sort(all_terms);
        let references = clean_terms(&mut terms, &self.denoiser);
        let by_category = group_by_category(&terms);
        let index = build_index(&terms, &by_category);

        self.store.save_terms(&terms)?;
        self.store.save_terms_by_category(&by_category)?;
        self.store.save_terms_index(&index)?;
        self.store.save_term_references(&references)?;

        for (category, count) in &index.categories {
            info!(category = %category, terms = count, "category terms");
        }
        Ok(ExtractionReport {
            documents,
            terms: terms.len(),
            references: references.len(),
            categories: by_category.len(),
        })
    }

    fn parse_document(&self, record: &ExtractionRecord, text: &str) -> Vec<Term> {
        let category = categorize(&record.original_filename);
        let source = Path::new(&record.text_file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&record.text_file)
            .to_string();

        self.layout
            .parser_for(text)
            .parse(text)
            .into_iter()
            .map(|parsed| Term {
                term: parsed.term,
                definition: parsed.definition,
                category: category.to_string(),
                document: record.title().to_string(),
                source: source.clone(),
                comment: parsed.comment,
                reference_to: None,
            })
            .collect()
    }
}

/// Keep the first term per (lowercased term, category); order by category, then term.
pub fn dedupe_and_sort(terms: Vec<Term>) -> Vec<Term> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Term> = terms
        .into_iter()
        .filter(|t| seen.insert((t.term.trim().to_lowercase(), t.category.clone())))
        .collect();
    unique.sort_by_cached_key(|t| (t.category.clone(), t.term.to_lowercase()));
    unique
}

/// Denoise definitions and comments, then turn "See X" definitions into references.
///
/// Returns term -> referenced term.
pub fn clean_terms<D: TextDenoiser>(terms: &mut [Term], denoiser: &D) -> BTreeMap<String, String> {
    let mut references = BTreeMap::new();
    for term in terms.iter_mut() {
        let cleaned = denoiser.denoise(&term.definition);
        term.comment = term
            .comment
            .as_deref()
            .map(|c| denoiser.denoise(c))
            .filter(|c| !c.is_empty());

        match detect_see_reference(&cleaned) {
            Some(target) => {
                debug!(term = %term.term, target = %target, "cross reference");
                term.definition = reference_definition(&target);
                references.insert(term.term.clone(), target.clone());
                term.reference_to = Some(target);
            }
            None => term.definition = cleaned,
        }
    }
    references
}

/// Terms grouped by category, each group ordered by lowercased term.
pub fn group_by_category(terms: &[Term]) -> BTreeMap<String, Vec<Term>> {
    let mut by_category: BTreeMap<String, Vec<Term>> = BTreeMap::new();
    for term in terms {
        by_category
            .entry(term.category.clone())
            .or_default()
            .push(term.clone());
    }
    for group in by_category.values_mut() {
        group.sort_by_cached_key(|t| t.term.to_lowercase());
    }
    by_category
}

pub fn build_index(terms: &[Term], by_category: &BTreeMap<String, Vec<Term>>) -> TermsIndex {
    TermsIndex {
        total_terms: terms.len(),
        categories: by_category
            .iter()
            .map(|(category, group)| (category.clone(), group.len()))
            .collect(),
        sample_terms: terms
            .iter()
            .take(INDEX_SAMPLE_SIZE)
            .map(|t| t.term.clone())
            .collect(),
    }
}
