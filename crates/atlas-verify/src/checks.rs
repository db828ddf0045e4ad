/// Output and data-invariant checks run after the pipeline.
use std::collections::BTreeMap;
use std::path::Path;

use atlas_common::config::AtlasPaths;
use atlas_common::error::CommonError;
use atlas_common::model::{DocumentContent, ImageCatalog, MatchType, Summary, Term, TermsIndex};
use atlas_common::store::{files, AtlasStore, JsonStore};

/// Files every complete run leaves in the output directory.
const REQUIRED_OUTPUTS: &[&str] = &[
    files::TERMS,
    files::TERMS_BY_CATEGORY,
    files::TERMS_INDEX,
    files::SUMMARY,
    files::CONTENT_BY_CATEGORY,
    files::IMAGES_CATALOG,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub status: Status,
    /// Findings with the level each should be reported at.
    pub details: Vec<(Status, String)>,
}

impl CheckOutcome {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            status: Status::Pass,
            details: Vec::new(),
        }
    }

    fn note(&mut self, detail: impl Into<String>) {
        self.details.push((Status::Pass, detail.into()));
    }

    fn warn(&mut self, detail: impl Into<String>) {
        if self.status == Status::Pass {
            self.status = Status::Warn;
        }
        self.details.push((Status::Warn, detail.into()));
    }

    fn fail(&mut self, detail: impl Into<String>) {
        self.status = Status::Fail;
        self.details.push((Status::Fail, detail.into()));
    }
}

/// Run every check in order.
pub fn run_all(store: &JsonStore) -> Vec<CheckOutcome> {
    let paths = store.paths();
    vec![
        check_files(paths),
        check_integrity(store),
        check_images(&paths.images_dir),
        check_pdfs(&paths.pdf_dir),
        check_invariants(store),
    ]
}

/// True when no check failed; warnings do not count.
pub fn all_passed(outcomes: &[CheckOutcome]) -> bool {
    outcomes.iter().all(|o| o.status != Status::Fail)
}

pub fn check_files(paths: &AtlasPaths) -> CheckOutcome {
    let mut outcome = CheckOutcome::new("required files");
    for name in REQUIRED_OUTPUTS {
        let path = paths.output_file(name);
        if path.exists() {
            outcome.note(format!("found {}", path.display()));
        } else {
            outcome.fail(format!("missing {}", path.display()));
        }
    }
    outcome
}

/// Every organized file parses into its model type.
pub fn check_integrity(store: &JsonStore) -> CheckOutcome {
    let mut outcome = CheckOutcome::new("data integrity");
    let paths = store.paths();

    match store.load_terms() {
        Ok(terms) => match (terms.first(), terms.last()) {
            (Some(first), Some(last)) => outcome.note(format!(
                "{} terms, first {:?}, last {:?}",
                terms.len(),
                first.term,
                last.term
            )),
            _ => outcome.fail("term list is empty"),
        },
        Err(e) => outcome.fail(e.to_string()),
    }

    match store.read_json::<BTreeMap<String, Vec<Term>>>(&paths.output_file(files::TERMS_BY_CATEGORY)) {
        Ok(by_category) => {
            let mut sizes: Vec<(&String, usize)> =
                by_category.iter().map(|(c, t)| (c, t.len())).collect();
            sizes.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
            for (category, count) in sizes {
                outcome.note(format!("category {category}: {count} terms"));
            }
        }
        Err(e) => outcome.fail(e.to_string()),
    }

    match store.read_json::<TermsIndex>(&paths.output_file(files::TERMS_INDEX)) {
        Ok(index) => outcome.note(format!("{} terms indexed", index.total_terms)),
        Err(e) => outcome.fail(e.to_string()),
    }

    match store.read_json::<Summary>(&paths.output_file(files::SUMMARY)) {
        Ok(summary) => outcome.note(format!(
            "{} documents, {} images",
            summary.total_documents, summary.total_images
        )),
        Err(e) => outcome.fail(e.to_string()),
    }

    match store.read_json::<BTreeMap<String, Vec<DocumentContent>>>(
        &paths.output_file(files::CONTENT_BY_CATEGORY),
    ) {
        Ok(content) => outcome.note(format!("{} content categories", content.len())),
        Err(e) => outcome.fail(e.to_string()),
    }

    match store.read_json::<ImageCatalog>(&paths.output_file(files::IMAGES_CATALOG)) {
        Ok(catalog) => outcome.note(format!(
            "{} catalogued documents, {} images",
            catalog.by_category.len(),
            catalog.total_images()
        )),
        Err(e) => outcome.fail(e.to_string()),
    }

    outcome
}

pub fn check_images(images_dir: &Path) -> CheckOutcome {
    let mut outcome = CheckOutcome::new("images");
    let Ok(entries) = std::fs::read_dir(images_dir) else {
        outcome.fail(format!("images directory {} does not exist", images_dir.display()));
        return outcome;
    };
    let mut pngs: Vec<String> = entries
        .flatten()
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| name.ends_with(".png"))
        .collect();
    pngs.sort();
    match (pngs.first(), pngs.last()) {
        (Some(first), Some(last)) => outcome.note(format!("{} PNG files, {first} .. {last}", pngs.len())),
        _ => outcome.fail(format!("no PNG files in {}", images_dir.display())),
    }
    outcome
}

/// Source PDFs are optional once extraction has run.
pub fn check_pdfs(pdf_dir: &Path) -> CheckOutcome {
    let mut outcome = CheckOutcome::new("pdfs");
    match std::fs::read_dir(pdf_dir) {
        Ok(entries) => {
            let count = entries
                .flatten()
                .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("pdf"))
                .count();
            outcome.note(format!("{count} PDF files"));
        }
        Err(_) => outcome.warn(format!("PDF directory {} does not exist", pdf_dir.display())),
    }
    outcome
}

/// Cross references and association confidences hold their invariants.
pub fn check_invariants(store: &JsonStore) -> CheckOutcome {
    let mut outcome = CheckOutcome::new("invariants");

    match store.load_terms() {
        Ok(terms) => {
            let broken: Vec<&Term> = terms
                .iter()
                .filter(|t| {
                    t.reference_to
                        .as_deref()
                        .is_some_and(|target| t.definition != format!("See: {target}"))
                })
                .collect();
            for term in &broken {
                outcome.fail(format!("{:?}: reference definition is {:?}", term.term, term.definition));
            }
            let references = terms.iter().filter(|t| t.reference_to.is_some()).count();
            outcome.note(format!("{references} cross references"));
        }
        Err(e) => outcome.fail(e.to_string()),
    }

    match store.load_associations() {
        Ok(associations) => {
            let mut checked = 0;
            for found in associations.values() {
                for association in found {
                    checked += 1;
                    if let Some(confidence) = association.confidence {
                        if !(0.0..=1.0).contains(&confidence) {
                            outcome.fail(format!(
                                "{:?} -> {}: confidence {confidence} out of range",
                                association.term, association.image
                            ));
                        }
                    }
                    if association.match_type == MatchType::Exact && association.confidence != Some(1.0) {
                        outcome.fail(format!(
                            "{:?} -> {}: exact match without confidence 1.0",
                            association.term, association.image
                        ));
                    }
                }
            }
            outcome.note(format!("{checked} associations checked"));
        }
        Err(CommonError::MissingInput(path)) => {
            outcome.warn(format!("{} not generated yet", path.display()));
        }
        Err(e) => outcome.fail(e.to_string()),
    }

    outcome
}
