/// JSON file store for the pipeline's data set.
///
/// Every step reads whole files, mutates in memory and writes whole files back; the
/// store is the only place that knows where those files live. File layout (relative
/// to the configured directories):
/// - `<data>/extraction_metadata.json` : Vec<ExtractionRecord>
/// - `<data>/<safe_name>.txt` : extracted document text
/// - `<output>/morphology_terms.json` : Vec<Term>
/// - `<output>/terms_by_category.json` : category -> Vec<Term>
/// - `<output>/terms_index.json` : TermsIndex
/// - `<output>/term_references.json` : term -> referenced term
/// - `<output>/images_catalog.json` : ImageCatalog
/// - `<output>/figure_captions.json` : document -> figure -> caption
/// - `<output>/term_images_with_captions.json` : term -> Vec<ImageAssociation>
/// - `<output>/terms_with_images.json` : Vec<String>
/// - `<output>/image_term_mapping.json` : image -> Vec<ImageTermLink>
/// - `<output>/summary.json`, `<output>/content_by_category.json`
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::AtlasPaths;
use crate::error::CommonError;
use crate::model::{
    AssociationMap, CaptionIndex, DocumentContent, ExtractionRecord, ImageCatalog, ImageTermMap,
    Summary, Term, TermsIndex,
};

pub mod files {
    pub const TERMS: &str = "morphology_terms.json";
    pub const TERMS_BY_CATEGORY: &str = "terms_by_category.json";
    pub const TERMS_INDEX: &str = "terms_index.json";
    pub const TERM_REFERENCES: &str = "term_references.json";
    pub const IMAGES_CATALOG: &str = "images_catalog.json";
    pub const FIGURE_CAPTIONS: &str = "figure_captions.json";
    pub const TERM_IMAGES: &str = "term_images_with_captions.json";
    pub const TERMS_WITH_IMAGES: &str = "terms_with_images.json";
    pub const IMAGE_TERMS: &str = "image_term_mapping.json";
    pub const SUMMARY: &str = "summary.json";
    pub const CONTENT_BY_CATEGORY: &str = "content_by_category.json";
}

/// Storage operations the pipeline steps depend on.
pub trait AtlasStore {
    fn load_metadata(&self) -> Result<Vec<ExtractionRecord>, CommonError>;
    fn save_metadata(&self, records: &[ExtractionRecord]) -> Result<(), CommonError>;

    /// Text of one extracted document, or `None` when it was never extracted.
    fn load_document_text(&self, text_file: &str) -> Result<Option<String>, CommonError>;
    /// All extracted documents as `(file stem, text)`, sorted by stem.
    fn document_texts(&self) -> Result<Vec<(String, String)>, CommonError>;

    fn load_terms(&self) -> Result<Vec<Term>, CommonError>;
    fn save_terms(&self, terms: &[Term]) -> Result<(), CommonError>;
    fn save_terms_by_category(&self, by_category: &BTreeMap<String, Vec<Term>>) -> Result<(), CommonError>;
    fn save_terms_index(&self, index: &TermsIndex) -> Result<(), CommonError>;
    fn save_term_references(&self, references: &BTreeMap<String, String>) -> Result<(), CommonError>;

    fn load_catalog(&self) -> Result<ImageCatalog, CommonError>;
    fn save_catalog(&self, catalog: &ImageCatalog) -> Result<(), CommonError>;

    fn load_captions(&self) -> Result<CaptionIndex, CommonError>;
    fn save_captions(&self, captions: &CaptionIndex) -> Result<(), CommonError>;

    fn load_associations(&self) -> Result<AssociationMap, CommonError>;
    fn save_associations(&self, associations: &AssociationMap) -> Result<(), CommonError>;
    fn save_terms_with_images(&self, terms: &[String]) -> Result<(), CommonError>;
    fn save_image_terms(&self, image_terms: &ImageTermMap) -> Result<(), CommonError>;

    fn save_summary(&self, summary: &Summary) -> Result<(), CommonError>;
    fn save_content_by_category(
        &self,
        content: &BTreeMap<String, Vec<DocumentContent>>,
    ) -> Result<(), CommonError>;
}

/// `AtlasStore` backed by pretty-printed JSON files on disk.
pub struct JsonStore {
    paths: AtlasPaths,
}

impl JsonStore {
    pub fn new(paths: AtlasPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &AtlasPaths {
        &self.paths
    }

    /// Read and deserialize a JSON file. A missing file is a `MissingInput` error.
    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, CommonError> {
        if !path.exists() {
            return Err(CommonError::MissingInput(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|e| CommonError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| CommonError::json(path, e))
    }

    /// Serialize with 2-space indentation (non-ASCII kept literal) and write the whole file.
    pub fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<(), CommonError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| CommonError::io(parent, e))?;
            }
        }
        let json = serde_json::to_string_pretty(value).map_err(|e| CommonError::json(path, e))?;
        std::fs::write(path, json).map_err(|e| CommonError::io(path, e))?;
        debug!(path = %path.display(), "wrote json");
        Ok(())
    }

    fn output(&self, name: &str) -> PathBuf {
        self.paths.output_file(name)
    }
}

impl AtlasStore for JsonStore {
    // --- Extraction metadata ---

    fn load_metadata(&self) -> Result<Vec<ExtractionRecord>, CommonError> {
        self.read_json(&self.paths.metadata_file())
    }

    fn save_metadata(&self, records: &[ExtractionRecord]) -> Result<(), CommonError> {
        self.write_json(&self.paths.metadata_file(), records)
    }

    // --- Document text ---

    fn load_document_text(&self, text_file: &str) -> Result<Option<String>, CommonError> {
        let path = resolve_text_path(&self.paths.data_dir, text_file);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path).map_err(|e| CommonError::io(&path, e))?;
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn document_texts(&self) -> Result<Vec<(String, String)>, CommonError> {
        let dir = &self.paths.data_dir;
        let entries = std::fs::read_dir(dir).map_err(|e| CommonError::io(dir, e))?;

        let mut texts = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match std::fs::read(&path) {
                Ok(bytes) => texts.push((stem.to_string(), String::from_utf8_lossy(&bytes).into_owned())),
                Err(e) => warn!(error = %e, path = %path.display(), "unreadable text file, skipping"),
            }
        }
        texts.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(texts)
    }

    // --- Terms ---

    fn load_terms(&self) -> Result<Vec<Term>, CommonError> {
        self.read_json(&self.output(files::TERMS))
    }

    fn save_terms(&self, terms: &[Term]) -> Result<(), CommonError> {
        self.write_json(&self.output(files::TERMS), terms)
    }

    fn save_terms_by_category(&self, by_category: &BTreeMap<String, Vec<Term>>) -> Result<(), CommonError> {
        self.write_json(&self.output(files::TERMS_BY_CATEGORY), by_category)
    }

    fn save_terms_index(&self, index: &TermsIndex) -> Result<(), CommonError> {
        self.write_json(&self.output(files::TERMS_INDEX), index)
    }

    fn save_term_references(&self, references: &BTreeMap<String, String>) -> Result<(), CommonError> {
        self.write_json(&self.output(files::TERM_REFERENCES), references)
    }

    // --- Images ---

    fn load_catalog(&self) -> Result<ImageCatalog, CommonError> {
        self.read_json(&self.output(files::IMAGES_CATALOG))
    }

    fn save_catalog(&self, catalog: &ImageCatalog) -> Result<(), CommonError> {
        self.write_json(&self.output(files::IMAGES_CATALOG), catalog)
    }

    fn load_captions(&self) -> Result<CaptionIndex, CommonError> {
        self.read_json(&self.output(files::FIGURE_CAPTIONS))
    }

    fn save_captions(&self, captions: &CaptionIndex) -> Result<(), CommonError> {
        self.write_json(&self.output(files::FIGURE_CAPTIONS), captions)
    }

    // --- Associations ---

    fn load_associations(&self) -> Result<AssociationMap, CommonError> {
        self.read_json(&self.output(files::TERM_IMAGES))
    }

    fn save_associations(&self, associations: &AssociationMap) -> Result<(), CommonError> {
        self.write_json(&self.output(files::TERM_IMAGES), associations)
    }

    fn save_terms_with_images(&self, terms: &[String]) -> Result<(), CommonError> {
        self.write_json(&self.output(files::TERMS_WITH_IMAGES), terms)
    }

    fn save_image_terms(&self, image_terms: &ImageTermMap) -> Result<(), CommonError> {
        self.write_json(&self.output(files::IMAGE_TERMS), image_terms)
    }

    // --- Organized content ---

    fn save_summary(&self, summary: &Summary) -> Result<(), CommonError> {
        self.write_json(&self.output(files::SUMMARY), summary)
    }

    fn save_content_by_category(
        &self,
        content: &BTreeMap<String, Vec<DocumentContent>>,
    ) -> Result<(), CommonError> {
        self.write_json(&self.output(files::CONTENT_BY_CATEGORY), content)
    }
}

/// Metadata stores text files relative to the working directory (`data/x.txt`);
/// resolve them against the configured data directory by file name.
fn resolve_text_path(data_dir: &Path, text_file: &str) -> PathBuf {
    let as_given = Path::new(text_file);
    if as_given.is_absolute() {
        return as_given.to_path_buf();
    }
    match as_given.file_name() {
        Some(name) => data_dir.join(name),
        None => data_dir.join(text_file),
    }
}
