use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A canonical anatomical vocabulary entry (e.g. "Antihelix" from the ear document).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    /// Human-readable label, e.g. "Palpebral fissure"
    pub term: String,
    /// Definition text, denoised of document artifacts
    pub definition: String,
    /// Anatomical category, e.g. "ear", "periorbital"
    pub category: String,
    /// Original PDF file name without the `.pdf` extension
    pub document: String,
    /// Text file the term was parsed from, e.g. "elements_of_morphology_ear.txt"
    pub source: String,
    /// Optional free-text comment following the definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Target term when the definition is a "See X" cross reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_to: Option<String>,
}

impl Term {
    /// Document key used for captions and the image catalog (`source` minus `.txt`).
    pub fn document_key(&self) -> &str {
        let source = self.source.rsplit('/').next().unwrap_or(&self.source);
        source.strip_suffix(".txt").unwrap_or(source)
    }
}

/// Figure captions found in the extracted text, grouped by document key, then by
/// figure number.
pub type CaptionIndex = BTreeMap<String, BTreeMap<u32, String>>;

/// One processed PDF, as recorded by the extraction step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub original_filename: String,
    pub safe_name: String,
    pub text_file: String,
    pub image_prefix: String,
    /// SHA-256 of the PDF bytes; absent in metadata written before fingerprinting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl ExtractionRecord {
    /// Original file name without the `.pdf` extension.
    pub fn title(&self) -> &str {
        self.original_filename
            .strip_suffix(".pdf")
            .unwrap_or(&self.original_filename)
    }
}

/// Images available for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub category: String,
    pub document: String,
    pub all_images: Vec<String>,
}

/// All extracted images, keyed by document safe name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageCatalog {
    pub by_category: BTreeMap<String, CatalogEntry>,
}

impl ImageCatalog {
    /// Images for a document key: exact key first, then key containment either way.
    pub fn images_for(&self, document_key: &str) -> &[String] {
        if let Some(entry) = self.by_category.get(document_key) {
            return &entry.all_images;
        }
        if document_key.is_empty() {
            return &[];
        }
        self.by_category
            .iter()
            .find(|(key, _)| key.contains(document_key) || document_key.contains(key.as_str()))
            .map(|(_, entry)| entry.all_images.as_slice())
            .unwrap_or(&[])
    }

    pub fn total_images(&self) -> usize {
        self.by_category.values().map(|e| e.all_images.len()).sum()
    }
}

/// Strategy that produced a term-image association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Partial,
    Fuzzy,
    DirectReference,
    CaptionMatch,
    Fallback,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Partial => "partial",
            MatchType::Fuzzy => "fuzzy",
            MatchType::DirectReference => "direct_reference",
            MatchType::CaptionMatch => "caption_match",
            MatchType::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate image for a term. Derived data; recomputed on every matcher run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAssociation {
    pub term: String,
    pub image: String,
    pub figure: u32,
    pub caption: String,
    /// Match quality in [0, 1]; unset for fallback images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub match_type: MatchType,
    /// Compound re-ranking score (not bounded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_components: Vec<String>,
}

/// Term name -> candidate images.
pub type AssociationMap = BTreeMap<String, Vec<ImageAssociation>>;

/// Reverse index entry: which term an image was associated with, and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageTermLink {
    pub term: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub match_type: MatchType,
    pub figure: u32,
    pub caption: String,
}

/// Image file -> terms it was associated with.
pub type ImageTermMap = BTreeMap<String, Vec<ImageTermLink>>;

/// Headline numbers for the parsed vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermsIndex {
    pub total_terms: usize,
    pub categories: BTreeMap<String, usize>,
    pub sample_terms: Vec<String>,
}

/// Per-category document statistics written by the extraction step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub document_count: usize,
    pub image_count: usize,
    pub total_text_length: usize,
    pub titles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_documents: usize,
    pub total_images: usize,
    pub categories: BTreeMap<String, CategorySummary>,
}

/// One document as listed in `content_by_category.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentContent {
    pub title: String,
    pub safe_name: String,
    pub text_file: String,
    pub text_preview: String,
    pub text_length: usize,
    pub images: Vec<String>,
    pub image_count: usize,
}
