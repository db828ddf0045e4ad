/// In-place translation of the term JSON files.
///
/// Files are handled as untyped JSON so fields this step does not know about survive.
/// Either shape is accepted: a term array (`morphology_terms.json`) or an object of
/// term arrays keyed by category (`terms_by_category.json`).
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use atlas_common::error::CommonError;
use atlas_common::store::JsonStore;

use crate::error::AppError;
use crate::translator::Translator;

/// Fields translated on every term entry.
const TRANSLATED_FIELDS: &[&str] = &["definition", "comment"];

const BACKUP_SUFFIX: &str = ".backup_en";

/// Category produced by the classifier -> Spanish category. Unknown categories are kept.
const CATEGORY_TRANSLATIONS: &[(&str, &str)] = &[
    ("ear", "oído"),
    ("head_face", "cabeza_cara"),
    ("nose_philtrum", "nariz_filtrum"),
    ("lips_mouth", "labios_boca"),
    ("periorbital", "periorbital"),
    ("hands_feet", "manos_pies"),
    ("genitalia", "genitales"),
    ("teeth", "dientes"),
    ("introduction", "introducción"),
    ("phenotypic_variations", "variaciones_fenotípicas"),
    ("general", "general"),
];

pub fn translate_category(category: &str) -> &str {
    CATEGORY_TRANSLATIONS
        .iter()
        .find(|(en, _)| *en == category)
        .map(|(_, es)| *es)
        .unwrap_or(category)
}

/// Translate one term object in place.
///
/// Cross-reference definitions (`See: X`, with `reference_to` set) keep their English
/// form so the referenced term name stays resolvable.
pub async fn translate_entry<T: Translator>(entry: &mut Value, translator: &T) {
    let Some(fields) = entry.as_object_mut() else {
        debug!("skipping non-object term entry");
        return;
    };
    let is_reference = fields
        .get("reference_to")
        .is_some_and(|target| !target.is_null());
    for field in TRANSLATED_FIELDS {
        if is_reference && *field == "definition" {
            continue;
        }
        let Some(Value::String(text)) = fields.get(*field) else {
            continue;
        };
        if text.trim().is_empty() {
            continue;
        }
        let translated = translator.translate(text).await;
        fields.insert(field.to_string(), Value::String(translated));
    }
    if let Some(Value::String(category)) = fields.get_mut("category") {
        *category = translate_category(category).to_string();
    }
}

/// Translate every term in a term array or a category -> term array object.
/// Returns the number of entries visited.
pub async fn translate_document<T: Translator>(document: &mut Value, translator: &T) -> usize {
    match document {
        Value::Array(entries) => translate_entries(entries, translator, None).await,
        Value::Object(groups) => {
            let mut count = 0;
            for (category, group) in groups.iter_mut() {
                match group {
                    Value::Array(entries) => {
                        count += translate_entries(entries, translator, Some(category.as_str())).await;
                    }
                    _ => debug!(category = %category, "skipping non-array category group"),
                }
            }
            count
        }
        _ => {
            warn!("unexpected term file shape, left unchanged");
            0
        }
    }
}

async fn translate_entries<T: Translator>(
    entries: &mut [Value],
    translator: &T,
    category: Option<&str>,
) -> usize {
    let total = entries.len();
    if let Some(category) = category {
        info!(category = %category, terms = total, "translating category");
    }
    for (i, entry) in entries.iter_mut().enumerate() {
        let term = entry
            .get("term")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        debug!(term = %term, index = i + 1, total, "translating term");
        translate_entry(entry, translator).await;
    }
    total
}

/// Copy `path` to `<path>.backup_en` unless that backup already exists.
/// Returns whether a backup was written.
pub fn ensure_backup(path: &Path) -> Result<bool, CommonError> {
    let backup = backup_path(path);
    if backup.exists() {
        return Ok(false);
    }
    std::fs::copy(path, &backup).map_err(|e| CommonError::io(&backup, e))?;
    info!(backup = %backup.display(), "backup created");
    Ok(true)
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Back up, translate and rewrite one term file. A missing file is skipped.
pub async fn translate_file<T: Translator>(
    store: &JsonStore,
    path: &Path,
    translator: &T,
) -> Result<Option<usize>, AppError> {
    if !path.exists() {
        warn!(path = %path.display(), "term file not found, skipping");
        return Ok(None);
    }
    ensure_backup(path)?;

    let mut document: Value = store.read_json(path)?;
    let count = translate_document(&mut document, translator).await;
    store.write_json(path, &document)?;
    info!(path = %path.display(), terms = count, "file translated");
    Ok(Some(count))
}
