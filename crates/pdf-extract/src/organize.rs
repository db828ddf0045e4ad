/// Organized views over the extracted documents: image catalog, per-category
/// content listing and summary statistics.
use std::collections::BTreeMap;
use std::path::Path;

use tracing::info;

use atlas_common::category::categorize;
use atlas_common::error::CommonError;
use atlas_common::model::{
    CatalogEntry, CategorySummary, DocumentContent, ExtractionRecord, ImageCatalog, Summary,
};
use atlas_common::store::AtlasStore;
use atlas_common::text::truncate_chars;

use crate::error::AppError;

const PREVIEW_CHARS: usize = 500;

/// Sorted PNG file names in the images directory; a missing directory has none.
pub fn list_images(images_dir: &Path) -> Result<Vec<String>, AppError> {
    if !images_dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(images_dir).map_err(|e| CommonError::io(images_dir, e))?;
    let mut names: Vec<String> = entries
        .flatten()
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.ends_with(".png"))
        .collect();
    names.sort();
    Ok(names)
}

/// Images written for `safe_name`, i.e. `<safe_name>-NNN.png` or `<safe_name>_NNN.png`.
pub fn document_images(images: &[String], safe_name: &str) -> Vec<String> {
    images
        .iter()
        .filter(|name| {
            name.strip_prefix(safe_name)
                .and_then(|rest| rest.strip_prefix(['-', '_']))
                .and_then(|rest| rest.strip_suffix(".png"))
                .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
        })
        .cloned()
        .collect()
}

pub fn build_catalog(records: &[ExtractionRecord], images: &[String]) -> ImageCatalog {
    let by_category = records
        .iter()
        .map(|record| {
            let entry = CatalogEntry {
                category: categorize(&record.original_filename).to_string(),
                document: record.title().to_string(),
                all_images: document_images(images, &record.safe_name),
            };
            (record.safe_name.clone(), entry)
        })
        .collect();
    ImageCatalog { by_category }
}

pub fn build_content<S: AtlasStore>(
    store: &S,
    records: &[ExtractionRecord],
    images: &[String],
    images_dir: &Path,
) -> Result<BTreeMap<String, Vec<DocumentContent>>, AppError> {
    let mut content: BTreeMap<String, Vec<DocumentContent>> = BTreeMap::new();
    for record in records {
        let text = store.load_document_text(&record.text_file)?.unwrap_or_default();
        let images: Vec<String> = document_images(images, &record.safe_name)
            .into_iter()
            .map(|name| images_dir.join(name).display().to_string())
            .collect();

        content
            .entry(categorize(&record.original_filename).to_string())
            .or_default()
            .push(DocumentContent {
                title: record.title().to_string(),
                safe_name: record.safe_name.clone(),
                text_file: record.text_file.clone(),
                text_preview: truncate_chars(&text, PREVIEW_CHARS),
                text_length: text.chars().count(),
                image_count: images.len(),
                images,
            });
    }
    Ok(content)
}

pub fn build_summary(total_documents: usize, content: &BTreeMap<String, Vec<DocumentContent>>) -> Summary {
    let categories: BTreeMap<String, CategorySummary> = content
        .iter()
        .map(|(category, docs)| {
            let summary = CategorySummary {
                document_count: docs.len(),
                image_count: docs.iter().map(|d| d.image_count).sum(),
                total_text_length: docs.iter().map(|d| d.text_length).sum(),
                titles: docs.iter().map(|d| d.title.clone()).collect(),
            };
            (category.clone(), summary)
        })
        .collect();

    Summary {
        total_documents,
        total_images: categories.values().map(|c| c.image_count).sum(),
        categories,
    }
}

/// Write the catalog, the content listing and the summary.
pub fn organize<S: AtlasStore>(
    store: &S,
    records: &[ExtractionRecord],
    images_dir: &Path,
) -> Result<Summary, AppError> {
    let images = list_images(images_dir)?;

    let catalog = build_catalog(records, &images);
    store.save_catalog(&catalog)?;

    let content = build_content(store, records, &images, images_dir)?;
    store.save_content_by_category(&content)?;

    let summary = build_summary(records.len(), &content);
    store.save_summary(&summary)?;

    for (category, info) in &summary.categories {
        info!(
            category = %category,
            documents = info.document_count,
            images = info.image_count,
            "category organized"
        );
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_common::config::AtlasPaths;
    use atlas_common::store::JsonStore;

    fn record(original: &str, safe: &str, data_dir: &Path) -> ExtractionRecord {
        ExtractionRecord {
            original_filename: original.to_string(),
            safe_name: safe.to_string(),
            text_file: data_dir.join(format!("{safe}.txt")).display().to_string(),
            image_prefix: format!("images/{safe}"),
            sha256: None,
        }
    }

    #[test]
    fn test_document_images_requires_numbered_suffix() {
        let images = vec![
            "ear-000.png".to_string(),
            "ear-001.png".to_string(),
            "ear_an_initial-000.png".to_string(),
            "ear-cover.png".to_string(),
        ];
        assert_eq!(document_images(&images, "ear"), vec!["ear-000.png", "ear-001.png"]);
        assert_eq!(document_images(&images, "ear_an_initial"), vec!["ear_an_initial-000.png"]);
    }

    #[test]
    fn test_catalog_keyed_by_safe_name() {
        let dir = Path::new("data");
        let records = vec![record("Standard terminology for the ear.pdf", "the_ear", dir)];
        let images = vec!["the_ear-000.png".to_string(), "nose-000.png".to_string()];
        let catalog = build_catalog(&records, &images);

        let entry = &catalog.by_category["the_ear"];
        assert_eq!(entry.category, "ear");
        assert_eq!(entry.document, "Standard terminology for the ear");
        assert_eq!(entry.all_images, vec!["the_ear-000.png"]);
    }

    #[test]
    fn test_organize_writes_summary() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AtlasPaths::rooted_at(dir.path());
        std::fs::create_dir_all(&paths.data_dir).unwrap();
        std::fs::create_dir_all(&paths.images_dir).unwrap();
        std::fs::write(paths.data_dir.join("the_ear.txt"), "é".repeat(600)).unwrap();
        for name in ["the_ear-000.png", "the_ear-001.png", "hands-000.png"] {
            std::fs::write(paths.images_dir.join(name), b"png").unwrap();
        }
        let records = vec![
            record("The ear.pdf", "the_ear", &paths.data_dir),
            record("Hands and feet.pdf", "hands", &paths.data_dir),
        ];
        let store = JsonStore::new(paths.clone());

        let summary = organize(&store, &records, &paths.images_dir).unwrap();
        assert_eq!(summary.total_documents, 2);
        assert_eq!(summary.total_images, 3);
        assert_eq!(summary.categories["ear"].total_text_length, 600);
        assert_eq!(summary.categories["hands_feet"].titles, vec!["Hands and feet"]);

        let content: BTreeMap<String, Vec<DocumentContent>> = store
            .read_json(&paths.output_file(atlas_common::store::files::CONTENT_BY_CATEGORY))
            .unwrap();
        let ear = &content["ear"][0];
        assert_eq!(ear.text_preview.chars().count(), 500);
        assert_eq!(ear.image_count, 2);
        assert_eq!(content["hands_feet"][0].text_length, 0);
        assert!(paths.output_file(atlas_common::store::files::IMAGES_CATALOG).exists());
    }
}
