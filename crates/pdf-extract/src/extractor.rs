/// Text and image extraction from the source PDFs.
///
/// Extraction shells out to poppler-utils (`pdftotext -layout`, `pdfimages -png`).
/// Each PDF is fingerprinted with SHA-256; a document whose digest matches the
/// previous run and whose text file is still present is not extracted again.
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use atlas_common::config::AtlasPaths;
use atlas_common::error::CommonError;
use atlas_common::model::ExtractionRecord;

use crate::error::AppError;

static YEAR_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*?(\d{4})\s*-\s*").expect("valid regex"));
static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
static SEPARATOR_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid regex"));

/// External extraction tools.
pub trait PdfTools {
    /// Write the layout-preserving text of `pdf` to `output`.
    fn extract_text(&self, pdf: &Path, output: &Path) -> Result<(), AppError>;
    /// Write every embedded image of `pdf` as `<prefix>-NNN.png`.
    fn extract_images(&self, pdf: &Path, prefix: &Path) -> Result<(), AppError>;
}

/// poppler-utils command line tools.
pub struct Poppler {
    pdftotext_bin: String,
    pdfimages_bin: String,
}

impl Poppler {
    pub fn new(pdftotext_bin: impl Into<String>, pdfimages_bin: impl Into<String>) -> Self {
        Self {
            pdftotext_bin: pdftotext_bin.into(),
            pdfimages_bin: pdfimages_bin.into(),
        }
    }
}

impl PdfTools for Poppler {
    fn extract_text(&self, pdf: &Path, output: &Path) -> Result<(), AppError> {
        let mut cmd = std::process::Command::new(&self.pdftotext_bin);
        cmd.arg("-layout").arg(pdf).arg(output);
        run_tool(&self.pdftotext_bin, cmd)
    }

    fn extract_images(&self, pdf: &Path, prefix: &Path) -> Result<(), AppError> {
        let mut cmd = std::process::Command::new(&self.pdfimages_bin);
        cmd.arg("-png").arg(pdf).arg(prefix);
        run_tool(&self.pdfimages_bin, cmd)
    }
}

fn run_tool(tool: &str, mut cmd: std::process::Command) -> Result<(), AppError> {
    let output = cmd.output().map_err(|e| AppError::Tool {
        tool: tool.to_string(),
        message: format!("failed to run: {e}"),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::Tool {
            tool: tool.to_string(),
            message: format!("{}: {}", output.status, stderr.trim()),
        });
    }
    Ok(())
}

/// Safe base name for a PDF: "Hunter 2009 - Elements of Morphology: the Ear.pdf"
/// becomes "elements_of_morphology_the_ear".
pub fn sanitize_filename(file_name: &str) -> String {
    let name = file_name.replace(".pdf", "");
    let name = YEAR_PREFIX.replace(&name, "");
    let name = UNSAFE_CHARS.replace_all(&name, "");
    let name = SEPARATOR_RUNS.replace_all(&name, "_");
    name.to_lowercase().trim_matches('_').to_string()
}

/// PDF file names in `dir`, sorted, excluding browser leftovers named `download*`.
pub fn list_pdfs(dir: &Path) -> Result<Vec<String>, AppError> {
    let entries = std::fs::read_dir(dir).map_err(|e| CommonError::io(dir, e))?;
    let mut names: Vec<String> = entries
        .flatten()
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.ends_with(".pdf") && !name.starts_with("download"))
        .collect();
    names.sort();
    Ok(names)
}

/// Hex SHA-256 of a file's bytes.
pub fn file_sha256(path: &Path) -> Result<String, AppError> {
    let bytes = std::fs::read(path).map_err(|e| CommonError::io(path, e))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

pub struct Extractor<'a, T: PdfTools> {
    paths: &'a AtlasPaths,
    tools: T,
    force: bool,
}

impl<'a, T: PdfTools> Extractor<'a, T> {
    pub fn new(paths: &'a AtlasPaths, tools: T, force: bool) -> Self {
        Self {
            paths,
            tools,
            force,
        }
    }

    /// Extract every PDF in the PDF directory and return the new metadata.
    ///
    /// `previous` is the metadata of the last run (empty when there was none).
    pub fn run(&self, previous: &[ExtractionRecord]) -> Result<Vec<ExtractionRecord>, AppError> {
        for dir in [&self.paths.data_dir, &self.paths.images_dir] {
            std::fs::create_dir_all(dir).map_err(|e| CommonError::io(dir, e))?;
        }

        let pdfs = list_pdfs(&self.paths.pdf_dir)?;
        info!(count = pdfs.len(), dir = %self.paths.pdf_dir.display(), "found pdfs");

        let mut records = Vec::with_capacity(pdfs.len());
        for pdf_file in pdfs {
            if let Some(record) = self.extract_one(&pdf_file, previous) {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// `None` when the PDF itself cannot be read; it is left out of the metadata.
    fn extract_one(&self, pdf_file: &str, previous: &[ExtractionRecord]) -> Option<ExtractionRecord> {
        let pdf_path = self.paths.pdf_dir.join(pdf_file);
        let safe_name = sanitize_filename(pdf_file);
        let text_path = self.paths.data_dir.join(format!("{safe_name}.txt"));
        let image_prefix = self.paths.images_dir.join(&safe_name);
        let digest = match file_sha256(&pdf_path) {
            Ok(digest) => digest,
            Err(e) => {
                warn!(pdf = %pdf_file, error = %e, "cannot read pdf, skipping");
                return None;
            }
        };

        let mut record = ExtractionRecord {
            original_filename: pdf_file.to_string(),
            safe_name: safe_name.clone(),
            text_file: display(&text_path),
            image_prefix: display(&image_prefix),
            sha256: None,
        };

        let unchanged = previous.iter().any(|p| {
            p.original_filename == pdf_file && p.sha256.as_deref() == Some(digest.as_str())
        });
        if unchanged && text_path.exists() && !self.force {
            debug!(pdf = %pdf_file, "unchanged since last extraction, skipping");
            record.sha256 = Some(digest);
            return Some(record);
        }

        info!(pdf = %pdf_file, safe_name = %safe_name, "extracting");
        let text_ok = match self.tools.extract_text(&pdf_path, &text_path) {
            Ok(()) => true,
            Err(e) => {
                warn!(pdf = %pdf_file, error = %e, "text extraction failed");
                false
            }
        };
        if let Err(e) = self.tools.extract_images(&pdf_path, &image_prefix) {
            warn!(pdf = %pdf_file, error = %e, "image extraction failed");
        }

        // Only a successful text extraction is remembered, so failures are retried.
        if text_ok {
            record.sha256 = Some(digest);
        }
        Some(record)
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    /// Writes fixed outputs instead of running poppler.
    struct FakeTools {
        text_calls: Cell<usize>,
        fail_text: bool,
    }

    impl FakeTools {
        fn new() -> Self {
            Self {
                text_calls: Cell::new(0),
                fail_text: false,
            }
        }
    }

    impl PdfTools for FakeTools {
        fn extract_text(&self, _pdf: &Path, output: &Path) -> Result<(), AppError> {
            self.text_calls.set(self.text_calls.get() + 1);
            if self.fail_text {
                return Err(AppError::Tool {
                    tool: "pdftotext".to_string(),
                    message: "exit status: 1".to_string(),
                });
            }
            std::fs::write(output, "Antihelix: A ridge.").unwrap();
            Ok(())
        }

        fn extract_images(&self, _pdf: &Path, prefix: &Path) -> Result<(), AppError> {
            std::fs::write(format!("{}-000.png", prefix.display()), b"png").unwrap();
            Ok(())
        }
    }

    fn workspace() -> (tempfile::TempDir, AtlasPaths) {
        let dir = tempfile::tempdir().unwrap();
        let paths = AtlasPaths::rooted_at(dir.path());
        std::fs::create_dir_all(&paths.pdf_dir).unwrap();
        std::fs::write(
            paths.pdf_dir.join("Hunter 2009 - Elements of morphology: the ear.pdf"),
            b"%PDF-1.4 ear",
        )
        .unwrap();
        std::fs::write(paths.pdf_dir.join("download (1).pdf"), b"%PDF").unwrap();
        std::fs::write(paths.pdf_dir.join("notes.txt"), b"x").unwrap();
        (dir, paths)
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(
            sanitize_filename("Am J Med Genet 2009 - Elements of morphology: Standard terminology for the ear.pdf"),
            "elements_of_morphology_standard_terminology_for_the_ear"
        );
        assert_eq!(sanitize_filename("Hands and Feet.pdf"), "hands_and_feet");
        assert_eq!(sanitize_filename("-- Lips, mouth -- .pdf"), "lips_mouth");
    }

    #[test]
    fn test_list_pdfs_skips_downloads_and_other_files() {
        let (_dir, paths) = workspace();
        let pdfs = list_pdfs(&paths.pdf_dir).unwrap();
        assert_eq!(pdfs, vec!["Hunter 2009 - Elements of morphology: the ear.pdf"]);
    }

    #[test]
    fn test_sha256_is_stable_hex() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.pdf");
        std::fs::write(&path, b"abc").unwrap();
        assert_eq!(
            file_sha256(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_run_extracts_and_records() {
        let (_dir, paths) = workspace();
        let extractor = Extractor::new(&paths, FakeTools::new(), false);
        let records = extractor.run(&[]).unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.safe_name, "elements_of_morphology_the_ear");
        assert!(record.sha256.is_some());
        assert!(paths.data_dir.join("elements_of_morphology_the_ear.txt").exists());
        assert!(paths.images_dir.join("elements_of_morphology_the_ear-000.png").exists());
    }

    #[test]
    fn test_unchanged_pdf_is_skipped() {
        let (_dir, paths) = workspace();
        let first = Extractor::new(&paths, FakeTools::new(), false).run(&[]).unwrap();

        let tools = FakeTools::new();
        let extractor = Extractor::new(&paths, tools, false);
        let second = extractor.run(&first).unwrap();
        assert_eq!(extractor.tools.text_calls.get(), 0);
        assert_eq!(second, first);

        let forced = Extractor::new(&paths, FakeTools::new(), true);
        forced.run(&first).unwrap();
        assert_eq!(forced.tools.text_calls.get(), 1);
    }

    #[test]
    fn test_failed_text_extraction_is_not_fingerprinted() {
        let (_dir, paths) = workspace();
        let tools = FakeTools {
            text_calls: Cell::new(0),
            fail_text: true,
        };
        let records = Extractor::new(&paths, tools, false).run(&[]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sha256, None);
    }

    #[test]
    fn test_unreadable_pdf_is_skipped() {
        let (_dir, paths) = workspace();
        std::fs::create_dir(paths.pdf_dir.join("broken.pdf")).unwrap();

        let extractor = Extractor::new(&paths, FakeTools::new(), false);
        let records = extractor.run(&[]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].safe_name, "elements_of_morphology_the_ear");
        assert_eq!(extractor.tools.text_calls.get(), 1);
    }
}
