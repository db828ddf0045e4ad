use atlas_common::config::AtlasPaths;

use crate::error::AppError;

/// Extraction settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub paths: AtlasPaths,
    /// `pdftotext` executable (poppler-utils).
    pub pdftotext_bin: String,
    /// `pdfimages` executable (poppler-utils).
    pub pdfimages_bin: String,
    /// Re-extract documents even when their fingerprint is unchanged.
    pub force: bool,
}

impl Config {
    /// Optional:
    /// - `PDFTOTEXT_BIN` (default: "pdftotext")
    /// - `PDFIMAGES_BIN` (default: "pdfimages")
    /// - `ATLAS_FORCE_EXTRACT` ("1"/"true" to re-extract everything)
    ///
    /// The PDF directory itself must exist.
    pub fn from_env() -> Result<Self, AppError> {
        let paths = AtlasPaths::from_env();
        if !paths.pdf_dir.is_dir() {
            return Err(AppError::Config(format!(
                "PDF directory not found at {}",
                paths.pdf_dir.display()
            )));
        }

        let pdftotext_bin =
            std::env::var("PDFTOTEXT_BIN").unwrap_or_else(|_| "pdftotext".to_string());
        let pdfimages_bin =
            std::env::var("PDFIMAGES_BIN").unwrap_or_else(|_| "pdfimages".to_string());
        let force = std::env::var("ATLAS_FORCE_EXTRACT")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            paths,
            pdftotext_bin,
            pdfimages_bin,
            force,
        })
    }
}
