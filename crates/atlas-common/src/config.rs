use std::path::{Path, PathBuf};

/// Directory layout shared by every pipeline step, loaded from environment variables.
///
/// Every variable is optional; the defaults reproduce the fixed relative layout the
/// pipeline runs in (`pdfs/`, `data/`, `images/`, `data/organized/`).
#[derive(Debug, Clone)]
pub struct AtlasPaths {
    /// Source PDFs.
    pub pdf_dir: PathBuf,
    /// Extracted text files and extraction metadata.
    pub data_dir: PathBuf,
    /// Extracted PNG images.
    pub images_dir: PathBuf,
    /// Organized JSON outputs.
    pub output_dir: PathBuf,
}

impl AtlasPaths {
    /// Optional:
    /// - `ATLAS_PDF_DIR` (default: "pdfs")
    /// - `ATLAS_DATA_DIR` (default: "data")
    /// - `ATLAS_IMAGES_DIR` (default: "images")
    /// - `ATLAS_OUTPUT_DIR` (default: "<data dir>/organized")
    pub fn from_env() -> Self {
        let data_dir = env_path("ATLAS_DATA_DIR").unwrap_or_else(|| PathBuf::from("data"));
        let output_dir = env_path("ATLAS_OUTPUT_DIR").unwrap_or_else(|| data_dir.join("organized"));
        Self {
            pdf_dir: env_path("ATLAS_PDF_DIR").unwrap_or_else(|| PathBuf::from("pdfs")),
            images_dir: env_path("ATLAS_IMAGES_DIR").unwrap_or_else(|| PathBuf::from("images")),
            data_dir,
            output_dir,
        }
    }

    /// Layout rooted at `root`, used by tests and tools that work on a copy of the data.
    pub fn rooted_at(root: &Path) -> Self {
        let data_dir = root.join("data");
        Self {
            pdf_dir: root.join("pdfs"),
            images_dir: root.join("images"),
            output_dir: data_dir.join("organized"),
            data_dir,
        }
    }

    pub fn metadata_file(&self) -> PathBuf {
        self.data_dir.join("extraction_metadata.json")
    }

    pub fn output_file(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}
