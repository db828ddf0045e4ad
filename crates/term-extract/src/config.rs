use atlas_common::config::AtlasPaths;

use crate::error::AppError;
use crate::parser::Layout;

#[derive(Debug, Clone)]
pub struct Config {
    pub paths: AtlasPaths,
    /// Glossary layout of the extracted text files.
    pub layout: Layout,
}

impl Config {
    /// Optional:
    /// - `ATLAS_TERM_LAYOUT`: `auto` (default), `colon` or `definition-block`
    pub fn from_env() -> Result<Self, AppError> {
        let layout = match std::env::var("ATLAS_TERM_LAYOUT") {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ => Layout::Auto,
        };
        Ok(Self {
            paths: AtlasPaths::from_env(),
            layout,
        })
    }
}
