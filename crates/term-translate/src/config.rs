use atlas_common::config::AtlasPaths;
use atlas_common::store::files;
use atlas_common::translate::TranslatorConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub paths: AtlasPaths,
    pub translator: TranslatorConfig,
    /// Output files translated in place, relative to the output directory.
    pub files: Vec<String>,
}

impl Config {
    /// Optional:
    /// - `TRANSLATE_*` (see [`TranslatorConfig::from_env`])
    /// - `TRANSLATE_FILES` (comma-separated, default: the term list and the per-category view)
    pub fn from_env() -> Self {
        let files = std::env::var("TRANSLATE_FILES")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|f| f.trim().to_string())
                    .filter(|f| !f.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| {
                vec![
                    files::TERMS.to_string(),
                    files::TERMS_BY_CATEGORY.to_string(),
                ]
            });

        Self {
            paths: AtlasPaths::from_env(),
            translator: TranslatorConfig::from_env(),
            files,
        }
    }
}
