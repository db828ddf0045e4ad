use atlas_common::config::AtlasPaths;

use crate::error::AppError;

/// Matcher tuning, loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherConfig {
    /// Minimum similarity ratio for a fuzzy caption match.
    pub fuzzy_threshold: f64,
    /// Associations kept per term after re-ranking.
    pub max_images_per_term: usize,
    /// Document images attached when nothing else matched (0 disables).
    pub fallback_images: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.8,
            max_images_per_term: 6,
            fallback_images: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub paths: AtlasPaths,
    pub matcher: MatcherConfig,
}

impl Config {
    /// Optional:
    /// - `ATLAS_FUZZY_THRESHOLD` (default: 0.8, must be within [0, 1])
    /// - `ATLAS_MAX_IMAGES_PER_TERM` (default: 6)
    /// - `ATLAS_FALLBACK_IMAGES` (default: 2)
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = MatcherConfig::default();

        let fuzzy_threshold = std::env::var("ATLAS_FUZZY_THRESHOLD")
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .unwrap_or(defaults.fuzzy_threshold);
        if !(0.0..=1.0).contains(&fuzzy_threshold) {
            return Err(AppError::Config(format!(
                "ATLAS_FUZZY_THRESHOLD must be within [0, 1], got {fuzzy_threshold}"
            )));
        }

        let max_images_per_term = std::env::var("ATLAS_MAX_IMAGES_PER_TERM")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(defaults.max_images_per_term);

        let fallback_images = std::env::var("ATLAS_FALLBACK_IMAGES")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(defaults.fallback_images);

        Ok(Self {
            paths: AtlasPaths::from_env(),
            matcher: MatcherConfig {
                fuzzy_threshold,
                max_images_per_term,
                fallback_images,
            },
        })
    }
}
