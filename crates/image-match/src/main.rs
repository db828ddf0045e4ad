mod captions;
mod compound;
mod config;
mod error;
mod figures;
mod matcher;
mod prune;
mod service;
mod similarity;

use tracing::info;
use tracing_subscriber::EnvFilter;

use atlas_common::denoise::GarbageDenoiser;
use atlas_common::store::JsonStore;
use config::Config;
use matcher::TermImageMatcher;
use service::MappingService;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting term/image mapping");

    // 1. Load config from environment
    let config = Config::from_env()?;
    info!(
        data_dir = %config.paths.data_dir.display(),
        output_dir = %config.paths.output_dir.display(),
        fuzzy_threshold = config.matcher.fuzzy_threshold,
        max_images_per_term = config.matcher.max_images_per_term,
        fallback_images = config.matcher.fallback_images,
        "configuration loaded"
    );

    // 2. Match every term against captions, figure references and the catalog
    let store = JsonStore::new(config.paths.clone());
    let matcher = TermImageMatcher::new(config.matcher.clone());
    let report = MappingService::new(&store, GarbageDenoiser::new(), matcher).run()?;

    // 3. Report
    for (match_type, count) in &report.by_match_type {
        info!(match_type = %match_type, associations = count, "match type");
    }
    info!(
        terms = report.terms,
        terms_with_images = report.terms_with_images,
        associations = report.associations,
        images = report.images,
        caption_documents = report.caption_documents,
        "mapping complete"
    );
    Ok(())
}
