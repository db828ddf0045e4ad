mod config;
mod error;
mod extractor;
mod organize;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use atlas_common::error::CommonError;
use atlas_common::store::{AtlasStore, JsonStore};
use config::Config;
use extractor::{Extractor, Poppler};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting pdf extraction");

    // 1. Load config from environment
    let config = Config::from_env()?;
    info!(
        pdf_dir = %config.paths.pdf_dir.display(),
        data_dir = %config.paths.data_dir.display(),
        images_dir = %config.paths.images_dir.display(),
        force = config.force,
        "configuration loaded"
    );
    let store = JsonStore::new(config.paths.clone());

    // 2. Previous metadata lets unchanged documents be skipped
    let previous = match store.load_metadata() {
        Ok(records) => records,
        Err(CommonError::MissingInput(_)) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "previous metadata unreadable, extracting everything");
            Vec::new()
        }
    };

    // 3. Extract text and images
    let tools = Poppler::new(&config.pdftotext_bin, &config.pdfimages_bin);
    let extractor = Extractor::new(&config.paths, tools, config.force);
    let records = extractor.run(&previous)?;
    store.save_metadata(&records)?;
    info!(
        documents = records.len(),
        metadata = %config.paths.metadata_file().display(),
        "extraction complete"
    );

    // 4. Catalog, content listing and summary
    let summary = organize::organize(&store, &records, &config.paths.images_dir)?;
    info!(
        categories = summary.categories.len(),
        documents = summary.total_documents,
        images = summary.total_images,
        "content organized"
    );
    Ok(())
}
