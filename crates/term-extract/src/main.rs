mod config;
mod error;
mod parser;
mod pipeline;
mod references;

use tracing::info;
use tracing_subscriber::EnvFilter;

use atlas_common::denoise::GarbageDenoiser;
use atlas_common::store::JsonStore;
use config::Config;
use pipeline::TermPipeline;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting term extraction");

    let config = Config::from_env()?;
    info!(
        data_dir = %config.paths.data_dir.display(),
        output_dir = %config.paths.output_dir.display(),
        layout = ?config.layout,
        "configuration loaded"
    );

    let store = JsonStore::new(config.paths.clone());
    let report = TermPipeline::new(&store, GarbageDenoiser::new(), config.layout).run()?;

    info!(
        documents = report.documents,
        terms = report.terms,
        references = report.references,
        categories = report.categories,
        "term extraction complete"
    );
    Ok(())
}
