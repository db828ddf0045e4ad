mod config;
mod documents;
mod error;
mod translator;

use tracing::info;
use tracing_subscriber::EnvFilter;

use atlas_common::store::JsonStore;
use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting term translation");

    // 1. Load config from environment
    let config = Config::from_env();
    info!(
        base_url = %config.translator.base_url,
        source_lang = %config.translator.source_lang,
        target_lang = %config.translator.target_lang,
        timeout_ms = config.translator.default_timeout.as_millis(),
        max_retries = config.translator.max_retries,
        files = config.files.len(),
        "configuration loaded"
    );

    // 2. Translation client
    let translator = translator::http_translator(config.translator.clone())?;
    let store = JsonStore::new(config.paths.clone());

    // 3. Translate each term file in place
    let mut translated_files = 0;
    for name in &config.files {
        let path = config.paths.output_file(name);
        if documents::translate_file(&store, &path, &translator).await?.is_some() {
            translated_files += 1;
        }
    }

    info!(files = translated_files, "translation complete");
    Ok(())
}
