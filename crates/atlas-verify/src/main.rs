mod checks;

use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use atlas_common::config::AtlasPaths;
use atlas_common::store::JsonStore;
use checks::Status;

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting verification");

    // 1. Load paths from environment
    let paths = AtlasPaths::from_env();
    info!(
        pdf_dir = %paths.pdf_dir.display(),
        data_dir = %paths.data_dir.display(),
        images_dir = %paths.images_dir.display(),
        output_dir = %paths.output_dir.display(),
        "configuration loaded"
    );

    // 2. Run checks
    let store = JsonStore::new(paths);
    let outcomes = checks::run_all(&store);

    // 3. Report
    for outcome in &outcomes {
        for (level, detail) in &outcome.details {
            match level {
                Status::Pass => info!(check = outcome.name, "{detail}"),
                Status::Warn => warn!(check = outcome.name, "{detail}"),
                Status::Fail => error!(check = outcome.name, "{detail}"),
            }
        }
    }

    if checks::all_passed(&outcomes) {
        info!(checks = outcomes.len(), "verification passed");
        Ok(ExitCode::SUCCESS)
    } else {
        let failed: Vec<&str> = outcomes
            .iter()
            .filter(|o| o.status == Status::Fail)
            .map(|o| o.name)
            .collect();
        error!(failed = ?failed, "verification failed");
        Ok(ExitCode::FAILURE)
    }
}
