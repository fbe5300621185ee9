//! pagesync runner entry point.

mod app;
mod config;

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the manifest.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting pagesync");

    let config = config::Config::load()?;
    tracing::info!(
        project = %config.project,
        build_dir = %config.build_dir.display(),
        "configuration loaded"
    );

    let rt = tokio::runtime::Runtime::new()?;
    let manifest = rt.block_on(app::run(config))?;

    println!("{}", serde_json::to_string_pretty(&manifest)?);
    Ok(())
}
