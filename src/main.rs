use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use clipfetch::application::services::{
    DownloadOrchestrator, Janitor, LocatorPolicy, Materializer, OrchestratorConfig,
};
use clipfetch::infrastructure::browser::{ChromiumDriver, ChromiumDriverConfig};
use clipfetch::infrastructure::observability::init_tracing;
use clipfetch::infrastructure::persistence::InMemoryJobStore;
use clipfetch::presentation::{create_router, AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();

    init_tracing();

    // The only process-fatal filesystem condition: everything downstream
    // assumes the output directory exists.
    std::fs::create_dir_all(&settings.downloads.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            settings.downloads.output_dir.display()
        )
    })?;

    let job_store = Arc::new(InMemoryJobStore::new());

    let driver = Arc::new(ChromiumDriver::new(
        ChromiumDriverConfig {
            headless: settings.browser.headless,
            chrome_executable: settings.browser.chrome_executable.clone(),
            download_dir: settings.downloads.output_dir.clone(),
            navigation_timeout: settings.browser.navigation_timeout(),
            transfer_timeout: settings.browser.transfer_timeout(),
        },
        LocatorPolicy::default(),
    ));

    let materializer = Materializer::new(
        settings.downloads.output_dir.clone(),
        settings.downloads.settle(),
        settings.downloads.recency_window(),
        settings.downloads.min_artifact_bytes,
    );

    let orchestrator = Arc::new(DownloadOrchestrator::new(
        job_store.clone(),
        driver,
        materializer,
        OrchestratorConfig {
            conversion_page_url: settings.browser.conversion_page_url.clone(),
            job_timeout: settings.browser.job_timeout(),
            debug_dir: settings.downloads.output_dir.clone(),
        },
    ));

    Janitor::new(
        settings.downloads.output_dir.clone(),
        settings.janitor.retention(),
        settings.janitor.interval(),
        job_store.clone(),
    )
    .spawn();

    let host: IpAddr = settings
        .server
        .host
        .parse()
        .with_context(|| format!("invalid SERVER_HOST: {}", settings.server.host))?;
    let addr = SocketAddr::new(host, settings.server.port);

    let state = AppState {
        job_store,
        orchestrator,
        settings,
    };
    let router = create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
