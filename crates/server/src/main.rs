use std::{path::PathBuf, sync::Arc};

use db::DBService;
use server::{AppState, app};
use services::services::{
    config::Config,
    renderer::ChromiumRenderer,
    reports::ReportService,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let db = DBService::new(&config.database_url).await?;

    let renderer =
        match ChromiumRenderer::discover(config.chromium_path.clone(), config.render_timeout) {
            Ok(renderer) => renderer,
            Err(err) => {
                // Spreadsheet output still works; PDF requests will fail
                // with a dependency error until a browser is installed.
                warn!(error = %err, "chromium not found, pdf rendering unavailable");
                ChromiumRenderer::new(PathBuf::from("chromium"), config.render_timeout)
            }
        };

    let state = AppState {
        db,
        reports: Arc::new(ReportService::new(Arc::new(renderer))),
        config: Arc::new(config.clone()),
    };

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "server listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}
