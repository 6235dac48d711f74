use std::sync::Arc;

use anyhow::{Context, Result};
use edumate_http::{AppState, create_router};
use edumate_ingest::{HttpFetcher, PageFetcher};
use edumate_llm::{Assistant, ChatModel, DisabledSearch, LlmClient, SearxSearch, WebSearch};
use edumate_service::Services;
use edumate_storage::Storage;
use tokio::signal;

use crate::config::AppConfig;

pub(crate) async fn run(config: AppConfig, host: String, port: u16) -> Result<()> {
    config.ensure_db_dir()?;
    let storage = Arc::new(Storage::new(&config.db_path)?);

    let api_key = config
        .llm_api_key
        .clone()
        .context("EDUMATE_LLM_API_KEY environment variable must be set")?;
    let llm = LlmClient::new(api_key, config.llm_api_url.clone())?;
    tracing::info!(model = llm.model(), base_url = llm.base_url(), "LLM client configured");
    let assistant = Assistant::new(Arc::new(llm) as Arc<dyn ChatModel>);

    let search: Arc<dyn WebSearch> = match config.search_url.as_deref() {
        Some(url) => {
            tracing::info!(url, "Web search enabled");
            Arc::new(SearxSearch::new(url)?)
        },
        None => {
            tracing::info!("EDUMATE_SEARCH_URL not set, web search disabled");
            Arc::new(DisabledSearch)
        },
    };
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(config.fetch_timeout)?);

    if config.api_key.is_none() {
        tracing::warn!("EDUMATE_API_KEY not set, API is open to any client");
    }
    let services = Services::new(storage, assistant, search, fetcher, config.request_timeout);
    let state = Arc::new(AppState { services, api_key: config.api_key });

    let router = create_router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "Starting HTTP server");
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;
    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, starting shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting shutdown"),
    }
}
