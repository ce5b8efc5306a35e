use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use news_digest::{
    config::Config,
    api::create_router,
    llm::HttpTextGenerator,
    scraper::HttpFetcher,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,news_digest=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let server_addr = config.server_addr;

    let model = HttpTextGenerator::load(&config);
    tracing::info!(model = %config.model_path, endpoint = model.endpoint(), "Model loaded");

    let app_state = AppState {
        config: Arc::new(config),
        model: Arc::new(model),
        fetcher: Arc::new(HttpFetcher),
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;
    tracing::info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
