use axum::{
    routing::{get, post},
    Router,
    extract::{Json, Query, State},
    response::IntoResponse,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::Result;
use crate::api::models::{ArticlesQuery, StatusResponse, SummaryRequest, SummaryResponse};
use crate::api::response;
use crate::llm::GenerationParams;
use crate::scraper::DetikScraper;
use crate::summarizer;
use crate::AppState;

pub const STATUS_MESSAGE: &str = "FastAPI is running";

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(status_handler))
        .route("/test", post(summarize_handler))
        .route("/articles", get(articles_handler))
        .layer(TraceLayer::new_for_http())
        // Any origin with credentials: echo the request back instead of `*`.
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true),
        )
        .with_state(app_state)
}

async fn status_handler() -> impl IntoResponse {
    response::success(StatusResponse {
        message: STATUS_MESSAGE,
    })
}

async fn summarize_handler(
    State(state): State<AppState>,
    Json(req): Json<SummaryRequest>,
) -> Result<impl IntoResponse> {
    let params = GenerationParams::from(req.params);
    let summary = summarizer::summarize(state.model.as_ref(), &req.text_data.text, &params).await?;

    Ok(response::success(SummaryResponse {
        summary_text: summary,
    }))
}

async fn articles_handler(
    State(state): State<AppState>,
    Query(query): Query<ArticlesQuery>,
) -> Result<impl IntoResponse> {
    info!(keywords = %query.keywords, pages = query.pages, "Scraping articles");
    let start_time = std::time::Instant::now();

    let scraper = DetikScraper::new(state.fetcher.clone(), state.config.search_url.clone());
    let articles = scraper.scrape(&query.keywords, query.pages).await?;

    info!(count = articles.len(), elapsed = ?start_time.elapsed(), "Scrape request done");
    Ok(response::success(articles))
}
