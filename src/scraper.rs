use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder, Url};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppError, Result};

// Create a static client to reuse connections
static CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build HTTP client")
});

// Create static selectors to avoid recompiling them each time
static ARTICLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("article").expect("Failed to parse article selector")
});
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[href]").expect("Failed to parse link selector")
});
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h1.detail__title").expect("Failed to parse title selector")
});
static DATE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.detail__date").expect("Failed to parse date selector")
});
static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.detail__body-text").expect("Failed to parse body selector")
});
static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p").expect("Failed to parse paragraph selector")
});

pub const NO_LINK: &str = "No Link";
pub const NO_TITLE: &str = "No Title";
pub const NO_DATE: &str = "No Date";
pub const NO_CONTENT: &str = "No Content";
pub const NO_ARTICLE_TEXT: &str = "No Article Text Found";

const BOILERPLATE: [&str; 2] = ["ADVERTISEMENT", "SCROLL TO CONTINUE WITH CONTENT"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub published_time: String,
    pub href: String,
    pub text: String,
}

impl Article {
    /// Stand-in for a listing entry that carries no link.
    pub fn unlinked() -> Self {
        Self {
            title: NO_TITLE.to_string(),
            published_time: NO_DATE.to_string(),
            href: NO_LINK.to_string(),
            text: NO_CONTENT.to_string(),
        }
    }
}

/// Retrieves raw HTML for a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Plain GET over the shared client, no extra headers. Error statuses are
/// not failures: their body is returned like any other page, so a dead
/// article link parses to placeholders. Only transport errors propagate.
#[derive(Debug, Clone, Copy)]
pub struct HttpFetcher;

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = CLIENT.get(url).send().await?;
        if !response.status().is_success() {
            debug!(%url, status = %response.status(), "Non-success status, parsing body anyway");
        }
        let html = response.text().await?;
        Ok(html)
    }
}

/// Keyword crawler for detik.com search results.
pub struct DetikScraper {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
}

impl DetikScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
        }
    }

    pub fn listing_url(&self, keywords: &str, page: u32) -> Result<Url> {
        let page = page.to_string();
        Url::parse_with_params(
            &self.base_url,
            &[("query", keywords), ("sortby", "time"), ("page", page.as_str())],
        )
        .map_err(|e| AppError::ParseError(format!("Invalid search URL {}: {}", self.base_url, e)))
    }

    /// Crawls result pages `1..=pages` in order. The first failed request
    /// aborts the crawl and nothing gathered so far is returned.
    pub async fn scrape(&self, keywords: &str, pages: u32) -> Result<Vec<Article>> {
        let mut articles = Vec::new();

        for page in 1..=pages {
            let url = self.listing_url(keywords, page)?;
            let html = self.fetcher.fetch(url.as_str()).await?;
            let entries = parse_listing(&html, &url);
            info!(page, entries = entries.len(), %url, "Parsed listing page");

            for link in entries {
                let article = match link {
                    Some(href) => self.scrape_article(href).await?,
                    None => Article::unlinked(),
                };
                articles.push(article);
            }
        }

        info!(keywords, pages, total = articles.len(), "Scrape finished");
        Ok(articles)
    }

    // Metadata and body come from two separate requests against the same URL.
    // TODO: share one fetch between parse_article_details and parse_article_text.
    async fn scrape_article(&self, href: String) -> Result<Article> {
        debug!(%href, "Fetching article");

        let page = self.fetcher.fetch(&href).await?;
        let (title, published_time) = parse_article_details(&page);

        let page = self.fetcher.fetch(&href).await?;
        let text = parse_article_text(&page);

        Ok(Article {
            title,
            published_time,
            href,
            text,
        })
    }
}

/// One entry per `<article>` on a listing page: its first link, resolved
/// against the listing URL, or `None` when it has none. Anchors without an
/// `href` are skipped, so a later `<a href>` in the same entry is used.
pub fn parse_listing(html: &str, page_url: &Url) -> Vec<Option<String>> {
    let document = Html::parse_document(html);

    document
        .select(&ARTICLE_SELECTOR)
        .map(|article| {
            article
                .select(&LINK_SELECTOR)
                .next()
                .and_then(|link| link.value().attr("href"))
                .map(|href| {
                    page_url
                        .join(href)
                        .map(|url| url.to_string())
                        .unwrap_or_else(|_| href.to_string())
                })
        })
        .collect()
}

pub fn parse_article_details(html: &str) -> (String, String) {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| strip_line_breaks(element_text(el).trim()))
        .unwrap_or_else(|| NO_TITLE.to_string());

    let published_time = document
        .select(&DATE_SELECTOR)
        .next()
        .map(element_text)
        .map(|date| {
            let date = date.trim();
            // "Senin, 01 Jan 2024 10:00 WIB | detikNews" keeps only the timestamp
            let date = date.split('|').next().unwrap_or(date);
            strip_line_breaks(date.trim())
        })
        .unwrap_or_else(|| NO_DATE.to_string());

    (title, published_time)
}

pub fn parse_article_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let Some(body) = document.select(&BODY_SELECTOR).next() else {
        return NO_ARTICLE_TEXT.to_string();
    };

    body.select(&PARAGRAPH_SELECTOR)
        .map(|p| strip_boilerplate(&element_text(p)))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

fn strip_line_breaks(text: &str) -> String {
    text.replace(['\r', '\n'], "")
}

fn strip_boilerplate(text: &str) -> String {
    BOILERPLATE
        .iter()
        .fold(text.to_string(), |acc, noise| acc.replace(noise, ""))
}
