//! New York Times most-viewed articles.
//!
//! Article metadata comes from the
//! [Most Popular API](https://developer.nytimes.com/docs/most-popular-product/1/overview)
//! (`mostviewed/all-sections/1.json`, the last day's most viewed stories).
//! Article bodies are scraped from the article page itself.
//!
//! # Body Extraction
//!
//! The body is every `<p>` under `section[name="articleBody"]`. Older article
//! templates use `div.articleBody` instead, which is tried when the first
//! selector finds nothing.

use crate::models::{MostViewedResponse, TimesArticle};
use crate::utils::truncate_for_log;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

const MOST_VIEWED_URL: &str =
    "https://api.nytimes.com/svc/mostpopular/v2/mostviewed/all-sections/1.json";

static BODY_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["section[name=\"articleBody\"] p", "div.articleBody p"]
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
});

static LEFTOVER_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Fetch the list of most-viewed articles.
///
/// # Arguments
///
/// * `client` - Shared HTTP client
/// * `api_key` - NYT developer API key
///
/// # Returns
///
/// One [`TimesArticle`] per distinct URL, in API order. Bodies are not fetched.
#[instrument(level = "info", skip_all)]
pub async fn index_articles(
    client: &Client,
    api_key: &str,
) -> Result<Vec<TimesArticle>, Box<dyn Error>> {
    let url = Url::parse_with_params(MOST_VIEWED_URL, &[("api-key", api_key)])?;

    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let payload: MostViewedResponse = match serde_json::from_str(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(
                error = %e,
                response_preview = %truncate_for_log(&body, 300),
                "NYT API returned unexpected JSON"
            );
            return Err(e.into());
        }
    };
    let articles = articles_from_response(payload);

    info!(count = articles.len(), "Indexed NYT most-viewed articles");
    debug!(urls = ?articles.iter().map(|a| &a.url).collect::<Vec<_>>(), "NYT URLs");
    Ok(articles)
}

/// Turn an API payload into articles, dropping entries with a repeated or
/// unparsable URL.
pub fn articles_from_response(payload: MostViewedResponse) -> Vec<TimesArticle> {
    if payload.status != "OK" {
        warn!(status = %payload.status, "NYT API returned a non-OK status");
    }
    payload
        .results
        .into_iter()
        .filter(|entry| Url::parse(&entry.url).is_ok())
        .unique_by(|entry| entry.url.clone())
        .map(TimesArticle::from)
        .collect()
}

impl TimesArticle {
    /// Body text of the article, fetched on first call and cached after.
    ///
    /// # Errors
    ///
    /// Fails if the request fails, the server answers with a non-2xx status,
    /// or the page has no recognizable article body.
    #[instrument(level = "info", skip_all, fields(url = %self.url))]
    pub async fn text(&self, client: &Client) -> Result<&str, Box<dyn Error>> {
        let text = self
            .text
            .get_or_try_init(|| fetch_article_text(client, &self.url))
            .await?;
        Ok(text.as_str())
    }
}

async fn fetch_article_text(client: &Client, url: &str) -> Result<String, Box<dyn Error>> {
    let html = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let body = extract_article_body(&html);
    if body.is_empty() {
        return Err(format!("no article body found at {url}").into());
    }
    info!(chars = body.chars().count(), "Parsed NYT article");
    Ok(body)
}

/// Extract the article body text from a full article page.
///
/// Paragraphs are joined with single spaces. Returns an empty string when no
/// body paragraphs are found.
pub fn extract_article_body(html: &str) -> String {
    let document = Html::parse_document(html);

    for selector in BODY_SELECTORS.iter() {
        let paragraphs: Vec<String> = document
            .select(selector)
            .map(|p| p.text().collect::<String>())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect();

        if !paragraphs.is_empty() {
            let joined = paragraphs.join(" ");
            let stripped = LEFTOVER_TAGS.replace_all(&joined, "");
            return WHITESPACE.replace_all(stripped.trim(), " ").into_owned();
        }
    }
    String::new()
}
