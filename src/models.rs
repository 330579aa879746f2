//! Data models for article metadata and posted statuses.
//!
//! - [`MostViewedResponse`] / [`MostViewedEntry`]: the NYT Most Popular API payload
//! - [`TimesArticle`]: one article, with its body text fetched lazily and cached
//! - [`PostedStatus`]: what the social feed returned for a post

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

/// Response from the NYT `mostviewed` endpoint.
///
/// Only the fields the bot uses are modelled; the rest are ignored.
#[derive(Debug, Deserialize)]
pub struct MostViewedResponse {
    pub status: String,
    #[serde(default)]
    pub num_results: usize,
    #[serde(default)]
    pub results: Vec<MostViewedEntry>,
}

/// A single entry in [`MostViewedResponse::results`].
#[derive(Debug, Clone, Deserialize)]
pub struct MostViewedEntry {
    pub url: String,
    #[serde(default)]
    pub title: String,
    /// Semicolon-separated keyword list, e.g. `"Elections;Voting;Polls"`.
    #[serde(default)]
    pub adx_keywords: String,
}

/// A most-viewed article whose body is fetched on first use.
#[derive(Debug)]
pub struct TimesArticle {
    pub url: String,
    pub title: String,
    pub keywords: Vec<String>,
    /// Extracted body text; filled by `TimesArticle::text`.
    pub(crate) text: OnceCell<String>,
}

impl TimesArticle {
    /// Create an article whose body has not been fetched yet.
    pub fn new(url: String, title: String, keywords: Vec<String>) -> Self {
        Self {
            url,
            title,
            keywords,
            text: OnceCell::new(),
        }
    }

    /// Create an article with a known body, e.g. from a local file.
    pub fn with_text(url: String, text: String) -> Self {
        Self {
            url,
            title: String::new(),
            keywords: Vec::new(),
            text: OnceCell::new_with(Some(text)),
        }
    }
}

impl From<MostViewedEntry> for TimesArticle {
    fn from(entry: MostViewedEntry) -> Self {
        let keywords = entry
            .adx_keywords
            .split(';')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
        Self::new(entry.url, entry.title, keywords)
    }
}

/// A status accepted by the social feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedStatus {
    pub id: String,
    pub text: String,
}

/// Request body for `POST /2/tweets`.
#[derive(Debug, Serialize)]
pub struct CreateTweetRequest<'a> {
    pub text: &'a str,
}

/// Response body for `POST /2/tweets`.
#[derive(Debug, Deserialize)]
pub struct CreateTweetResponse {
    pub data: PostedStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_viewed_deserialization() {
        let json = r#"{
            "status": "OK",
            "copyright": "Copyright (c) 2025 The New York Times Company.",
            "num_results": 2,
            "results": [
                {
                    "url": "https://www.nytimes.com/2025/05/06/us/politics/budget.html",
                    "adx_keywords": "Budgets;Congress; House of Representatives",
                    "title": "Budget Talks Stall",
                    "id": 100000001
                },
                {
                    "url": "https://www.nytimes.com/2025/05/06/science/moon.html",
                    "title": "A New Moon"
                }
            ]
        }"#;

        let response: MostViewedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "OK");
        assert_eq!(response.num_results, 2);
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[1].adx_keywords, "");
    }

    #[test]
    fn test_article_keywords_are_split() {
        let entry = MostViewedEntry {
            url: "https://www.nytimes.com/a.html".to_string(),
            title: "A".to_string(),
            adx_keywords: "Budgets;Congress; House of Representatives;".to_string(),
        };

        let article = TimesArticle::from(entry);
        assert_eq!(
            article.keywords,
            vec!["Budgets", "Congress", "House of Representatives"]
        );
        assert!(article.text.get().is_none());
    }

    #[test]
    fn test_article_with_text_is_cached() {
        let article = TimesArticle::with_text("file://a.txt".to_string(), "Body.".to_string());
        assert_eq!(article.text.get().map(String::as_str), Some("Body."));
    }

    #[test]
    fn test_create_tweet_round_trip() {
        let body = serde_json::to_string(&CreateTweetRequest { text: "Hello." }).unwrap();
        assert_eq!(body, r#"{"text":"Hello."}"#);

        let json = r#"{"data": {"id": "1445880548472328192", "text": "Hello."}}"#;
        let response: CreateTweetResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data.id, "1445880548472328192");
        assert_eq!(response.data.text, "Hello.");
    }
}
