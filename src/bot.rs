//! One posting cycle: pick an article, remix it, post the result.
//!
//! # Flow
//!
//! 1. Load candidate articles ([`ArticleSource`])
//! 2. Pick one at random, fetch its body and build a [`MarkovGenerator`]
//! 3. Resample until a status fits the feed's length limit
//! 4. Post it
//!
//! An article that cannot produce a status (fetch failure, unusable text, no
//! sample short enough) is skipped and another one is picked, up to
//! `max_article_attempts` times.

use crate::api::{StatusPoster, post_with_backoff};
use crate::config::BotConfig;
use crate::markov::{MarkovError, MarkovGenerator};
use crate::models::{PostedStatus, TimesArticle};
use crate::scrapers::nyt;
use rand::Rng;
use rand::seq::IndexedRandom;
use reqwest::Client;
use std::error::Error;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Errors from composing a status.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("no articles to choose from")]
    NoArticles,

    /// Every sample was longer than the feed allows.
    #[error("no status of at most {max_length} characters after {attempts} attempts")]
    ResampleExhausted { attempts: usize, max_length: usize },

    #[error("none of the {tried} articles tried produced a status")]
    NoUsableArticle { tried: usize },

    #[error(transparent)]
    Markov(#[from] MarkovError),
}

/// Where seed text comes from.
#[derive(Debug, Clone)]
pub enum ArticleSource {
    /// The NYT most-viewed list, re-indexed every cycle.
    MostViewed { api_key: String },
    /// A local text file, used as the only article.
    File { path: String },
}

impl ArticleSource {
    /// List the articles available for this cycle.
    #[instrument(level = "info", skip_all)]
    pub async fn load(&self, client: &Client) -> Result<Vec<TimesArticle>, Box<dyn Error>> {
        match self {
            Self::MostViewed { api_key } => nyt::index_articles(client, api_key).await,
            Self::File { path } => {
                let text = tokio::fs::read_to_string(path).await?;
                info!(%path, chars = text.chars().count(), "Loaded source file");
                Ok(vec![TimesArticle::with_text(path.clone(), text)])
            }
        }
    }
}

/// Generate statuses until one is at most `config.max_length` characters.
///
/// # Errors
///
/// - [`BotError::ResampleExhausted`] after `config.max_resample_attempts` samples
/// - [`BotError::Markov`] if the generator itself fails
pub fn generate_within_limit<R: Rng + ?Sized>(
    generator: &MarkovGenerator,
    rng: &mut R,
    config: &BotConfig,
) -> Result<String, BotError> {
    for attempt in 1..=config.max_resample_attempts {
        let text = generator.generate_with(rng, config.min_length)?;
        let chars = text.chars().count();
        if chars <= config.max_length {
            debug!(attempt, chars, "Sample fits");
            return Ok(text);
        }
        debug!(attempt, chars, max = config.max_length, "Sample too long; resampling");
    }
    Err(BotError::ResampleExhausted {
        attempts: config.max_resample_attempts,
        max_length: config.max_length,
    })
}

/// Pick articles at random until one yields a status that fits.
#[instrument(level = "info", skip_all, fields(articles = articles.len()))]
pub async fn compose_status<R: Rng + ?Sized>(
    articles: &[TimesArticle],
    client: &Client,
    config: &BotConfig,
    rng: &mut R,
) -> Result<String, BotError> {
    if articles.is_empty() {
        return Err(BotError::NoArticles);
    }

    for attempt in 1..=config.max_article_attempts {
        let Some(article) = articles.choose(rng) else {
            return Err(BotError::NoArticles);
        };

        let text = match article.text(client).await {
            Ok(text) => text,
            Err(e) => {
                warn!(attempt, url = %article.url, error = %e, "Article fetch failed");
                continue;
            }
        };

        let status = MarkovGenerator::new(text)
            .map(|g| g.with_max_steps(config.max_walk_steps))
            .map_err(BotError::from)
            .and_then(|generator| generate_within_limit(&generator, rng, config));

        match status {
            Ok(status) => {
                info!(attempt, url = %article.url, title = %article.title, keywords = ?article.keywords, "Composed status");
                return Ok(status);
            }
            Err(e) => warn!(attempt, url = %article.url, error = %e, "Article unusable; trying another"),
        }
    }

    Err(BotError::NoUsableArticle {
        tried: config.max_article_attempts,
    })
}

/// Run one full cycle: load articles, compose a status and post it.
#[instrument(level = "info", skip_all)]
pub async fn run_cycle<P: StatusPoster>(
    source: &ArticleSource,
    client: &Client,
    config: &BotConfig,
    poster: &P,
) -> Result<PostedStatus, Box<dyn Error>> {
    let articles = source.load(client).await?;
    let status = compose_status(&articles, client, config, &mut rand::rng()).await?;
    post_with_backoff(poster, &status).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::LogOnlyPoster;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const SOURCE: &str = "The council met on Tuesday. The mayor said the budget was late. \
        Residents asked why. The council said nothing at all about the budget or the delay. \
        Mr. Park left early.";

    fn config(min_length: usize, max_length: usize) -> BotConfig {
        BotConfig {
            min_length,
            max_length,
            max_resample_attempts: 50,
            max_article_attempts: 5,
            ..BotConfig::default()
        }
    }

    fn cached(url: &str, text: &str) -> TimesArticle {
        TimesArticle::with_text(url.to_string(), text.to_string())
    }

    #[test]
    fn test_generate_within_limit_fits() {
        let generator = MarkovGenerator::new(SOURCE).unwrap();
        let config = config(20, 140);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..50 {
            let status = generate_within_limit(&generator, &mut rng, &config).unwrap();
            let chars = status.chars().count();
            assert!((20..=140).contains(&chars), "{chars}: {status:?}");
        }
    }

    #[test]
    fn test_generate_within_limit_exhausts() {
        // Every sample is "Hi. Hi. Hi." (11 chars) with a floor of 10.
        let generator = MarkovGenerator::new("Hi. Hi.").unwrap();
        let config = BotConfig {
            max_resample_attempts: 3,
            ..config(10, 5)
        };

        let err = generate_within_limit(&generator, &mut StdRng::seed_from_u64(0), &config)
            .unwrap_err();
        assert!(matches!(
            err,
            BotError::ResampleExhausted {
                attempts: 3,
                max_length: 5
            }
        ));
    }

    #[test]
    fn test_generate_within_limit_counts_characters() {
        // "éé." is 3 chars but 5 bytes; it must fit a 4 character limit.
        let generator = MarkovGenerator::new("éé. éé.").unwrap();
        let config = BotConfig {
            max_resample_attempts: 1,
            ..config(1, 4)
        };

        let status = generate_within_limit(&generator, &mut StdRng::seed_from_u64(0), &config)
            .unwrap();
        assert_eq!(status, "éé.");
    }

    #[test]
    fn test_generate_within_limit_propagates_markov_errors() {
        let generator = MarkovGenerator::new("no openers here.").unwrap();
        let err = generate_within_limit(&generator, &mut StdRng::seed_from_u64(0), &config(10, 140))
            .unwrap_err();
        assert!(matches!(err, BotError::Markov(MarkovError::NoOpeners)));
    }

    #[tokio::test]
    async fn test_compose_status_skips_unusable_articles() {
        let articles = vec![cached("bad", "word"), cached("good", SOURCE)];
        let config = BotConfig {
            max_article_attempts: 50,
            ..config(20, 140)
        };
        let mut rng = StdRng::seed_from_u64(5);

        let status = compose_status(&articles, &Client::new(), &config, &mut rng)
            .await
            .unwrap();
        assert!(status.ends_with('.'));
        assert!(status.chars().count() <= 140);
    }

    #[tokio::test]
    async fn test_compose_status_gives_up() {
        let articles = vec![cached("a", "word"), cached("b", "no openers.")];
        let config = config(10, 140);

        let err = compose_status(&articles, &Client::new(), &config, &mut StdRng::seed_from_u64(1))
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::NoUsableArticle { tried: 5 }));
    }

    #[tokio::test]
    async fn test_compose_status_without_articles() {
        let err = compose_status(&[], &Client::new(), &config(10, 140), &mut rand::rng())
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::NoArticles));
    }

    #[tokio::test]
    async fn test_run_cycle_from_file() {
        let path = std::env::temp_dir().join(format!("kinda_newsy_cycle_{}.txt", std::process::id()));
        tokio::fs::write(&path, SOURCE).await.unwrap();
        let source = ArticleSource::File {
            path: path.to_string_lossy().into_owned(),
        };

        let posted = run_cycle(&source, &Client::new(), &config(20, 140), &LogOnlyPoster)
            .await
            .unwrap();
        assert_eq!(posted.id, "dry-run");
        assert!(posted.text.chars().count() <= 140);

        let _ = tokio::fs::remove_file(&path).await;
    }
}
