//! Social feed posting with exponential backoff retry logic.
//!
//! # Architecture
//!
//! - [`StatusPoster`]: core trait for anything that can publish a status
//! - [`TwitterClient`]: posts to the X/Twitter v2 API
//! - [`LogOnlyPoster`]: logs the status instead of posting it (dry runs)
//! - [`RetryPost`]: decorator that adds retry logic to any `StatusPoster`
//!
//! # Retry Strategy
//!
//! - Maximum 5 retry attempts
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to each delay

use crate::models::{CreateTweetRequest, CreateTweetResponse, PostedStatus};
use rand::{Rng, rng};
use reqwest::Client;
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

const CREATE_TWEET_URL: &str = "https://api.twitter.com/2/tweets";

/// Something that can publish a status to a feed.
pub trait StatusPoster {
    /// Publish `text` and return the status as the feed recorded it.
    async fn post(&self, text: &str) -> Result<PostedStatus, Box<dyn Error>>;
}

impl<T: StatusPoster> StatusPoster for &T {
    async fn post(&self, text: &str) -> Result<PostedStatus, Box<dyn Error>> {
        (**self).post(text).await
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`StatusPoster`].
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryPost<T> {
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> RetryPost<T>
where
    T: StatusPoster,
{
    /// Wrap `inner` with up to `max_retries` retries starting at `base_delay`.
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    /// Delay before retry number `attempt` (1-based), without jitter.
    fn backoff(&self, attempt: usize) -> StdDuration {
        let shift = (attempt.saturating_sub(1)).min(31) as u32;
        self.base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }
}

impl<T> fmt::Debug for RetryPost<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPost")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> StatusPoster for RetryPost<T>
where
    T: StatusPoster,
{
    #[instrument(level = "info", skip_all)]
    async fn post(&self, text: &str) -> Result<PostedStatus, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.post(text).await {
                Ok(status) => return Ok(status),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis(),
                            elapsed_ms_total = total_dt.as_millis(),
                            error = %e,
                            "post() exhausted retries"
                        );
                        return Err(e);
                    }

                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = self.backoff(attempt) + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis(),
                        elapsed_ms_total = total_dt.as_millis(),
                        ?delay,
                        error = %e,
                        "post() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Posts statuses through the X/Twitter v2 API.
///
/// Authenticates with an OAuth 2.0 user-context access token carrying the
/// `tweet.write` scope.
pub struct TwitterClient {
    http: Client,
    bearer: String,
}

impl TwitterClient {
    /// Create a client that posts with `bearer_token` over `http`.
    pub fn new(http: Client, bearer_token: String) -> Self {
        Self {
            http,
            bearer: bearer_token,
        }
    }
}

impl fmt::Debug for TwitterClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwitterClient")
            .field("bearer", &"<redacted>")
            .finish()
    }
}

impl StatusPoster for TwitterClient {
    #[instrument(level = "info", skip_all, fields(chars = text.chars().count()))]
    async fn post(&self, text: &str) -> Result<PostedStatus, Box<dyn Error>> {
        let t0 = Instant::now();
        let response = self
            .http
            .post(CREATE_TWEET_URL)
            .bearer_auth(&self.bearer)
            .json(&CreateTweetRequest { text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                elapsed_ms = t0.elapsed().as_millis(),
                %status,
                body = %crate::utils::truncate_for_log(&body, 300),
                "Post rejected"
            );
            return Err(format!("post failed with status {status}").into());
        }

        let created: CreateTweetResponse = response.json().await?;
        info!(id = %created.data.id, elapsed_ms = t0.elapsed().as_millis(), "Posted status");
        Ok(created.data)
    }
}

/// Logs statuses instead of posting them.
#[derive(Debug, Default)]
pub struct LogOnlyPoster;

impl StatusPoster for LogOnlyPoster {
    async fn post(&self, text: &str) -> Result<PostedStatus, Box<dyn Error>> {
        info!(chars = text.chars().count(), %text, "Dry run; not posting");
        Ok(PostedStatus {
            id: "dry-run".to_string(),
            text: text.to_string(),
        })
    }
}

/// Post `text` with exponential backoff: up to 5 retries, 1s doubling to 30s.
#[instrument(level = "info", skip_all)]
pub async fn post_with_backoff<P: StatusPoster>(
    poster: &P,
    text: &str,
) -> Result<PostedStatus, Box<dyn Error>> {
    let t0 = Instant::now();
    let api = RetryPost::new(poster, 5, StdDuration::from_secs(1));
    let res = api.post(text).await;
    let dt = t0.elapsed();

    match &res {
        Ok(status) => info!(id = %status.id, elapsed_ms_total = dt.as_millis(), "post_with_backoff succeeded"),
        Err(e) => error!(elapsed_ms_total = dt.as_millis(), error = %e, "post_with_backoff failed"),
    }
    res
}
