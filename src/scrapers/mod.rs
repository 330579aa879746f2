//! Article sources that supply seed text for generation.
//!
//! Each source follows the same two-phase pattern:
//!
//! 1. **Indexing**: list candidate articles (metadata only)
//! 2. **Fetching**: download and extract the body of the article that is
//!    actually used, cached on the article so retries do not refetch
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | New York Times | [`nyt`] | Most Popular API + HTML scraping | Requires API key |

pub mod nyt;

use reqwest::Client;
use std::error::Error;

/// Build the HTTP client shared by all sources.
pub fn http_client(config: &crate::config::BotConfig) -> Result<Client, Box<dyn Error>> {
    let client = Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.request_timeout())
        .build()?;
    Ok(client)
}
