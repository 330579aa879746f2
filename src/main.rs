//! # kinda_newsy
//!
//! A bot that reads the day's most viewed New York Times articles, feeds one
//! of them through a first-order Markov chain and posts the remixed prose to
//! a social feed.
//!
//! ## Usage
//!
//! ```sh
//! NYT_API_KEY=... TWITTER_BEARER_TOKEN=... kinda_newsy --config kinda_newsy.yaml
//! kinda_newsy --source-file article.txt --once --dry-run
//! ```
//!
//! ## Architecture
//!
//! Each cycle runs:
//! 1. **Indexing**: list the most viewed articles
//! 2. **Fetching**: download and extract the body of a randomly chosen article
//! 3. **Generating**: build a Markov chain and resample until the text fits
//! 4. **Posting**: publish the status with retry and backoff
//!
//! Between cycles the bot sleeps for a fixed interval plus random jitter.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use kinda_newsy::api::{LogOnlyPoster, StatusPoster, TwitterClient};
use kinda_newsy::bot::{ArticleSource, run_cycle};
use kinda_newsy::cli::Cli;
use kinda_newsy::config::{BotConfig, load_config};
use kinda_newsy::scrapers;
use kinda_newsy::utils::{next_post_at, sleep_interval};
use reqwest::Client;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "kinda_newsy starting up");

    let args = Cli::parse();
    debug!(config = ?args.config, source_file = ?args.source_file, once = args.once, dry_run = args.dry_run, "Parsed CLI arguments");

    let mut config = load_config(args.config.as_deref()).await?;
    config.apply_cli(&args);
    config.validate()?;
    info!(
        min_length = config.min_length,
        max_length = config.max_length,
        base_sleep_minutes = config.base_sleep_minutes,
        jitter_sleep_minutes = config.jitter_sleep_minutes,
        "Configuration ready"
    );

    let source = match (&args.source_file, &args.nyt_api_key) {
        (Some(path), _) => ArticleSource::File { path: path.clone() },
        (None, Some(api_key)) => ArticleSource::MostViewed {
            api_key: api_key.clone(),
        },
        (None, None) => {
            error!("No article source: pass --source-file or set NYT_API_KEY");
            return Err("missing NYT API key".into());
        }
    };

    let client = scrapers::http_client(&config)?;

    if args.dry_run {
        return run_schedule(&source, &client, &config, &LogOnlyPoster, args.once).await;
    }

    let Some(token) = args.twitter_bearer_token.clone() else {
        error!("No posting credentials: set TWITTER_BEARER_TOKEN or use --dry-run");
        return Err("missing Twitter bearer token".into());
    };
    let poster = TwitterClient::new(client.clone(), token);
    run_schedule(&source, &client, &config, &poster, args.once).await
}

/// Post, sleep, repeat. Returns after one cycle when `once` is set, or on Ctrl-C.
///
/// A failed cycle is logged and the schedule continues. With `once`, the
/// cycle's error is returned instead.
#[instrument(level = "info", skip_all, fields(once = once))]
async fn run_schedule<P: StatusPoster>(
    source: &ArticleSource,
    client: &Client,
    config: &BotConfig,
    poster: &P,
    once: bool,
) -> Result<(), Box<dyn Error>> {
    let mut cycle = 0u64;
    loop {
        cycle += 1;
        let start_time = std::time::Instant::now();

        match run_cycle(source, client, config, poster).await {
            Ok(status) => info!(cycle, id = %status.id, chars = status.text.chars().count(), elapsed_ms = start_time.elapsed().as_millis(), "Cycle complete"),
            Err(e) if once => {
                error!(cycle, error = %e, "Cycle failed");
                return Err(e);
            }
            Err(e) => error!(cycle, error = %e, "Cycle failed; will try again next time"),
        }

        if once {
            return Ok(());
        }

        let pause = sleep_interval(config, &mut rand::rng());
        match next_post_at(Local::now(), pause) {
            Some(next_at) => info!(minutes = pause.as_secs() / 60, next_at = %next_at.format("%Y-%m-%d %H:%M"), "Sleeping until next post"),
            None => warn!(minutes = pause.as_secs() / 60, "Sleeping; next post time is out of range"),
        }

        tokio::select! {
            _ = tokio::time::sleep(pause) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted; shutting down");
                return Ok(());
            }
        }
    }
}
