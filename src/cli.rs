//! Command-line interface definitions for kinda_newsy.
//!
//! Credentials can be passed as flags or through the environment, which is
//! how they are usually provided when the bot runs under a process manager.

use clap::Parser;

/// Command-line arguments for the kinda_newsy bot.
///
/// # Examples
///
/// ```sh
/// # Post forever using credentials from the environment
/// NYT_API_KEY=... TWITTER_BEARER_TOKEN=... kinda_newsy
///
/// # Generate once from a local file and only log the result
/// kinda_newsy --source-file article.txt --once --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// New York Times API key
    #[arg(long, env = "NYT_API_KEY", hide_env_values = true)]
    pub nyt_api_key: Option<String>,

    /// OAuth 2.0 user-context token used to post statuses
    #[arg(long, env = "TWITTER_BEARER_TOKEN", hide_env_values = true)]
    pub twitter_bearer_token: Option<String>,

    /// Seed text from a local file instead of the most-viewed articles
    #[arg(short, long)]
    pub source_file: Option<String>,

    /// Minimum status length in characters (overrides the config file)
    #[arg(long)]
    pub min_length: Option<usize>,

    /// Maximum status length in characters (overrides the config file)
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Log generated statuses instead of posting them
    #[arg(long)]
    pub dry_run: bool,
}
