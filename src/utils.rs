//! Helpers for scheduling and log formatting.

use crate::config::BotConfig;
use chrono::{DateTime, Local, TimeDelta};
use rand::Rng;
use std::time::Duration;

/// Pause between two posts: `base_sleep_minutes` plus a uniform random
/// number of whole minutes in `0..=jitter_sleep_minutes`. Saturates instead
/// of overflowing.
pub fn sleep_interval<R: Rng>(config: &BotConfig, rng: &mut R) -> Duration {
    let jitter = rng.random_range(0..=config.jitter_sleep_minutes);
    let minutes = config.base_sleep_minutes.saturating_add(jitter);
    Duration::from_secs(minutes.saturating_mul(60))
}

/// Wall-clock time `pause` after `now`, or `None` if it is not representable.
pub fn next_post_at(now: DateTime<Local>, pause: Duration) -> Option<DateTime<Local>> {
    let delta = TimeDelta::from_std(pause).ok()?;
    now.checked_add_signed(delta)
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters and get an ellipsis and the
/// number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
        assert_eq!(truncate_for_log(s, 13), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        assert_eq!(truncate_for_log("ééé", 1), "é…(+4 bytes)");
    }

    #[test]
    fn test_sleep_interval_bounds() {
        let config = BotConfig {
            base_sleep_minutes: 30,
            jitter_sleep_minutes: 300,
            ..BotConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..1000 {
            let minutes = sleep_interval(&config, &mut rng).as_secs() / 60;
            assert!((30..=330).contains(&minutes), "out of range: {minutes}");
        }
    }

    #[test]
    fn test_sleep_interval_saturates() {
        let config = BotConfig {
            base_sleep_minutes: u64::MAX,
            jitter_sleep_minutes: u64::MAX,
            ..BotConfig::default()
        };
        let interval = sleep_interval(&config, &mut StdRng::seed_from_u64(1));
        assert_eq!(interval, Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_next_post_at() {
        let now = Local::now();
        assert_eq!(
            next_post_at(now, Duration::from_secs(90 * 60)),
            Some(now + TimeDelta::minutes(90))
        );
        assert_eq!(next_post_at(now, Duration::from_secs(u64::MAX)), None);
    }

    #[test]
    fn test_sleep_interval_without_jitter() {
        let config = BotConfig {
            base_sleep_minutes: 5,
            jitter_sleep_minutes: 0,
            ..BotConfig::default()
        };
        let interval = sleep_interval(&config, &mut rand::rng());
        assert_eq!(interval, Duration::from_secs(300));
    }
}
