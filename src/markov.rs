//! First-order Markov chain text generation.
//!
//! A [`MarkovGenerator`] is built from a block of source text and samples new
//! "sentences" from it by walking word-to-word transitions observed in that
//! text.
//!
//! # Model
//!
//! - **Transitions**: every whitespace-delimited token maps to the list of
//!   tokens that followed it. Duplicates are kept, so a continuation seen three
//!   times is three times as likely to be picked.
//! - **Openers**: tokens that followed a token ending in `.`. Generated text
//!   always starts with one of these.
//!
//! Tokens are never normalized: `"Obama."`, `"Obama"` and `"Obama,"` are three
//! different words.
//!
//! # Stopping Rule
//!
//! The walk stops on the first word that ends in `.`, is not a known
//! abbreviation (see [`STOP_EXCEPTIONS`]) and brings the output to at least
//! `min_length` characters. There is no upper bound; callers that need one
//! resample (see [`crate::bot::generate_within_limit`]).

use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use thiserror::Error;
use tracing::{debug, trace};

/// Default minimum length, in characters, of a generated sentence.
pub const DEFAULT_MIN_LENGTH: usize = 100;

/// Default number of words a single walk may emit before it is abandoned.
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// Lowercase tokens that end in `.` but never end a sentence.
pub const STOP_EXCEPTIONS: &[&str] = &[
    "mr.", "mrs.", "ms.", "dr.", "st.", "jr.", "sr.", "vs.", "prof.", "gen.", "gov.", "sen.",
    "rep.", "lt.", "col.", "sgt.", "capt.",
];

/// Errors produced while building or sampling a [`MarkovGenerator`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkovError {
    /// The source text cannot produce a single transition.
    #[error("source text has {tokens} token(s); at least 2 are required")]
    TooFewTokens { tokens: usize },

    /// No token in the source (other than possibly the last) ends in `.`,
    /// so there is no word to start a sentence with.
    #[error("source text contains no sentence openers")]
    NoOpeners,

    /// The walk emitted `steps` words without reaching a sentence end.
    #[error("gave up after {steps} words without reaching a sentence end")]
    RunawayGeneration { steps: usize },
}

impl MarkovError {
    /// `true` for the conditions where the source text itself is unusable.
    pub fn is_empty_source(&self) -> bool {
        matches!(self, Self::TooFewTokens { .. } | Self::NoOpeners)
    }
}

/// Generates text from first-order word transitions of a source text.
///
/// The tables are built once in [`MarkovGenerator::new`] and never change.
/// A different source text needs a different generator.
#[derive(Debug, Clone)]
pub struct MarkovGenerator {
    transitions: HashMap<String, Vec<String>>,
    /// Transition keys in first-seen order, sampled when a word has no successor.
    keys: Vec<String>,
    openers: Vec<String>,
    max_steps: usize,
}

impl MarkovGenerator {
    /// Build the transition table and opener list from `text`.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::TooFewTokens`] if `text` has fewer than two
    /// whitespace-delimited tokens.
    pub fn new(text: &str) -> Result<Self, MarkovError> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() < 2 {
            return Err(MarkovError::TooFewTokens {
                tokens: words.len(),
            });
        }

        let mut transitions: HashMap<String, Vec<String>> = HashMap::new();
        let mut keys = Vec::new();
        let mut openers = Vec::new();

        for pair in words.windows(2) {
            let (word, next) = (pair[0], pair[1]);

            if word.ends_with('.') {
                openers.push(next.to_string());
            }

            match transitions.entry(word.to_string()) {
                Entry::Occupied(mut entry) => entry.get_mut().push(next.to_string()),
                Entry::Vacant(entry) => {
                    keys.push(word.to_string());
                    entry.insert(vec![next.to_string()]);
                }
            }
        }

        debug!(
            tokens = words.len(),
            keys = keys.len(),
            openers = openers.len(),
            "Built Markov tables"
        );

        Ok(Self {
            transitions,
            keys,
            openers,
            max_steps: DEFAULT_MAX_STEPS,
        })
    }

    /// Limit how many words a walk may emit before failing with
    /// [`MarkovError::RunawayGeneration`].
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Each word of the source mapped to every word that followed it, in order.
    pub fn transitions(&self) -> &HashMap<String, Vec<String>> {
        &self.transitions
    }

    /// Words that followed a token ending in `.`, in source order.
    pub fn openers(&self) -> &[String] {
        &self.openers
    }

    /// Generate a sentence of at least `min_length` characters using the
    /// thread-local RNG.
    pub fn generate(&self, min_length: usize) -> Result<String, MarkovError> {
        self.generate_with(&mut rand::rng(), min_length)
    }

    /// Generate a sentence of at least `min_length` characters.
    ///
    /// # Arguments
    ///
    /// * `rng` - Source of randomness; pass a seeded RNG for reproducible output
    /// * `min_length` - Minimum character count. The walk keeps going past it
    ///   until it lands on a sentence end, so the result is usually longer.
    ///
    /// # Errors
    ///
    /// - [`MarkovError::NoOpeners`] if the source had no sentence openers
    /// - [`MarkovError::RunawayGeneration`] if the step ceiling is hit
    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        min_length: usize,
    ) -> Result<String, MarkovError> {
        let mut word = self
            .openers
            .choose(rng)
            .map(String::as_str)
            .ok_or(MarkovError::NoOpeners)?;

        let mut output = String::new();
        let mut output_len = 0usize;
        let mut steps = 0usize;

        while output_len + word.chars().count() < min_length || !is_sentence_end(word) {
            if steps >= self.max_steps {
                debug!(steps, output_len, "Markov walk hit the step ceiling");
                return Err(MarkovError::RunawayGeneration { steps });
            }

            output.push_str(word);
            output.push(' ');
            output_len += word.chars().count() + 1;
            word = self.next_word(word, rng);
            steps += 1;
        }

        output.push_str(word);
        trace!(steps, chars = output_len + word.chars().count(), "Generated sentence");
        Ok(output)
    }

    /// Pick a successor of `word`, or any key if `word` never had one.
    ///
    /// The fallback samples keys uniformly, not by how many successors they
    /// have, so a dead end can jump anywhere in the text.
    fn next_word<'a, R: Rng + ?Sized>(&'a self, word: &'a str, rng: &mut R) -> &'a str {
        if let Some(next) = self.transitions.get(word).and_then(|s| s.choose(rng)) {
            return next;
        }
        trace!(word, "No successor; sampling a random key");
        self.keys.choose(rng).map(String::as_str).unwrap_or(word)
    }
}

/// A word ending in `.` that is not an abbreviation.
pub fn is_sentence_end(word: &str) -> bool {
    word.ends_with('.') && !is_stop_exception(word)
}

/// Case-insensitive membership in [`STOP_EXCEPTIONS`].
pub fn is_stop_exception(word: &str) -> bool {
    let lower = word.to_lowercase();
    STOP_EXCEPTIONS.contains(&lower.as_str())
}
