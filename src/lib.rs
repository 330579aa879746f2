//! Markov-chain news remixing.
//!
//! The generator in [`markov`] is self-contained and does no I/O. The other
//! modules fetch seed text, post results and drive the schedule used by the
//! `kinda_newsy` binary.
//!
//! ```ignore
//! use kinda_newsy::markov::MarkovGenerator;
//!
//! let generator = MarkovGenerator::new("The vote was close. Turnout was high.")?;
//! let status = generator.generate(20)?;
//! ```

pub mod api;
pub mod bot;
pub mod cli;
pub mod config;
pub mod markov;
pub mod models;
pub mod scrapers;
pub mod utils;
