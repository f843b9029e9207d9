//! Quiz engine for Jahreszahlen
//!
//! This crate holds everything about playing a quiz that does not need I/O:
//! question generation, the per-player [`QuizData`] with its integrity token,
//! the phase controller, scoring and the leaderboard math. Randomness is always
//! passed in by the caller so that every function here can be tested with a
//! seeded generator.

pub mod controller;
pub mod error;
pub mod leaderboard;
pub mod questions;
pub mod quiz;
pub mod scoring;
pub mod token;

pub use controller::Stage;
pub use error::{QuizError, TokenError};
pub use quiz::{MIN_POOL_SIZE, Phase, QuizData, QuizEvent};
pub use scoring::{Answers, ReviewItem};
pub use token::IDLE_LIMIT_MINUTES;
