use thiserror::Error;

use crate::{quiz::Phase, token::IDLE_LIMIT_MINUTES};

/// Reasons a stored quiz token is rejected.
///
/// The messages are shown to the player as flash messages after the quiz was
/// aborted.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("It looks like you started a later phase without going through phase 1.")]
    Missing,
    #[error("It looks like you changed the topic mid-quiz.")]
    TopicChanged,
    #[error("It looks like you skipped a phase of the quiz.")]
    PhaseSkipped,
    #[error(
        "You were inactive for more than {} minutes, the quiz has ended.",
        IDLE_LIMIT_MINUTES
    )]
    Expired,
}

impl TokenError {
    /// Short machine-readable reason, used as a metrics label
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::TopicChanged => "topic_changed",
            Self::PhaseSkipped => "phase_skipped",
            Self::Expired => "expired",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(
        "This topic has too few events for phase {phase} of the quiz ({found} of {needed} required)."
    )]
    PoolTooSmall {
        phase: Phase,
        needed: usize,
        found: usize,
    },
}

impl QuizError {
    /// Short machine-readable reason the quiz was aborted
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Token(err) => err.reason(),
            Self::PoolTooSmall { .. } => "pool_too_small",
        }
    }
}
