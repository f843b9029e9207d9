//! Validation of the integrity token embedded in [`QuizData`].

use chrono::{DateTime, Duration, Utc};

use crate::{error::TokenError, quiz::Phase, quiz::QuizData};

/// Minutes a player may stay idle in a phase before the quiz ends
pub const IDLE_LIMIT_MINUTES: i64 = 30;

/// Validate the stored quiz against the request that is about to use it.
///
/// Checks, in order: the quiz exists, it belongs to the topic in the URL, it is
/// at the expected `(phase, reviewed)` position and the last phase started no
/// longer than [`IDLE_LIMIT_MINUTES`] ago.
pub fn validate(
    stored: Option<QuizData>,
    phase: Phase,
    reviewed: bool,
    topic_id: i64,
    now: DateTime<Utc>,
) -> Result<QuizData, TokenError> {
    let quiz = stored.ok_or(TokenError::Missing)?;

    if quiz.topic_id != topic_id {
        return Err(TokenError::TopicChanged);
    }

    if quiz.phase != phase || quiz.reviewed != reviewed {
        return Err(TokenError::PhaseSkipped);
    }

    if is_expired(&quiz, now) {
        return Err(TokenError::Expired);
    }

    Ok(quiz)
}

/// Whether the quiz has been idle for longer than the limit
pub fn is_expired(quiz: &QuizData, now: DateTime<Utc>) -> bool {
    now - quiz.timestamp > Duration::minutes(IDLE_LIMIT_MINUTES)
}
