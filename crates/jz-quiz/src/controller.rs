//! Phase controller.
//!
//! A quiz advances strictly through
//! `Phase1 -> Phase1Review -> Phase2 -> Phase2Review -> Phase3 -> Phase3Review -> Summary`.
//! Every transition takes the quiz stored in the session (if any), validates its
//! token against the stage the request addresses and only then mutates it.
//! The caller writes the returned quiz back to the session.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::{
    error::QuizError,
    quiz::{Phase, QuizData, QuizEvent},
    scoring::{Answers, score_phase},
    token::validate,
};

/// Position of a player within a quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Answering the questions of a phase
    Phase(Phase),
    /// Looking at the correction of a submitted phase
    Review(Phase),
    /// Overview after the last review, before the score is persisted
    Summary,
}

impl Stage {
    /// Token `(phase, reviewed)` a quiz must carry while at this stage
    pub const fn token(self) -> (Phase, bool) {
        match self {
            Self::Phase(phase) => (phase, false),
            Self::Review(phase) => (phase, true),
            Self::Summary => (Phase::Three, true),
        }
    }

    /// Label used in logs and metrics
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Phase(Phase::One) => "phase1",
            Self::Phase(Phase::Two) => "phase2",
            Self::Phase(Phase::Three) => "phase3",
            Self::Review(Phase::One) => "phase1_review",
            Self::Review(Phase::Two) => "phase2_review",
            Self::Review(Phase::Three) => "phase3_review",
            Self::Summary => "summary",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate that the stored quiz is at `stage` of the quiz on `topic_id`.
pub fn expect_stage(
    stored: Option<QuizData>,
    stage: Stage,
    topic_id: i64,
    now: DateTime<Utc>,
) -> Result<QuizData, QuizError> {
    let (phase, reviewed) = stage.token();
    Ok(validate(stored, phase, reviewed, topic_id, now)?)
}

/// Start a new quiz on a (shuffled) event pool. Any previous quiz is discarded.
pub fn start(
    topic_id: i64,
    events: Vec<QuizEvent>,
    now: DateTime<Utc>,
) -> Result<QuizData, QuizError> {
    QuizData::new(topic_id, events, now)
}

/// Enter phase 2 or 3 after reviewing the previous phase.
///
/// Reloading a phase that was already entered is accepted and leaves the
/// quiz untouched, so the idle clock keeps running from the first entry.
pub fn enter(
    stored: Option<QuizData>,
    phase: Phase,
    topic_id: i64,
    now: DateTime<Utc>,
) -> Result<QuizData, QuizError> {
    if stored
        .as_ref()
        .is_some_and(|quiz| quiz.phase == phase && !quiz.reviewed)
    {
        return expect_stage(stored, Stage::Phase(phase), topic_id, now);
    }

    let Some(previous) = phase.previous() else {
        // Phase 1 is only ever entered through `start`
        return expect_stage(stored, Stage::Phase(phase), topic_id, now);
    };

    let mut quiz = expect_stage(stored, Stage::Review(previous), topic_id, now)?;

    let needed = phase.required_events();
    if quiz.events.len() < needed {
        return Err(QuizError::PoolTooSmall {
            phase,
            needed,
            found: quiz.events.len(),
        });
    }

    quiz.phase = phase;
    quiz.reviewed = false;
    quiz.timestamp = now;
    quiz.review.clear();

    Ok(quiz)
}

/// Score the answers of `phase` and move on to its review.
///
/// Points are only added once the token was validated.
pub fn submit(
    stored: Option<QuizData>,
    phase: Phase,
    topic_id: i64,
    answers: &Answers,
    now: DateTime<Utc>,
) -> Result<QuizData, QuizError> {
    let mut quiz = expect_stage(stored, Stage::Phase(phase), topic_id, now)?;

    let result = score_phase(phase, quiz.events_of(phase), answers);
    quiz.points += result.points;
    quiz.correct_guesses += result.correct_guesses;
    quiz.review = result.review;
    quiz.reviewed = true;

    Ok(quiz)
}

/// Show the correction of a submitted phase
pub fn review(
    stored: Option<QuizData>,
    phase: Phase,
    topic_id: i64,
    now: DateTime<Utc>,
) -> Result<QuizData, QuizError> {
    expect_stage(stored, Stage::Review(phase), topic_id, now)
}

/// Reach the summary after the last review; also guards persisting the score
pub fn summary(
    stored: Option<QuizData>,
    topic_id: i64,
    now: DateTime<Utc>,
) -> Result<QuizData, QuizError> {
    expect_stage(stored, Stage::Summary, topic_id, now)
}
