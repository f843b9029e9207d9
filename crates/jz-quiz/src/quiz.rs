use std::{fmt, ops::Range};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::QuizError,
    questions::{P1_QUESTIONS, P2_QUESTIONS},
    scoring::ReviewItem,
};

/// Smallest event pool a quiz can be started with.
///
/// Phase 1 needs 3 events and phase 2 the next 4. Phase 3 matches the whole
/// pool, which is only a meaningful exercise with a few more events.
pub const MIN_POOL_SIZE: usize = 8;

/// An event as far as the quiz is concerned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizEvent {
    pub id: i64,
    pub title: String,
    pub year: i32,
}

/// One of the three action phases of a quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Phase {
    One,
    Two,
    Three,
}

impl Phase {
    pub const ALL: [Self; 3] = [Self::One, Self::Two, Self::Three];

    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            _ => None,
        }
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            Self::One => Some(Self::Two),
            Self::Two => Some(Self::Three),
            Self::Three => None,
        }
    }

    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::One => None,
            Self::Two => Some(Self::One),
            Self::Three => Some(Self::Two),
        }
    }

    /// Amount of events the pool must hold before this phase can be entered
    pub const fn required_events(self) -> usize {
        match self {
            Self::One => P1_QUESTIONS,
            Self::Two => P1_QUESTIONS + P2_QUESTIONS,
            Self::Three => MIN_POOL_SIZE,
        }
    }

    /// Indices of the pool this phase asks about.
    ///
    /// Phase 1 uses events 0-2, phase 2 events 3-6 and phase 3 the whole pool.
    pub fn pool_range(self, pool_len: usize) -> Range<usize> {
        let range = match self {
            Self::One => 0..P1_QUESTIONS,
            Self::Two => P1_QUESTIONS..P1_QUESTIONS + P2_QUESTIONS,
            Self::Three => 0..pool_len,
        };
        range.start.min(pool_len)..range.end.min(pool_len)
    }
}

impl TryFrom<u8> for Phase {
    type Error = String;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::from_number(number).ok_or_else(|| format!("invalid quiz phase: {number}"))
    }
}

impl From<Phase> for u8 {
    fn from(phase: Phase) -> Self {
        phase.number()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Per-player quiz state, parked in the session between requests.
///
/// `topic_id`, `phase`, `reviewed` and `timestamp` together form the token
/// that every request of a quiz is validated against. `phase` is the next
/// action phase the player may submit and `reviewed` tells whether the review
/// of that phase was already reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizData {
    pub topic_id: i64,
    /// Shuffled pool of the topic's events, used by all three phases
    pub events: Vec<QuizEvent>,
    pub points: i32,
    pub correct_guesses: u32,
    pub phase: Phase,
    pub reviewed: bool,
    /// Last phase start, for idle expiry
    pub timestamp: DateTime<Utc>,
    /// Correction of the most recently submitted phase
    pub review: Vec<ReviewItem>,
}

impl QuizData {
    /// Create the quiz state for a freshly started phase 1.
    ///
    /// A pool too small for the whole quiz is rejected here rather than
    /// partway through.
    pub fn new(
        topic_id: i64,
        events: Vec<QuizEvent>,
        now: DateTime<Utc>,
    ) -> Result<Self, QuizError> {
        if events.len() < MIN_POOL_SIZE {
            return Err(QuizError::PoolTooSmall {
                phase: Phase::One,
                needed: MIN_POOL_SIZE,
                found: events.len(),
            });
        }

        Ok(Self {
            topic_id,
            events,
            points: 0,
            correct_guesses: 0,
            phase: Phase::One,
            reviewed: false,
            timestamp: now,
            review: Vec::new(),
        })
    }

    /// Events asked about in the given phase
    pub fn events_of(&self, phase: Phase) -> &[QuizEvent] {
        &self.events[phase.pool_range(self.events.len())]
    }

    /// Highest amount of points that can be reached with this pool
    pub fn potential_points(&self) -> i32 {
        crate::scoring::potential_points(self.events.len())
    }

    /// Amount of questions asked over all three phases
    pub fn questions_count(&self) -> usize {
        P1_QUESTIONS + P2_QUESTIONS + self.events.len()
    }
}
