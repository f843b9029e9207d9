//! Point rules of the three quiz phases.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    questions::{P1_MAX_DISTANCE, P1_QUESTIONS, P2_QUESTIONS, form_id},
    quiz::{Phase, QuizEvent},
};

/// Points for a correct answer in phase 1
pub const P1_POINTS: i32 = 3;
/// Points for an exact guess in phase 2, reduced by 1 per year of difference
pub const P2_MAX_POINTS: i32 = 7;
/// Points per correct match in phase 3
pub const P3_POINTS: i32 = 8;

/// Submitted form values, keyed by form field (`q0`, `q1`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers(HashMap<String, String>);

impl Answers {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self(fields)
    }

    /// The year entered for the question at `index`.
    ///
    /// Missing and unparsable values both mean "don't know".
    pub fn guess(&self, index: usize) -> Option<i32> {
        self.0
            .get(&form_id(index))
            .and_then(|value| value.trim().parse().ok())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Answers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Correction of a single question, shown on the review page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub form_id: String,
    pub event_title: String,
    pub correct_year: i32,
    /// `None` if the player didn't know
    pub guess: Option<i32>,
    pub points: i32,
}

impl ReviewItem {
    pub fn is_correct(&self) -> bool {
        self.guess == Some(self.correct_year)
    }
}

/// Outcome of a submitted phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseResult {
    pub points: i32,
    pub correct_guesses: u32,
    pub review: Vec<ReviewItem>,
}

/// Points for a phase 1 answer
pub fn phase1_points(guess: Option<i32>, year: i32) -> i32 {
    if guess == Some(year) { P1_POINTS } else { 0 }
}

/// Points for a phase 2 answer: `max(0, 7 - |guess - year|)`
pub fn phase2_points(guess: Option<i32>, year: i32) -> i32 {
    guess.map_or(0, |guess| {
        i32::try_from(guess.abs_diff(year)).map_or(0, |diff| (P2_MAX_POINTS - diff).max(0))
    })
}

/// Points for a phase 3 match
pub fn phase3_points(guess: Option<i32>, year: i32) -> i32 {
    if guess == Some(year) { P3_POINTS } else { 0 }
}

/// Highest total a quiz over a pool of `pool_len` events can reach
pub fn potential_points(pool_len: usize) -> i32 {
    let p1 = P1_QUESTIONS as i32 * P1_POINTS;
    let p2 = P2_QUESTIONS as i32 * P2_MAX_POINTS;
    let p3 = i32::try_from(pool_len)
        .unwrap_or(i32::MAX)
        .saturating_mul(P3_POINTS);
    p1.saturating_add(p2).saturating_add(p3)
}

/// Score the answers of a phase against the events it asked about.
///
/// `events` must be the phase's slice of the pool, in pool order.
pub fn score_phase(phase: Phase, events: &[QuizEvent], answers: &Answers) -> PhaseResult {
    let review: Vec<ReviewItem> = events
        .iter()
        .enumerate()
        .map(|(index, event)| {
            let guess = match phase {
                // Anything the choices could not have contained is "don't know"
                Phase::One => answers
                    .guess(index)
                    .filter(|guess| guess.abs_diff(event.year) <= P1_MAX_DISTANCE as u32),
                Phase::Two | Phase::Three => answers.guess(index),
            };
            let points = match phase {
                Phase::One => phase1_points(guess, event.year),
                Phase::Two => phase2_points(guess, event.year),
                Phase::Three => phase3_points(guess, event.year),
            };

            ReviewItem {
                form_id: form_id(index),
                event_title: event.title.clone(),
                correct_year: event.year,
                guess,
                points,
            }
        })
        .collect();

    PhaseResult {
        points: review.iter().map(|item| item.points).sum(),
        correct_guesses: review.iter().filter(|item| item.is_correct()).count() as u32,
        review,
    }
}
