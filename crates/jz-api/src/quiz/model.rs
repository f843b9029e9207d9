use jz_quiz::{
    Phase, ReviewItem,
    questions::{ChoiceQuestion, EntryQuestion, MatchingQuestion},
};
use serde::Serialize;

use crate::session::SessionData;

/// Questions of one phase, tagged with the kind of exercise
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum Questions {
    MultipleChoice(Vec<ChoiceQuestion>),
    Entry(Vec<EntryQuestion>),
    Matching(MatchingQuestion),
}

/// `GET /topics/{id}/quiz/{phase}`
#[derive(Debug, Clone, Serialize)]
pub struct PhasePage {
    pub topic_id: i64,
    pub phase: Phase,
    pub questions: Questions,
    /// Points collected in the previous phases
    pub points: i32,
    pub session: SessionData,
}

/// `GET /topics/{id}/quiz/{phase}/review`
#[derive(Debug, Clone, Serialize)]
pub struct ReviewPage {
    pub topic_id: i64,
    pub phase: Phase,
    pub review: Vec<ReviewItem>,
    pub phase_points: i32,
    pub points: i32,
    /// Where "continue" leads
    pub next: String,
    pub session: SessionData,
}

/// `GET /topics/{id}/quiz/summary`
#[derive(Debug, Clone, Serialize)]
pub struct SummaryPage {
    pub topic_id: i64,
    pub points: i32,
    pub potential_points: i32,
    pub correct_guesses: u32,
    pub questions_count: usize,
    /// Share of the topic's previous scores this quiz beats, in percent
    pub better_than_percent: u32,
    pub session: SessionData,
}
