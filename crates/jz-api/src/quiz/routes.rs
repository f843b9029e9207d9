//! Quiz routes.
//!
//! Every handler validates the quiz stored in the session through the phase
//! controller before it touches anything; failures abort the quiz (see
//! [`ApiError::Quiz`]).

use std::collections::HashMap;

use axum::{
    Form, Json, Router,
    extract::{Path, State},
    response::Response,
    routing::get,
};
use chrono::Utc;
use jz_db::models::NewScore;
use jz_quiz::{
    Answers, Phase, QuizData, QuizEvent, Stage, controller,
    leaderboard::{better_than_percent, rank},
    questions::{phase1_questions, phase2_questions, phase3_question},
};
use rand::Rng;

use super::model::{PhasePage, Questions, ReviewPage, SummaryPage};
use crate::{
    ApiState,
    auth::AuthUser,
    error::ApiError,
    metrics::{record_quiz_transition, record_score_persisted},
    response::found,
    session::{FLASH_SUCCESS, QUIZ, Session, SessionData},
    topic::{load_topic, parse_id},
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/topics/{id}/quiz/1", get(start_quiz).post(submit_phase::<1>))
        .route("/topics/{id}/quiz/1/review", get(review_phase::<1>))
        .route(
            "/topics/{id}/quiz/2",
            get(enter_phase::<2>).post(submit_phase::<2>),
        )
        .route("/topics/{id}/quiz/2/review", get(review_phase::<2>))
        .route(
            "/topics/{id}/quiz/3",
            get(enter_phase::<3>).post(submit_phase::<3>),
        )
        .route("/topics/{id}/quiz/3/review", get(review_phase::<3>))
        .route(
            "/topics/{id}/quiz/summary",
            get(show_summary).post(persist_score),
        )
}

fn phase_of<const N: u8>() -> Result<Phase, ApiError> {
    Phase::from_number(N).ok_or_else(|| ApiError::Internal(format!("no quiz phase {N}")))
}

/// Only logged-in players may play
fn require_player(user: Option<AuthUser>, topic_id: i64) -> Result<AuthUser, ApiError> {
    user.ok_or(ApiError::AuthRequired { topic_id })
}

fn transition(stage: Stage, quiz: &QuizData) {
    tracing::info!(
        topic_id = quiz.topic_id,
        stage = %stage,
        points = quiz.points,
        "Quiz transition"
    );
    record_quiz_transition(stage.as_str());
}

fn questions_for<R: Rng>(phase: Phase, quiz: &QuizData, rng: &mut R) -> Questions {
    match phase {
        Phase::One => Questions::MultipleChoice(phase1_questions(&quiz.events, rng)),
        Phase::Two => Questions::Entry(phase2_questions(&quiz.events)),
        Phase::Three => Questions::Matching(phase3_question(&quiz.events, rng)),
    }
}

fn phase_page(phase: Phase, quiz: &QuizData, session: &Session, user: &AuthUser) -> PhasePage {
    PhasePage {
        topic_id: quiz.topic_id,
        phase,
        questions: questions_for(phase, quiz, &mut rand::thread_rng()),
        points: quiz.points,
        session: SessionData::take(session, Some(user)),
    }
}

/// `GET /topics/{id}/quiz/1`: start a new quiz, discarding any running one
async fn start_quiz(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    session: Session,
    user: Option<AuthUser>,
) -> Result<Json<PhasePage>, ApiError> {
    let topic_id = parse_id(&id, "topic")?;
    let user = require_player(user, topic_id)?;
    load_topic(state.store.as_ref(), topic_id).await?;

    let pool: Vec<QuizEvent> = state
        .store
        .events_by_topic(topic_id, true)
        .await?
        .into_iter()
        .map(|event| QuizEvent {
            id: event.id,
            title: event.title,
            year: event.year,
        })
        .collect();

    let quiz = controller::start(topic_id, pool, Utc::now())?;
    session.put(QUIZ, &quiz)?;
    transition(Stage::Phase(Phase::One), &quiz);

    Ok(Json(phase_page(Phase::One, &quiz, &session, &user)))
}

/// `GET /topics/{id}/quiz/{2,3}`: continue after a review
async fn enter_phase<const N: u8>(
    Path(id): Path<String>,
    session: Session,
    user: Option<AuthUser>,
) -> Result<Json<PhasePage>, ApiError> {
    let phase = phase_of::<N>()?;
    let topic_id = parse_id(&id, "topic")?;
    let user = require_player(user, topic_id)?;

    let quiz = controller::enter(session.get(QUIZ), phase, topic_id, Utc::now())?;
    session.put(QUIZ, &quiz)?;
    transition(Stage::Phase(phase), &quiz);

    Ok(Json(phase_page(phase, &quiz, &session, &user)))
}

/// `POST /topics/{id}/quiz/{1,2,3}`: score the answers, then show the review
async fn submit_phase<const N: u8>(
    Path(id): Path<String>,
    session: Session,
    user: Option<AuthUser>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let phase = phase_of::<N>()?;
    let topic_id = parse_id(&id, "topic")?;
    require_player(user, topic_id)?;

    let answers = Answers::new(fields);
    let quiz = controller::submit(session.get(QUIZ), phase, topic_id, &answers, Utc::now())?;
    session.put(QUIZ, &quiz)?;
    transition(Stage::Review(phase), &quiz);

    Ok(found(&format!("/topics/{topic_id}/quiz/{N}/review")))
}

/// `GET /topics/{id}/quiz/{1,2,3}/review`
async fn review_phase<const N: u8>(
    Path(id): Path<String>,
    session: Session,
    user: Option<AuthUser>,
) -> Result<Json<ReviewPage>, ApiError> {
    let phase = phase_of::<N>()?;
    let topic_id = parse_id(&id, "topic")?;
    let user = require_player(user, topic_id)?;

    let quiz = controller::review(session.get(QUIZ), phase, topic_id, Utc::now())?;

    let next = match phase.next() {
        Some(next) => format!("/topics/{topic_id}/quiz/{next}"),
        None => format!("/topics/{topic_id}/quiz/summary"),
    };

    Ok(Json(ReviewPage {
        topic_id,
        phase,
        phase_points: quiz.review.iter().map(|item| item.points).sum(),
        points: quiz.points,
        review: quiz.review,
        next,
        session: SessionData::take(&session, Some(&user)),
    }))
}

/// `GET /topics/{id}/quiz/summary`
async fn show_summary(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    session: Session,
    user: Option<AuthUser>,
) -> Result<Json<SummaryPage>, ApiError> {
    let topic_id = parse_id(&id, "topic")?;
    let user = require_player(user, topic_id)?;

    let quiz = controller::summary(session.get(QUIZ), topic_id, Utc::now())?;
    let points = state.store.topic_points(topic_id).await?;
    transition(Stage::Summary, &quiz);

    Ok(Json(SummaryPage {
        topic_id,
        points: quiz.points,
        potential_points: quiz.potential_points(),
        correct_guesses: quiz.correct_guesses,
        questions_count: quiz.questions_count(),
        better_than_percent: better_than_percent(quiz.points, &points),
        session: SessionData::take(&session, Some(&user)),
    }))
}

/// `POST /topics/{id}/quiz/summary`: record the score and end the quiz
async fn persist_score(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    session: Session,
    user: Option<AuthUser>,
) -> Result<Response, ApiError> {
    let topic_id = parse_id(&id, "topic")?;
    let user = require_player(user, topic_id)?;

    let quiz = controller::summary(session.get(QUIZ), topic_id, Utc::now())?;

    // Rank against the scores before this one is added
    let points = state.store.topic_points(topic_id).await?;
    let place = rank(quiz.points, &points) + 1;

    state
        .store
        .create_score(NewScore {
            topic_id,
            user_id: user.user_id,
            points: quiz.points,
        })
        .await?;

    session.remove(QUIZ);
    session.put(
        FLASH_SUCCESS,
        &format!(
            "Your score of {} points placed #{place} in this topic",
            quiz.points
        ),
    )?;

    tracing::info!(
        topic_id,
        user_id = %user.user_id,
        points = quiz.points,
        place,
        "Score persisted"
    );
    record_score_persisted();

    Ok(found(&format!("/scores?topic={topic_id}")))
}
