use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use jz_db::models::ScoreFilter;
use jz_quiz::leaderboard::{ShowFilter, last_page, normalise_filters, page_window};
use uuid::Uuid;

use super::model::{ScoreRow, ScoresPage, ScoresQuery};
use crate::{
    ApiState,
    auth::AuthUser,
    error::ApiError,
    session::{Session, SessionData},
    store::list_scores,
};

pub fn routes() -> Router<ApiState> {
    Router::new().route("/scores", get(leaderboard))
}

/// Unparsable filters are dropped instead of rejected
fn score_filter(query: &ScoresQuery) -> ScoreFilter {
    ScoreFilter {
        topic_id: query.topic.as_deref().and_then(|t| t.trim().parse().ok()),
        user_id: query
            .user
            .as_deref()
            .and_then(|u| Uuid::parse_str(u.trim()).ok()),
    }
}

async fn leaderboard(
    State(state): State<ApiState>,
    Query(query): Query<ScoresQuery>,
    session: Session,
    user: Option<AuthUser>,
) -> Result<Json<ScoresPage>, ApiError> {
    let filter = score_filter(&query);

    let total = state.store.count_scores(filter).await?;
    let filters = normalise_filters(query.show.as_deref(), query.page.as_deref(), total);
    let limit = filters.limit(total);
    let offset = filters.offset(total);

    let entries = list_scores(state.store.as_ref(), filter, limit, offset).await?;
    tracing::debug!(
        total,
        limit,
        offset,
        rows = entries.len(),
        "Leaderboard page loaded"
    );

    let rows: Vec<ScoreRow> = entries
        .into_iter()
        .zip(offset + 1..)
        .map(|(entry, rank)| ScoreRow {
            rank,
            username: entry.username,
            topic_id: entry.topic_id,
            topic_title: entry.topic_title,
            date: entry.date.format("%d.%m.%y").to_string(),
            points: entry.points,
        })
        .collect();

    let last = last_page(limit, total);
    let page = filters.page;

    Ok(Json(ScoresPage {
        show: filters.show.as_param(),
        show_all: filters.show == ShowFilter::All,
        show_from: if rows.is_empty() { 0 } else { offset + 1 },
        show_to: offset + rows.len() as i64,
        show_of: total,
        page,
        pages: page_window(limit, page, total),
        page_previous: (page > 1).then(|| page - 1),
        page_next: (page < last).then(|| page + 1),
        rows,
        session: SessionData::take(&session, user.as_ref()),
    }))
}
