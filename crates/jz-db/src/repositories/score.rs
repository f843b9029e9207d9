use sqlx::{Executor, Postgres};

use crate::models::{NewScore, ScoreEntry, ScoreFilter};

/// Leaderboard rows, best first.
///
/// Ties are ordered by completion date, so an earlier score of the same
/// points stays ahead of a later one.
pub async fn list<'e, E>(
    executor: E,
    filter: ScoreFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<ScoreEntry>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                s.id,
                s.topic_id,
                t.title as topic_title,
                s.user_id,
                u.username,
                s.points,
                s.date
            FROM scores s
            JOIN topics t ON t.id = s.topic_id
            JOIN users u ON u.id = s.user_id
            WHERE ($1::BIGINT IS NULL OR s.topic_id = $1)
                AND ($2::UUID IS NULL OR s.user_id = $2)
            ORDER BY s.points DESC, s.date, s.id
            LIMIT $3 OFFSET $4
        "#,
    )
    .bind(filter.topic_id)
    .bind(filter.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
}

pub async fn count<'e, E>(executor: E, filter: ScoreFilter) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*)
            FROM scores s
            WHERE ($1::BIGINT IS NULL OR s.topic_id = $1)
                AND ($2::UUID IS NULL OR s.user_id = $2)
        "#,
    )
    .bind(filter.topic_id)
    .bind(filter.user_id)
    .fetch_one(executor)
    .await
}

/// Points of every score of a topic, descending
pub async fn points_by_topic<'e, E>(executor: E, topic_id: i64) -> Result<Vec<i32>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT points
            FROM scores
            WHERE topic_id = $1
            ORDER BY points DESC, date, id
        "#,
    )
    .bind(topic_id)
    .fetch_all(executor)
    .await
}

pub async fn create<'e, E>(executor: E, score: &NewScore) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO scores (topic_id, user_id, points)
            VALUES ($1, $2, $3)
            RETURNING id
        "#,
    )
    .bind(score.topic_id)
    .bind(score.user_id)
    .bind(score.points)
    .fetch_one(executor)
    .await
}
