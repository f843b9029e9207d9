use sqlx::{Executor, Postgres};

use crate::models::{NewTopic, Topic};

pub async fn find_by_id<'e, E>(executor: E, topic_id: i64) -> Result<Option<Topic>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                t.id,
                t.title,
                t.start_year,
                t.end_year,
                t.description,
                (SELECT COUNT(*) FROM events e WHERE e.topic_id = t.id) as events_count,
                (SELECT COUNT(*) FROM scores s WHERE s.topic_id = t.id) as scores_count
            FROM topics t
            WHERE t.id = $1
        "#,
    )
    .bind(topic_id)
    .fetch_optional(executor)
    .await
}

pub async fn list<'e, E>(executor: E) -> Result<Vec<Topic>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                t.id,
                t.title,
                t.start_year,
                t.end_year,
                t.description,
                COALESCE(e.count, 0) as events_count,
                COALESCE(s.count, 0) as scores_count
            FROM topics t
            LEFT JOIN (
                SELECT topic_id, COUNT(*) as count FROM events GROUP BY topic_id
            ) e ON e.topic_id = t.id
            LEFT JOIN (
                SELECT topic_id, COUNT(*) as count FROM scores GROUP BY topic_id
            ) s ON s.topic_id = t.id
            ORDER BY t.start_year, t.end_year, t.id
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn create<'e, E>(executor: E, topic: &NewTopic) -> Result<Topic, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO topics (title, start_year, end_year, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, start_year, end_year, description,
                0::BIGINT as events_count, 0::BIGINT as scores_count
        "#,
    )
    .bind(&topic.title)
    .bind(topic.start_year)
    .bind(topic.end_year)
    .bind(&topic.description)
    .fetch_one(executor)
    .await
}

/// Delete a topic together with its events and scores
pub async fn delete<'e, E>(executor: E, topic_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM topics
            WHERE id = $1
        "#,
    )
    .bind(topic_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
