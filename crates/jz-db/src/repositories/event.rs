use sqlx::{Executor, Postgres};

use crate::models::{Event, NewEvent};

/// Events of a topic, chronologically (year, then date)
pub async fn list_by_topic<'e, E>(executor: E, topic_id: i64) -> Result<Vec<Event>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, topic_id, title, year, date
            FROM events
            WHERE topic_id = $1
            ORDER BY year, date NULLS FIRST, id
        "#,
    )
    .bind(topic_id)
    .fetch_all(executor)
    .await
}

pub async fn create<'e, E>(executor: E, event: &NewEvent) -> Result<Event, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO events (topic_id, title, year, date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, topic_id, title, year, date
        "#,
    )
    .bind(event.topic_id)
    .bind(&event.title)
    .bind(event.year)
    .bind(event.date)
    .fetch_one(executor)
    .await
}

/// Delete an event, only if it belongs to `topic_id`
pub async fn delete<'e, E>(executor: E, topic_id: i64, event_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM events
            WHERE id = $1 AND topic_id = $2
        "#,
    )
    .bind(event_id)
    .bind(topic_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
