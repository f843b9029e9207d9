//! Storage capability consumed by the HTTP layer.
//!
//! Handlers only see `Arc<dyn Store>`; [`PgStore`] backs it with PostgreSQL,
//! the integration tests with an in-memory fake.

use anyhow::Context;
use async_trait::async_trait;
use jz_db::{
    models::{Event, NewEvent, NewScore, NewTopic, ScoreEntry, ScoreFilter, Topic},
    repositories::{event, score, topic},
};
use jz_quiz::questions::shuffle_pool;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait Store: Send + Sync {
    async fn topic(&self, topic_id: i64) -> anyhow::Result<Option<Topic>>;

    /// All topics ordered by their start year
    async fn topics(&self) -> anyhow::Result<Vec<Topic>>;

    /// Every event of a topic, in random order if `shuffle` is set and
    /// chronologically otherwise
    async fn events_by_topic(&self, topic_id: i64, shuffle: bool) -> anyhow::Result<Vec<Event>>;

    async fn create_topic(&self, topic: NewTopic) -> anyhow::Result<Topic>;

    /// Delete a topic with its events and scores
    async fn delete_topic(&self, topic_id: i64) -> anyhow::Result<bool>;

    async fn create_event(&self, event: NewEvent) -> anyhow::Result<Event>;

    async fn delete_event(&self, topic_id: i64, event_id: i64) -> anyhow::Result<bool>;

    async fn create_score(&self, score: NewScore) -> anyhow::Result<()>;

    async fn scores(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<ScoreEntry>>;

    async fn scores_by_topic(
        &self,
        topic_id: i64,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<ScoreEntry>>;

    async fn scores_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<ScoreEntry>>;

    async fn scores_by_topic_and_user(
        &self,
        topic_id: i64,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<ScoreEntry>>;

    async fn count_scores(&self, filter: ScoreFilter) -> anyhow::Result<i64>;

    /// Points of all scores of a topic, best first
    async fn topic_points(&self, topic_id: i64) -> anyhow::Result<Vec<i32>>;
}

/// Read one leaderboard page through the matching store operation
pub async fn list_scores(
    store: &dyn Store,
    filter: ScoreFilter,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<ScoreEntry>> {
    match (filter.topic_id, filter.user_id) {
        (Some(topic_id), Some(user_id)) => {
            store
                .scores_by_topic_and_user(topic_id, user_id, limit, offset)
                .await
        }
        (Some(topic_id), None) => store.scores_by_topic(topic_id, limit, offset).await,
        (None, Some(user_id)) => store.scores_by_user(user_id, limit, offset).await,
        (None, None) => store.scores(limit, offset).await,
    }
}

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list(
        &self,
        filter: ScoreFilter,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<ScoreEntry>> {
        score::list(&self.pool, filter, limit, offset)
            .await
            .context("error getting scores")
    }
}

#[async_trait]
impl Store for PgStore {
    async fn topic(&self, topic_id: i64) -> anyhow::Result<Option<Topic>> {
        topic::find_by_id(&self.pool, topic_id)
            .await
            .with_context(|| format!("error getting topic {topic_id}"))
    }

    async fn topics(&self) -> anyhow::Result<Vec<Topic>> {
        topic::list(&self.pool)
            .await
            .context("error getting topics")
    }

    async fn events_by_topic(&self, topic_id: i64, shuffle: bool) -> anyhow::Result<Vec<Event>> {
        let mut events = event::list_by_topic(&self.pool, topic_id)
            .await
            .context("error getting events")?;
        if shuffle {
            shuffle_pool(&mut events, &mut rand::thread_rng());
        }
        Ok(events)
    }

    async fn create_topic(&self, new_topic: NewTopic) -> anyhow::Result<Topic> {
        topic::create(&self.pool, &new_topic)
            .await
            .context("error creating topic")
    }

    async fn delete_topic(&self, topic_id: i64) -> anyhow::Result<bool> {
        topic::delete(&self.pool, topic_id)
            .await
            .context("error deleting topic")
    }

    async fn create_event(&self, new_event: NewEvent) -> anyhow::Result<Event> {
        event::create(&self.pool, &new_event)
            .await
            .context("error creating event")
    }

    async fn delete_event(&self, topic_id: i64, event_id: i64) -> anyhow::Result<bool> {
        event::delete(&self.pool, topic_id, event_id)
            .await
            .context("error deleting event")
    }

    async fn create_score(&self, new_score: NewScore) -> anyhow::Result<()> {
        score::create(&self.pool, &new_score)
            .await
            .context("error creating score")?;
        Ok(())
    }

    async fn scores(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<ScoreEntry>> {
        self.list(ScoreFilter::default(), limit, offset).await
    }

    async fn scores_by_topic(
        &self,
        topic_id: i64,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<ScoreEntry>> {
        let filter = ScoreFilter {
            topic_id: Some(topic_id),
            user_id: None,
        };
        self.list(filter, limit, offset).await
    }

    async fn scores_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<ScoreEntry>> {
        let filter = ScoreFilter {
            topic_id: None,
            user_id: Some(user_id),
        };
        self.list(filter, limit, offset).await
    }

    async fn scores_by_topic_and_user(
        &self,
        topic_id: i64,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<ScoreEntry>> {
        let filter = ScoreFilter {
            topic_id: Some(topic_id),
            user_id: Some(user_id),
        };
        self.list(filter, limit, offset).await
    }

    async fn count_scores(&self, filter: ScoreFilter) -> anyhow::Result<i64> {
        score::count(&self.pool, filter)
            .await
            .context("error counting scores")
    }

    async fn topic_points(&self, topic_id: i64) -> anyhow::Result<Vec<i32>> {
        score::points_by_topic(&self.pool, topic_id)
            .await
            .context("error getting scores")
    }
}
