use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Topic model - a time-bounded historical segment owning its events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Topic {
    /// Unique topic identifier
    pub id: i64,
    /// Display title (max 100 chars)
    pub title: String,
    /// First year covered by the topic
    pub start_year: i32,
    /// Last year covered by the topic, never before `start_year`
    pub end_year: i32,
    /// Free-text description (max 500 chars)
    pub description: String,
    /// Amount of events in the topic
    pub events_count: i64,
    /// Amount of scores recorded for the topic
    pub scores_count: i64,
}

/// Event model - a year (and optionally a date) inside a topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub topic_id: i64,
    /// Event title (max 110 chars)
    pub title: String,
    pub year: i32,
    /// Only used to order events of the same year
    pub date: Option<NaiveDate>,
}

/// Score as shown on the leaderboard, joined with its topic and user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScoreEntry {
    pub id: i64,
    pub topic_id: i64,
    pub topic_title: String,
    pub user_id: Uuid,
    pub username: String,
    pub points: i32,
    /// When the quiz was completed
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTopic {
    pub title: String,
    pub start_year: i32,
    pub end_year: i32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub topic_id: i64,
    pub title: String,
    pub year: i32,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScore {
    pub topic_id: i64,
    pub user_id: Uuid,
    pub points: i32,
}

/// Which scores a leaderboard query covers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreFilter {
    pub topic_id: Option<i64>,
    pub user_id: Option<Uuid>,
}
