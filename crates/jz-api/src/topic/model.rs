use jz_db::models::{Event, Topic};
use serde::Serialize;

use crate::session::SessionData;

/// `GET /topics`
#[derive(Debug, Clone, Serialize)]
pub struct TopicsPage {
    pub topics: Vec<Topic>,
    pub session: SessionData,
}

/// `GET /topics/{id}`: the topic with its events in chronological order
#[derive(Debug, Clone, Serialize)]
pub struct TopicPage {
    pub topic: Topic,
    pub events: Vec<Event>,
    pub session: SessionData,
}
