use serde::{Deserialize, Serialize};

use crate::session::SessionData;

/// Raw leaderboard query; every value is optional and normalised by the handler
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoresQuery {
    pub topic: Option<String>,
    pub user: Option<String>,
    pub show: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreRow {
    /// 1-based position on the whole (filtered) leaderboard
    pub rank: i64,
    pub username: String,
    pub topic_id: i64,
    pub topic_title: String,
    /// `dd.mm.yy`
    pub date: String,
    pub points: i32,
}

/// `GET /scores`
#[derive(Debug, Clone, Serialize)]
pub struct ScoresPage {
    pub rows: Vec<ScoreRow>,
    /// `show` value for links; `-1` when everything is on one page
    pub show: i64,
    pub show_all: bool,
    pub show_from: i64,
    pub show_to: i64,
    pub show_of: i64,
    pub page: i64,
    pub pages: Vec<i64>,
    pub page_previous: Option<i64>,
    pub page_next: Option<i64>,
    pub session: SessionData,
}
