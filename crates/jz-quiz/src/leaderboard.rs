//! Leaderboard math: rank placement, filter normalisation and page links.

use serde::{Deserialize, Serialize};

/// Page size used when the requested one is missing or unknown
pub const DEFAULT_SHOW: i64 = 10;
/// Maximum amount of page links shown at once
pub const PAGE_WINDOW: i64 = 3;

/// Index at which `points` would be inserted into the descending `scores`.
///
/// Equal scores stay in front of the new entry, so the result is the first
/// index holding fewer points than `points`, or `scores.len()`.
pub fn rank(points: i32, scores: &[i32]) -> usize {
    scores.partition_point(|&score| score >= points)
}

/// Share of players (in percent) a score beats, counting the new score itself.
///
/// With 50 scores of which 20 are lower, the result is `21 * 100 / 51`.
pub fn better_than_percent(points: i32, scores: &[i32]) -> u32 {
    let lower = scores.len() - rank(points, scores);
    let percent = (lower + 1) * 100 / (scores.len() + 1);
    percent as u32
}

/// Page size of the leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShowFilter {
    Ten,
    TwentyFive,
    Fifty,
    /// Every score on one page
    All,
}

impl ShowFilter {
    /// Interpret a `show` query value.
    ///
    /// `-1` selects all scores; other values are rounded down to the next
    /// page size, and anything below 10 or unparsable falls back to 10.
    pub fn parse(value: Option<&str>) -> Self {
        let Some(show) = value.and_then(|v| v.trim().parse::<i64>().ok()) else {
            return Self::Ten;
        };

        match show {
            -1 => Self::All,
            s if s >= 50 => Self::Fifty,
            s if s >= 25 => Self::TwentyFive,
            _ => Self::Ten,
        }
    }

    /// Rows per page for a leaderboard of `total` scores.
    ///
    /// Never zero, so it is always safe to divide by.
    pub fn limit(self, total: i64) -> i64 {
        match self {
            Self::Ten => 10,
            Self::TwentyFive => 25,
            Self::Fifty => 50,
            Self::All => total.max(1),
        }
    }

    /// Value to put into a `show` query parameter
    pub fn as_param(self) -> i64 {
        match self {
            Self::All => -1,
            show => show.limit(0),
        }
    }
}

/// Normalised leaderboard filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub show: ShowFilter,
    /// 1-based, never past the last page
    pub page: i64,
}

impl Filters {
    pub fn limit(&self, total: i64) -> i64 {
        self.show.limit(total)
    }

    pub fn offset(&self, total: i64) -> i64 {
        (self.page - 1).saturating_mul(self.limit(total))
    }
}

/// Amount of pages a leaderboard of `total` scores spans, at least 1
pub fn last_page(show: i64, total: i64) -> i64 {
    let show = show.max(1);
    ((total.max(0) + show - 1) / show).max(1)
}

/// Turn the raw `show` and `page` query values into valid filters.
///
/// A page past the end of the leaderboard is moved to the last page.
pub fn normalise_filters(show: Option<&str>, page: Option<&str>, total: i64) -> Filters {
    let show = ShowFilter::parse(show);
    let limit = show.limit(total);

    let mut page = page
        .and_then(|p| p.trim().parse::<i64>().ok())
        .filter(|&p| p >= 1)
        .unwrap_or(1);

    if (page - 1).saturating_mul(limit) >= total {
        page = last_page(limit, total);
    }

    Filters { show, page }
}

/// Up to three consecutive page numbers around `page`, within `1..=last_page`.
pub fn page_window(show: i64, page: i64, total: i64) -> Vec<i64> {
    let last = last_page(show, total);
    let len = PAGE_WINDOW.min(last);
    let page = page.clamp(1, last);
    let start = (page - 1).clamp(1, last - len + 1);

    (start..start + len).collect()
}
