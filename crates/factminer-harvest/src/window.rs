//! Date window selection for topics and comment pages.
//!
//! Timestamps are truncated to their UTC date before comparison; both ends
//! of the window are inclusive.

use chrono::NaiveDate;
use factminer_core::{Error, Result};

use crate::types::{Comment, Topic};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: NaiveDate,
    finish: NaiveDate,
}

impl TimeWindow {
    pub fn new(start: NaiveDate, finish: NaiveDate) -> Result<Self> {
        if start > finish {
            return Err(Error::InvalidWindow(format!(
                "start {} is after finish {}",
                start, finish
            )));
        }
        Ok(Self { start, finish })
    }

    /// Parse `YYYY-MM-DD` bounds.
    pub fn parse(start: &str, finish: &str) -> Result<Self> {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| Error::InvalidWindow(format!("{:?}: {}", s, e)))
        };
        Self::new(parse(start)?, parse(finish)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn finish(&self) -> NaiveDate {
        self.finish
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.finish
    }

    /// Cheap overlap test for a topic: created no later than the window end
    /// and updated no earlier than its start. A topic passing this test may
    /// still have no comment inside the window.
    pub fn may_overlap(&self, topic: &Topic) -> bool {
        topic.created.date_naive() <= self.finish && topic.updated.date_naive() >= self.start
    }
}

/// Keep the comments of one page that fall inside the window.
///
/// Pages are ordered oldest first, so the first and last comment bound the
/// page:
/// * both inside → the whole page is kept as is;
/// * page ends before the start or begins after the finish → nothing is kept;
/// * otherwise each comment is checked.
pub fn select_in_window(comments: Vec<Comment>, window: &TimeWindow) -> Vec<Comment> {
    let (first, last) = match (comments.first(), comments.last()) {
        (Some(first), Some(last)) => (first.date.date_naive(), last.date.date_naive()),
        _ => return comments,
    };

    if first >= window.start && last <= window.finish {
        return comments;
    }
    if last < window.start || first > window.finish {
        return Vec::new();
    }

    comments
        .into_iter()
        .filter(|c| window.contains(c.date.date_naive()))
        .collect()
}
