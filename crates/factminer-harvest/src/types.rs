//! Harvested units and paging parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A community returned by group search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    /// Closed and private groups are never harvested.
    pub is_closed: bool,
}

/// A discussion board topic inside a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub title: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// A post in a topic. One kept comment becomes one review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub text: String,
}

/// Group search parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupQuery {
    pub text: String,
    /// Locale filter; `None` searches everywhere.
    pub city_id: Option<u32>,
}

/// Offset-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub count: usize,
}

impl PageRequest {
    pub fn first(count: usize) -> Self {
        Self { offset: 0, count }
    }

    pub fn next(self) -> Self {
        Self {
            offset: self.offset + self.count,
            count: self.count,
        }
    }

    /// A page shorter than requested is the last one.
    pub fn is_last(&self, received: usize) -> bool {
        received < self.count
    }
}
