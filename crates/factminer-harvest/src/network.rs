//! Social-network client abstraction.
//!
//! The harvester only needs three paged listings. Authentication happens
//! before a client is handed to the harvester.

use factminer_core::Result;

use crate::types::{Comment, Group, GroupQuery, PageRequest, Topic};

pub trait SocialNetwork {
    /// Display name of the network.
    fn name(&self) -> &str;

    fn search_groups(&self, query: &GroupQuery, page: PageRequest) -> Result<Vec<Group>>;

    fn topics(&self, group_id: i64, page: PageRequest) -> Result<Vec<Topic>>;

    /// Comments of a topic, oldest first.
    fn comments(&self, group_id: i64, topic_id: i64, page: PageRequest) -> Result<Vec<Comment>>;
}

impl<T: SocialNetwork + ?Sized> SocialNetwork for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn search_groups(&self, query: &GroupQuery, page: PageRequest) -> Result<Vec<Group>> {
        (**self).search_groups(query, page)
    }

    fn topics(&self, group_id: i64, page: PageRequest) -> Result<Vec<Topic>> {
        (**self).topics(group_id, page)
    }

    fn comments(&self, group_id: i64, topic_id: i64, page: PageRequest) -> Result<Vec<Comment>> {
        (**self).comments(group_id, topic_id, page)
    }
}
