//! Harvester: search terms → groups → topics → comments → reviews.

use factminer_core::{HarvestConfig, Result};
use factminer_extract::Review;
use serde::Serialize;
use tracing::{debug, info};

use crate::network::SocialNetwork;
use crate::types::{Group, GroupQuery, PageRequest, Topic};
use crate::window::{select_in_window, TimeWindow};

/// Counters collected during one harvest run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HarvestStats {
    pub groups_seen: usize,
    pub closed_groups_skipped: usize,
    pub topics_seen: usize,
    pub topics_kept: usize,
    pub comments_kept: usize,
    /// Listing calls made against the network, across all levels.
    pub page_requests: usize,
}

pub struct Harvester<C: SocialNetwork> {
    client: C,
    config: HarvestConfig,
    requests: Vec<String>,
}

impl<C: SocialNetwork> Harvester<C> {
    /// Create a harvester; search terms from `config` are registered up front.
    ///
    /// Page sizes are checked here because a zero page size never reaches a
    /// short page and would page forever.
    pub fn new(client: C, config: HarvestConfig) -> Result<Self> {
        config.validate()?;
        let requests = config.search_terms.clone();
        Ok(Self {
            client,
            config,
            requests,
        })
    }

    /// Register a search term. Duplicates are allowed and searched twice.
    pub fn add_request(&mut self, term: impl Into<String>) {
        self.requests.push(term.into());
    }

    /// Remove the first registered term equal to `term`.
    pub fn remove_request(&mut self, term: &str) -> bool {
        match self.requests.iter().position(|r| r == term) {
            Some(pos) => {
                self.requests.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn requests(&self) -> &[String] {
        &self.requests
    }

    pub fn harvest(&self, window: &TimeWindow) -> Result<Vec<Review>> {
        self.harvest_with_stats(window).map(|(reviews, _)| reviews)
    }

    /// Harvest every comment inside `window` from open groups matching any
    /// registered term. The first client failure aborts the run.
    pub fn harvest_with_stats(&self, window: &TimeWindow) -> Result<(Vec<Review>, HarvestStats)> {
        let mut stats = HarvestStats::default();
        let mut reviews = Vec::new();

        info!(
            "Harvesting {} from {} to {} for {} search terms",
            self.client.name(),
            window.start(),
            window.finish(),
            self.requests.len()
        );

        for term in &self.requests {
            let query = GroupQuery {
                text: term.clone(),
                city_id: self.config.city_id,
            };
            let groups = paginate(self.config.group_page_size, &mut stats, |page| {
                self.client.search_groups(&query, page)
            })?;
            debug!("Term {:?} matched {} groups", term, groups.len());

            for group in &groups {
                stats.groups_seen += 1;
                if group.is_closed {
                    stats.closed_groups_skipped += 1;
                    debug!("Skipping closed group {} ({})", group.id, group.name);
                    continue;
                }
                self.harvest_group(group, window, &mut stats, &mut reviews)?;
            }
        }

        info!(
            "Harvest finished: {} reviews from {} topics ({} page requests)",
            reviews.len(),
            stats.topics_kept,
            stats.page_requests
        );
        Ok((reviews, stats))
    }

    fn harvest_group(
        &self,
        group: &Group,
        window: &TimeWindow,
        stats: &mut HarvestStats,
        reviews: &mut Vec<Review>,
    ) -> Result<()> {
        let topics = paginate(self.config.topic_page_size, stats, |page| {
            self.client.topics(group.id, page)
        })?;

        for topic in &topics {
            stats.topics_seen += 1;
            if !window.may_overlap(topic) {
                continue;
            }
            stats.topics_kept += 1;
            self.harvest_topic(group, topic, window, stats, reviews)?;
        }
        Ok(())
    }

    fn harvest_topic(
        &self,
        group: &Group,
        topic: &Topic,
        window: &TimeWindow,
        stats: &mut HarvestStats,
        reviews: &mut Vec<Review>,
    ) -> Result<()> {
        let mut page = PageRequest::first(self.config.comment_page_size);
        loop {
            let comments = self.client.comments(group.id, topic.id, page)?;
            stats.page_requests += 1;
            let received = comments.len();
            let past_window = comments
                .first()
                .is_some_and(|c| c.date.date_naive() > window.finish());

            for comment in select_in_window(comments, window) {
                let uri = format!(
                    "{}/topic{}_{}?post={}",
                    self.config.host, group.id, topic.id, comment.id
                );
                reviews.push(Review::new(comment.text, uri));
                stats.comments_kept += 1;
            }

            if page.is_last(received) {
                break;
            }
            if past_window && self.config.stop_past_window {
                debug!(
                    "Topic {}_{} is past the window at offset {}",
                    group.id, topic.id, page.offset
                );
                break;
            }
            page = page.next();
        }
        Ok(())
    }
}

/// Fetch pages until one comes back shorter than requested.
fn paginate<T>(
    page_size: usize,
    stats: &mut HarvestStats,
    mut fetch: impl FnMut(PageRequest) -> Result<Vec<T>>,
) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut page = PageRequest::first(page_size);
    loop {
        let batch = fetch(page)?;
        stats.page_requests += 1;
        let received = batch.len();
        items.extend(batch);
        if page.is_last(received) {
            return Ok(items);
        }
        page = page.next();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Comment;
    use chrono::{DateTime, TimeZone, Utc};
    use factminer_core::Error;
    use std::cell::RefCell;
    use std::collections::HashMap;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn page_of<T: Clone>(items: &[T], page: PageRequest) -> Vec<T> {
        items.iter().skip(page.offset).take(page.count).cloned().collect()
    }

    #[derive(Default)]
    struct MockNetwork {
        groups: Vec<Group>,
        topics: HashMap<i64, Vec<Topic>>,
        comments: HashMap<(i64, i64), Vec<Comment>>,
        fail_comments: bool,
        calls: RefCell<Vec<String>>,
    }

    impl SocialNetwork for MockNetwork {
        fn name(&self) -> &str {
            "mock"
        }

        fn search_groups(&self, query: &GroupQuery, page: PageRequest) -> Result<Vec<Group>> {
            self.calls
                .borrow_mut()
                .push(format!("groups:{}:{}", query.text, page.offset));
            Ok(page_of(&self.groups, page))
        }

        fn topics(&self, group_id: i64, page: PageRequest) -> Result<Vec<Topic>> {
            self.calls
                .borrow_mut()
                .push(format!("topics:{}:{}", group_id, page.offset));
            let all = self.topics.get(&group_id).map(Vec::as_slice).unwrap_or(&[]);
            Ok(page_of(all, page))
        }

        fn comments(
            &self,
            group_id: i64,
            topic_id: i64,
            page: PageRequest,
        ) -> Result<Vec<Comment>> {
            self.calls
                .borrow_mut()
                .push(format!("comments:{}_{}:{}", group_id, topic_id, page.offset));
            if self.fail_comments {
                return Err(Error::Harvest("connection reset".into()));
            }
            let all = self
                .comments
                .get(&(group_id, topic_id))
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            Ok(page_of(all, page))
        }
    }

    fn group(id: i64, is_closed: bool) -> Group {
        Group {
            id,
            name: format!("group {}", id),
            is_closed,
        }
    }

    fn topic(id: i64, created: DateTime<Utc>, updated: DateTime<Utc>) -> Topic {
        Topic {
            id,
            title: format!("topic {}", id),
            created,
            updated,
        }
    }

    fn comments_daily(count: usize, from_day: u32) -> Vec<Comment> {
        (0..count)
            .map(|i| Comment {
                id: i as i64 + 1,
                date: at(2021, 1, from_day) + chrono::Duration::days(i as i64),
                text: format!("comment {}", i + 1),
            })
            .collect()
    }

    fn config(page: usize) -> HarvestConfig {
        HarvestConfig {
            group_page_size: page,
            topic_page_size: page,
            comment_page_size: page,
            ..HarvestConfig::default()
        }
    }

    fn calls_with_prefix(net: &MockNetwork, prefix: &str) -> usize {
        net.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    #[test]
    fn test_group_pagination_request_count() {
        for total in [0usize, 1, 9, 10, 11, 25] {
            let net = MockNetwork {
                groups: (0..total as i64).map(|i| group(i, true)).collect(),
                ..Default::default()
            };
            let mut harvester = Harvester::new(&net, config(10)).unwrap();
            harvester.add_request("авто");
            let window = TimeWindow::parse("2021-01-01", "2021-01-31").unwrap();
            let (_, stats) = harvester.harvest_with_stats(&window).unwrap();

            // A full last page needs one more (empty) request to be detected.
            let expected = total / 10 + 1;
            assert_eq!(calls_with_prefix(&net, "groups:"), expected, "total {}", total);
            assert_eq!(stats.groups_seen, total);
        }
    }

    #[test]
    fn test_closed_groups_skipped() {
        let mut net = MockNetwork {
            groups: vec![group(1, true), group(2, false)],
            ..Default::default()
        };
        net.topics.insert(1, vec![topic(10, at(2021, 1, 1), at(2021, 1, 9))]);
        net.topics.insert(2, vec![topic(20, at(2021, 1, 1), at(2021, 1, 9))]);
        net.comments.insert((1, 10), comments_daily(3, 2));
        net.comments.insert((2, 20), comments_daily(3, 2));

        let mut harvester = Harvester::new(&net, config(100)).unwrap();
        harvester.add_request("ремонт");
        let window = TimeWindow::parse("2021-01-01", "2021-01-31").unwrap();
        let (reviews, stats) = harvester.harvest_with_stats(&window).unwrap();

        assert_eq!(stats.closed_groups_skipped, 1);
        assert_eq!(calls_with_prefix(&net, "topics:1:"), 0);
        assert_eq!(reviews.len(), 3);
        assert_eq!(reviews[0].uri(), "vk.com/topic2_20?post=1");
        assert_eq!(reviews[0].text(), "comment 1");
    }

    #[test]
    fn test_topics_outside_window_not_listed() {
        let mut net = MockNetwork {
            groups: vec![group(1, false)],
            ..Default::default()
        };
        net.topics.insert(
            1,
            vec![
                topic(1, at(2020, 6, 1), at(2020, 12, 31)),
                topic(2, at(2021, 1, 2), at(2021, 1, 4)),
                topic(3, at(2021, 2, 1), at(2021, 3, 1)),
            ],
        );
        net.comments.insert((1, 2), comments_daily(3, 2));

        let mut harvester = Harvester::new(&net, config(100)).unwrap();
        harvester.add_request("шины");
        let window = TimeWindow::parse("2021-01-03", "2021-01-08").unwrap();
        let (reviews, stats) = harvester.harvest_with_stats(&window).unwrap();

        assert_eq!(stats.topics_seen, 3);
        assert_eq!(stats.topics_kept, 1);
        assert_eq!(calls_with_prefix(&net, "comments:"), 1);
        // Comments on 01-02, 01-03, 01-04; the first is before the window.
        let uris: Vec<&str> = reviews.iter().map(|r| r.uri()).collect();
        assert_eq!(
            uris,
            vec!["vk.com/topic1_2?post=2", "vk.com/topic1_2?post=3"]
        );
    }

    #[test]
    fn test_comment_paging_stops_past_window() {
        let mut net = MockNetwork {
            groups: vec![group(1, false)],
            ..Default::default()
        };
        net.topics.insert(1, vec![topic(5, at(2021, 1, 1), at(2021, 2, 28))]);
        // 50 daily comments from 01-01, pages of 5.
        net.comments.insert((1, 5), comments_daily(50, 1));

        let window = TimeWindow::parse("2021-01-03", "2021-01-08").unwrap();

        let mut harvester = Harvester::new(&net, config(5)).unwrap();
        harvester.add_request("мото");
        let reviews = harvester.harvest(&window).unwrap();
        assert_eq!(reviews.len(), 6);
        // Offsets 0 and 5 overlap the window, offset 10 starts on 01-11.
        assert_eq!(calls_with_prefix(&net, "comments:"), 3);

        net.calls.borrow_mut().clear();
        let mut exhaustive = config(5);
        exhaustive.stop_past_window = false;
        let mut harvester = Harvester::new(&net, exhaustive).unwrap();
        harvester.add_request("мото");
        let reviews = harvester.harvest(&window).unwrap();
        assert_eq!(reviews.len(), 6);
        assert_eq!(calls_with_prefix(&net, "comments:"), 11);
    }

    #[test]
    fn test_client_failure_propagates() {
        let mut net = MockNetwork {
            groups: vec![group(1, false)],
            fail_comments: true,
            ..Default::default()
        };
        net.topics.insert(1, vec![topic(1, at(2021, 1, 1), at(2021, 1, 5))]);

        let mut harvester = Harvester::new(&net, config(10)).unwrap();
        harvester.add_request("авто");
        let window = TimeWindow::parse("2021-01-01", "2021-01-31").unwrap();
        assert!(matches!(harvester.harvest(&window), Err(Error::Harvest(_))));
    }

    #[test]
    fn test_terms_not_deduplicated() {
        let mut net = MockNetwork {
            groups: vec![group(1, false)],
            ..Default::default()
        };
        net.topics.insert(1, vec![topic(1, at(2021, 1, 1), at(2021, 1, 5))]);
        net.comments.insert((1, 1), comments_daily(1, 2));

        let mut harvester = Harvester::new(&net, config(10)).unwrap();
        harvester.add_request("авто");
        harvester.add_request("автомобиль");
        let window = TimeWindow::parse("2021-01-01", "2021-01-31").unwrap();
        assert_eq!(harvester.harvest(&window).unwrap().len(), 2);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let net = MockNetwork::default();
        for zeroed in ["group", "topic", "comment"] {
            let mut cfg = config(10);
            match zeroed {
                "group" => cfg.group_page_size = 0,
                "topic" => cfg.topic_page_size = 0,
                _ => cfg.comment_page_size = 0,
            }
            assert!(
                matches!(Harvester::new(&net, cfg), Err(Error::Config(_))),
                "{} page size",
                zeroed
            );
        }
        assert!(net.calls.borrow().is_empty());
    }

    #[test]
    fn test_request_registry() {
        let net = MockNetwork::default();
        let mut cfg = config(10);
        cfg.search_terms = vec!["авто".into()];
        let mut harvester = Harvester::new(&net, cfg).unwrap();

        harvester.add_request("шины");
        harvester.add_request("авто");
        assert_eq!(harvester.requests(), ["авто", "шины", "авто"]);

        assert!(harvester.remove_request("авто"));
        assert_eq!(harvester.requests(), ["шины", "авто"]);
        assert!(!harvester.remove_request("мото"));
    }

    #[test]
    fn test_no_terms_no_requests() {
        let net = MockNetwork::default();
        let harvester = Harvester::new(&net, config(10)).unwrap();
        let window = TimeWindow::parse("2021-01-01", "2021-01-31").unwrap();
        let (reviews, stats) = harvester.harvest_with_stats(&window).unwrap();
        assert!(reviews.is_empty());
        assert_eq!(stats.page_requests, 0);
    }
}
