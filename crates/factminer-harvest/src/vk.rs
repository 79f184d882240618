//! VK API client for group search and discussion boards.
//!
//! Expects an already-issued access token; obtaining one is not handled here.

use chrono::{DateTime, Utc};
use factminer_core::{HarvestConfig, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::VkError;
use crate::network::SocialNetwork;
use crate::types::{Comment, Group, GroupQuery, PageRequest, Topic};

const BASE_URL: &str = "https://api.vk.com/method";

pub struct VkClient {
    client: reqwest::blocking::Client,
    token: String,
    api_version: String,
}

impl VkClient {
    pub fn new(token: String, api_version: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            token,
            api_version: api_version.to_string(),
        }
    }

    pub fn from_config(token: String, config: &HarvestConfig) -> Self {
        Self::new(token, &config.api_version)
    }

    fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> std::result::Result<Vec<T>, VkError> {
        let url = format!("{}/{}", BASE_URL, method);
        let resp = self
            .client
            .get(&url)
            .query(params)
            .query(&[("access_token", &self.token), ("v", &self.api_version)])
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(VkError::Http {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text()?;
        let items = decode_items(&body)?;
        debug!("VK {} returned {} items", method, items.len());
        Ok(items)
    }
}

fn page_params(page: PageRequest) -> [(&'static str, String); 2] {
    [
        ("offset", page.offset.to_string()),
        ("count", page.count.to_string()),
    ]
}

impl SocialNetwork for VkClient {
    fn name(&self) -> &str {
        "VK"
    }

    fn search_groups(&self, query: &GroupQuery, page: PageRequest) -> Result<Vec<Group>> {
        let mut params = vec![("q", query.text.clone())];
        if let Some(city_id) = query.city_id {
            params.push(("city_id", city_id.to_string()));
        }
        params.extend(page_params(page));

        let raw: Vec<RawGroup> = self.call("groups.search", &params)?;
        Ok(raw.into_iter().map(Group::from).collect())
    }

    fn topics(&self, group_id: i64, page: PageRequest) -> Result<Vec<Topic>> {
        let mut params = vec![("group_id", group_id.to_string())];
        params.extend(page_params(page));

        let raw: Vec<RawTopic> = self.call("board.getTopics", &params)?;
        Ok(raw
            .into_iter()
            .map(Topic::try_from)
            .collect::<std::result::Result<_, _>>()?)
    }

    fn comments(&self, group_id: i64, topic_id: i64, page: PageRequest) -> Result<Vec<Comment>> {
        let mut params = vec![
            ("group_id", group_id.to_string()),
            ("topic_id", topic_id.to_string()),
        ];
        params.extend(page_params(page));

        let raw: Vec<RawComment> = self.call("board.getComments", &params)?;
        Ok(raw
            .into_iter()
            .map(Comment::try_from)
            .collect::<std::result::Result<_, _>>()?)
    }
}

// ---------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: Option<ItemsPage<T>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ItemsPage<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error_code: i64,
    error_msg: String,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    id: i64,
    #[serde(default)]
    name: String,
    /// 0 open, 1 closed, 2 private.
    #[serde(default)]
    is_closed: i64,
}

#[derive(Debug, Deserialize)]
struct RawTopic {
    id: i64,
    #[serde(default)]
    title: String,
    created: i64,
    updated: i64,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    id: i64,
    date: i64,
    #[serde(default)]
    text: String,
}

fn decode_items<T: DeserializeOwned>(body: &str) -> std::result::Result<Vec<T>, VkError> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    match (envelope.response, envelope.error) {
        (_, Some(err)) => Err(VkError::Api {
            code: err.error_code,
            message: err.error_msg,
        }),
        (Some(page), None) => Ok(page.items),
        (None, None) => Err(VkError::Parse("response has neither data nor error".into())),
    }
}

fn timestamp(secs: i64) -> std::result::Result<DateTime<Utc>, VkError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| VkError::Parse(format!("timestamp out of range: {}", secs)))
}

impl From<RawGroup> for Group {
    fn from(raw: RawGroup) -> Self {
        Group {
            id: raw.id,
            name: raw.name,
            is_closed: raw.is_closed != 0,
        }
    }
}

impl TryFrom<RawTopic> for Topic {
    type Error = VkError;

    fn try_from(raw: RawTopic) -> std::result::Result<Self, VkError> {
        Ok(Topic {
            id: raw.id,
            title: raw.title,
            created: timestamp(raw.created)?,
            updated: timestamp(raw.updated)?,
        })
    }
}

impl TryFrom<RawComment> for Comment {
    type Error = VkError;

    fn try_from(raw: RawComment) -> std::result::Result<Self, VkError> {
        Ok(Comment {
            id: raw.id,
            date: timestamp(raw.date)?,
            text: raw.text,
        })
    }
}
