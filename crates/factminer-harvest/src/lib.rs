//! Review harvester: pages through groups, topics and comments of a social
//! network for every registered search term, and keeps the comments that
//! fall inside a date window.
//!
//! The network is reached through the [`SocialNetwork`] trait; [`VkClient`]
//! is the HTTP implementation for VK.

pub mod error;
pub mod harvester;
pub mod network;
pub mod types;
pub mod vk;
pub mod window;

pub use error::VkError;
pub use harvester::{HarvestStats, Harvester};
pub use network::SocialNetwork;
pub use types::*;
pub use vk::VkClient;
pub use window::{select_in_window, TimeWindow};
