//! 推文汇总服务
//!
//! 通过 RSSHub 获取关注用户的订阅，筛选近期推文

pub mod digest;
pub mod rsshub;

pub use digest::{collect_digests, parse_recent_posts, strip_markup, truncate_chars, DigestOptions};
pub use rsshub::{FeedSource, RssHubClient};
