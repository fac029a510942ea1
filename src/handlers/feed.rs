//! 推文汇总输出

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Asia::Shanghai;

use crate::config::{AppConfig, FeedConfig};
use crate::models::HandleDigest;
use crate::services::feed::{collect_digests, truncate_chars, DigestOptions, RssHubClient};
use crate::services::market::build_client;

/// 获取各用户近期推文并生成汇总文本
pub async fn run(config: &AppConfig, now: DateTime<Utc>) -> Result<String> {
    let feed = &config.feed;
    let options = DigestOptions::from_config(feed)?;
    log::info!("RSSHub: {}，关注 {} 个用户", feed.rsshub_url, feed.handles.len());

    let client = build_client(&config.api)?;
    let source = RssHubClient::new(client, &feed.rsshub_url, &feed.route);

    let digests = collect_digests(&source, &feed.handles, now, &options).await;
    let date = now.with_timezone(&Shanghai).date_naive();

    Ok(render_digest(&digests, date, feed))
}

/// 渲染汇总
///
/// 每个用户最多展示 `max_posts_per_handle` 条，超出部分只提示数量
pub fn render_digest(digests: &[HandleDigest], date: NaiveDate, config: &FeedConfig) -> String {
    let mut lines = vec![
        format!("=== X 每日推文汇总 {} ===", date.format("%Y-%m-%d")),
        String::new(),
    ];

    let mut total = 0;
    for digest in digests.iter().filter(|d| !d.posts.is_empty()) {
        total += digest.posts.len();
        lines.push(format!("📱 @{}: {}条", digest.handle, digest.posts.len()));

        for (i, post) in digest.posts.iter().take(config.max_posts_per_handle).enumerate() {
            let title = if post.title.chars().count() > config.title_chars {
                format!("{}...", truncate_chars(&post.title, config.title_chars))
            } else {
                post.title.clone()
            };
            lines.push(format!("  {}. {}", i + 1, title));
            lines.push(format!("     🔗 {}", post.link));
        }

        if digest.posts.len() > config.max_posts_per_handle {
            lines.push(format!(
                "  ... 还有 {} 条",
                digest.posts.len() - config.max_posts_per_handle
            ));
        }
        lines.push(String::new());
    }

    if total == 0 {
        lines.push(format!("最近{}小时无新推文", config.window_hours));
    } else {
        lines.push(format!("共 {} 条推文", total));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
