//! 推文筛选与清洗
//!
//! 解析 RSS/Atom 订阅，保留时间窗口内的条目，去除标记并截取摘要

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::sync::OnceLock;

use super::rsshub::FeedSource;
use crate::config::FeedConfig;
use crate::models::{FeedPost, HandleDigest};

/// 筛选参数
#[derive(Debug, Clone)]
pub struct DigestOptions {
    /// 时间窗口
    pub window: Duration,
    /// 摘要截取字符数
    pub summary_chars: usize,
}

/// 时间窗口上限（小时）
pub const MAX_WINDOW_HOURS: i64 = 24 * 366;

impl DigestOptions {
    /// 时间窗口必须在 1 到 [`MAX_WINDOW_HOURS`] 小时之间
    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        let hours = config.window_hours;
        if !(1..=MAX_WINDOW_HOURS).contains(&hours) {
            return Err(anyhow!(
                "时间窗口必须在 1 到 {} 小时之间: {}",
                MAX_WINDOW_HOURS,
                hours
            ));
        }
        let window = Duration::try_hours(hours).ok_or_else(|| anyhow!("时间窗口超出范围: {}", hours))?;

        Ok(Self {
            window,
            summary_chars: config.summary_chars,
        })
    }
}

fn markup_regex() -> &'static Regex {
    static MARKUP: OnceLock<Regex> = OnceLock::new();
    MARKUP.get_or_init(|| Regex::new(r"<[^<]+?>").unwrap())
}

/// 去除 HTML/XML 标签
pub fn strip_markup(text: &str) -> String {
    markup_regex().replace_all(text, "").into_owned()
}

/// 按字符截取前 n 个字符
pub fn truncate_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// 解析订阅内容并筛选最近的条目
///
/// 发布时间缺失或无法解析的条目直接跳过；`published >= now - window` 的条目保留
pub fn parse_recent_posts(
    content: &[u8],
    now: DateTime<Utc>,
    options: &DigestOptions,
) -> Result<Vec<FeedPost>> {
    let feed = feed_rs::parser::parse(content).map_err(|e| anyhow!("解析订阅失败: {}", e))?;
    let cutoff = now
        .checked_sub_signed(options.window)
        .ok_or_else(|| anyhow!("时间窗口超出范围: {} 小时", options.window.num_hours()))?;

    let mut posts = Vec::new();
    for entry in feed.entries {
        let published = match entry.published {
            Some(ts) => ts,
            None => {
                log::debug!("跳过发布时间无效的条目: {}", entry.id);
                continue;
            }
        };

        if published < cutoff {
            continue;
        }

        let title = entry
            .title
            .map(|t| strip_markup(&t.content))
            .unwrap_or_default();

        let body = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .unwrap_or_default();
        let summary = truncate_chars(&strip_markup(&body), options.summary_chars)
            .trim()
            .to_string();

        let link = entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default();

        posts.push(FeedPost {
            title: title.trim().to_string(),
            summary,
            link,
            published,
        });
    }

    Ok(posts)
}

/// 依次获取各用户订阅并生成汇总
///
/// 单个用户获取或解析失败只记录日志，按无推文处理
pub async fn collect_digests<S: FeedSource>(
    source: &S,
    handles: &[String],
    now: DateTime<Utc>,
    options: &DigestOptions,
) -> Vec<HandleDigest> {
    let mut digests = Vec::with_capacity(handles.len());

    for handle in handles {
        let posts = match source.fetch_feed(handle).await {
            Ok(content) => match parse_recent_posts(&content, now, options) {
                Ok(posts) => posts,
                Err(e) => {
                    log::warn!("@{} 订阅解析失败: {}", handle, e);
                    Vec::new()
                }
            },
            Err(e) => {
                log::warn!("@{} 订阅获取失败: {}", handle, e);
                Vec::new()
            }
        };

        log::info!("@{}: 最近 {} 小时 {} 条", handle, options.window.num_hours(), posts.len());
        digests.push(HandleDigest {
            handle: handle.clone(),
            posts,
        });
    }

    digests
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn options() -> DigestOptions {
        DigestOptions {
            window: Duration::hours(24),
            summary_chars: 100,
        }
    }

    fn rss(items: &[(&str, &str, &str)]) -> String {
        let body: String = items
            .iter()
            .map(|(title, pub_date, description)| {
                format!(
                    "<item><title>{}</title><link>https://x.com/status/{}</link><guid>{}</guid><pubDate>{}</pubDate><description>{}</description></item>",
                    title, title.len(), title, pub_date, description
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>feed</title><link>https://x.com</link><description>d</description>{}</channel></rss>"#,
            body
        )
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(strip_markup("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_markup("a < b"), "a < b");
        assert_eq!(strip_markup("<br/>line"), "line");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("你好世界", 2), "你好");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_window_boundaries() {
        let xml = rss(&[
            ("inside", "Sun, 18 Oct 2026 12:01:00 GMT", "recent"),
            ("outside", "Sun, 18 Oct 2026 11:59:59 GMT", "too old"),
            ("exact", "Sun, 18 Oct 2026 12:00:00 GMT", "edge"),
        ]);
        let posts = parse_recent_posts(xml.as_bytes(), now(), &options()).unwrap();
        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["inside", "exact"]);
    }

    #[test]
    fn test_unparseable_date_is_skipped() {
        let xml = rss(&[
            ("good-1", "Mon, 19 Oct 2026 08:00:00 GMT", "a"),
            ("broken", "not a date at all", "b"),
            ("good-2", "Mon, 19 Oct 2026 09:30:00 +0000", "c"),
        ]);
        let posts = parse_recent_posts(xml.as_bytes(), now(), &options()).unwrap();
        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["good-1", "good-2"]);
    }

    #[test]
    fn test_summary_cleaned_and_truncated() {
        let long_text = "长".repeat(150);
        let description = format!("&lt;p&gt;{}&lt;/p&gt;", long_text);
        let xml = rss(&[("t", "Mon, 19 Oct 2026 10:00:00 GMT", description.as_str())]);

        let posts = parse_recent_posts(xml.as_bytes(), now(), &options()).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].summary.chars().count(), 100);
        assert!(!posts[0].summary.contains('<'));
        assert_eq!(posts[0].link, "https://x.com/status/1");
    }

    fn window_config(hours: i64) -> FeedConfig {
        FeedConfig {
            window_hours: hours,
            ..FeedConfig::default()
        }
    }

    #[test]
    fn test_options_from_config() {
        let options = DigestOptions::from_config(&window_config(48)).unwrap();
        assert_eq!(options.window, Duration::hours(48));
        assert_eq!(options.summary_chars, 100);

        let widest = DigestOptions::from_config(&window_config(MAX_WINDOW_HOURS)).unwrap();
        assert_eq!(widest.window.num_hours(), MAX_WINDOW_HOURS);
    }

    #[test]
    fn test_options_reject_out_of_range_window() {
        for hours in [0, -1, -24, MAX_WINDOW_HOURS + 1, 10_000_000_000, i64::MAX, i64::MIN] {
            let err = DigestOptions::from_config(&window_config(hours)).unwrap_err();
            println!("  {} 小时: {}", hours, err);
            assert!(err.to_string().contains("时间窗口"));
        }
    }

    #[test]
    fn test_window_beyond_calendar_is_error() {
        let options = DigestOptions {
            window: Duration::MAX,
            summary_chars: 100,
        };
        let xml = rss(&[("t", "Mon, 19 Oct 2026 10:00:00 GMT", "x")]);
        assert!(parse_recent_posts(xml.as_bytes(), now(), &options).is_err());
    }

    #[test]
    fn test_invalid_feed_is_error() {
        assert!(parse_recent_posts(b"<html>nope", now(), &options()).is_err());
    }

    struct FakeFeeds(HashMap<String, String>);

    impl FeedSource for FakeFeeds {
        async fn fetch_feed(&self, handle: &str) -> Result<Vec<u8>> {
            self.0
                .get(handle)
                .map(|s| s.as_bytes().to_vec())
                .ok_or_else(|| anyhow!("连接被拒绝"))
        }
    }

    #[tokio::test]
    async fn test_collect_digests_isolates_handles() {
        let mut feeds = HashMap::new();
        feeds.insert(
            "alice".to_string(),
            rss(&[
                ("a1", "Mon, 19 Oct 2026 11:00:00 GMT", "x"),
                ("a-bad", "yesterday-ish", "x"),
            ]),
        );
        feeds.insert(
            "bob".to_string(),
            rss(&[("b1", "Mon, 19 Oct 2026 01:00:00 GMT", "y")]),
        );
        feeds.insert("carol".to_string(), "garbage".to_string());

        let handles: Vec<String> = ["alice", "bob", "carol", "dave"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let digests = collect_digests(&FakeFeeds(feeds), &handles, now(), &options()).await;

        assert_eq!(digests.len(), 4);
        assert_eq!(digests[0].posts.len(), 1);
        assert_eq!(digests[0].posts[0].title, "a1");
        assert_eq!(digests[1].posts.len(), 1);
        assert!(digests[2].posts.is_empty());
        assert!(digests[3].posts.is_empty());
    }
}
