//! RSSHub 订阅源
//!
//! 通过 RSSHub 将社交媒体账号转换为 RSS 订阅，默认路由 `/twitter/user/{handle}`

use anyhow::{anyhow, Result};
use reqwest::Client;
use url::Url;

/// 订阅源
#[allow(async_fn_in_trait)]
pub trait FeedSource {
    /// 获取指定用户的原始订阅内容
    async fn fetch_feed(&self, handle: &str) -> Result<Vec<u8>>;
}

/// RSSHub 客户端
pub struct RssHubClient {
    client: Client,
    base_url: String,
    route: String,
}

impl RssHubClient {
    pub fn new(client: Client, base_url: &str, route: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            route: route.to_string(),
        }
    }

    /// 拼接用户订阅地址，保留服务地址中的路径前缀
    pub fn feed_url(&self, handle: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| anyhow!("无效的 RSSHub 地址 {}: {}", self.base_url, e))?;

        let segments: Vec<String> = self
            .route
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| s.replace("{handle}", handle))
            .collect();

        url.path_segments_mut()
            .map_err(|_| anyhow!("RSSHub 地址不能作为基础路径: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments.iter());

        Ok(url)
    }
}

impl FeedSource for RssHubClient {
    async fn fetch_feed(&self, handle: &str) -> Result<Vec<u8>> {
        let url = self.feed_url(handle)?;
        log::debug!("请求订阅 URL: {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("获取 @{} 的订阅失败: {}", handle, response.status()));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> RssHubClient {
        RssHubClient::new(Client::new(), base, "/twitter/user/{handle}")
    }

    #[test]
    fn test_feed_url() {
        let url = client("http://localhost:1200").feed_url("dotey").unwrap();
        assert_eq!(url.as_str(), "http://localhost:1200/twitter/user/dotey");
    }

    #[test]
    fn test_feed_url_keeps_prefix() {
        let url = client("https://example.com/rsshub/").feed_url("oran_ge").unwrap();
        assert_eq!(url.as_str(), "https://example.com/rsshub/twitter/user/oran_ge");
    }

    #[test]
    fn test_feed_url_encodes_handle() {
        let url = client("http://localhost:1200").feed_url("a b").unwrap();
        assert_eq!(url.as_str(), "http://localhost:1200/twitter/user/a%20b");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(client("not a url").feed_url("dotey").is_err());
    }
}
