//! 配置模块
//!
//! 支持从 JSON 文件加载采集配置，所有字段均有默认值

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// HTTP 请求配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// 请求使用的 User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// 行情快照配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// 是否采集概念资金流排名
    #[serde(default = "default_true")]
    pub topics_enabled: bool,
    /// 输出的题材数量
    #[serde(default = "default_topic_count")]
    pub topic_count: usize,
    /// 概念资金流接口单页条数
    #[serde(default = "default_concept_page_size")]
    pub concept_page_size: usize,
}

/// 推文汇总配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// RSSHub 服务地址
    #[serde(default = "default_rsshub_url")]
    pub rsshub_url: String,
    /// 订阅路由模板，`{handle}` 会被替换为用户名
    #[serde(default = "default_route")]
    pub route: String,
    /// 关注的用户列表
    #[serde(default = "default_handles")]
    pub handles: Vec<String>,
    /// 时间窗口（小时）
    #[serde(default = "default_window_hours")]
    pub window_hours: i64,
    /// 每个用户最多展示条数
    #[serde(default = "default_max_posts")]
    pub max_posts_per_handle: usize,
    /// 摘要截取字符数
    #[serde(default = "default_summary_chars")]
    pub summary_chars: usize,
    /// 标题展示字符数
    #[serde(default = "default_title_chars")]
    pub title_chars: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP 配置
    #[serde(default)]
    pub api: ApiConfig,
    /// 行情快照配置
    #[serde(default)]
    pub market: MarketConfig,
    /// 推文汇总配置
    #[serde(default)]
    pub feed: FeedConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
    /// 配置来源文件（None 表示使用默认值）
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

// 默认值函数
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}
fn default_true() -> bool { true }
fn default_topic_count() -> usize { 10 }
fn default_concept_page_size() -> usize { 50 }
fn default_rsshub_url() -> String { "http://localhost:1200".to_string() }
fn default_route() -> String { "/twitter/user/{handle}".to_string() }
fn default_handles() -> Vec<String> {
    ["xiaohu", "oran_ge", "dotey", "vista8", "Khazix0918"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_window_hours() -> i64 { 24 }
fn default_max_posts() -> usize { 5 }
fn default_summary_chars() -> usize { 100 }
fn default_title_chars() -> usize { 60 }
fn default_log_level() -> String { "info".to_string() }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            topics_enabled: true,
            topic_count: default_topic_count(),
            concept_page_size: default_concept_page_size(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            rsshub_url: default_rsshub_url(),
            route: default_route(),
            handles: default_handles(),
            window_hours: default_window_hours(),
            max_posts_per_handle: default_max_posts(),
            summary_chars: default_summary_chars(),
            title_chars: default_title_chars(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("读取配置文件 {} 失败: {}", path.display(), e))?;
        let mut config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow!("解析配置文件 {} 失败: {}", path.display(), e))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// 加载配置
    ///
    /// 显式指定的路径必须加载成功；否则依次尝试 `config.json`、
    /// `config/config.json`，都不可用时使用默认值。
    /// 此时日志尚未初始化，加载失败的默认路径会被静默跳过。
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let config_paths = ["config.json", "config/config.json"];
        for path in config_paths {
            if Path::new(path).exists() {
                if let Ok(config) = Self::from_file(path) {
                    return Ok(config);
                }
            }
        }

        Ok(Self::default())
    }

    /// 用环境变量覆盖配置项
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("RSSHUB_URL") {
            if !url.trim().is_empty() {
                self.feed.rsshub_url = url.trim().to_string();
            }
        }
    }

    /// 配置来源描述，用于启动日志
    pub fn source_label(&self) -> String {
        match &self.source {
            Some(path) => path.display().to_string(),
            None => "默认配置".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.market.topic_count, 10);
        assert!(config.market.topics_enabled);
        assert_eq!(config.feed.window_hours, 24);
        assert_eq!(config.feed.max_posts_per_handle, 5);
        assert_eq!(config.feed.handles.len(), 5);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.source_label(), "默认配置");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "market": { "topics_enabled": false },
            "feed": { "handles": ["alice"], "rsshub_url": "http://rsshub.local" }
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert!(!config.market.topics_enabled);
        assert_eq!(config.market.topic_count, 10);
        assert_eq!(config.feed.handles, vec!["alice".to_string()]);
        assert_eq!(config.feed.rsshub_url, "http://rsshub.local");
        assert_eq!(config.feed.route, "/twitter/user/{handle}");
        assert_eq!(config.api.connect_timeout_secs, 10);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/market-digest.json")));
        assert!(result.is_err());
    }
}
