//! 推文汇总数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 单条推文
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPost {
    /// 去除标记后的标题
    pub title: String,
    /// 去除标记后的正文前若干字
    pub summary: String,
    /// 原文链接
    pub link: String,
    /// 发布时间
    pub published: DateTime<Utc>,
}

/// 单个用户的汇总结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandleDigest {
    pub handle: String,
    pub posts: Vec<FeedPost>,
}
