//! 市场快照与推文汇总
//!
//! - 行情快照：上交所、深交所成交额，涨跌停家数，概念资金流排名
//! - 推文汇总：通过 RSSHub 获取关注用户近 24 小时的推文
//!
//! 数据来源：上交所、深交所、东方财富、RSSHub

pub mod cli;      // 命令行参数
pub mod config;   // 配置加载
pub mod handlers; // 命令处理与输出渲染
pub mod models;   // 数据模型定义
pub mod services; // 数据获取服务
