//! 业务逻辑服务模块
//!
//! 封装数据获取和处理逻辑

pub mod market; // 行情快照
pub mod feed;   // 推文汇总
