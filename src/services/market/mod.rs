//! 行情快照数据服务
//!
//! 参考 akshare 的对应接口实现
//!
//! ## 数据来源
//! - 上交所：每日成交概况
//! - 深交所：市场总貌（Excel 报表）
//! - 东方财富：涨停股池、跌停股池、概念板块资金流

pub mod common;
pub mod eastmoney;
pub mod snapshot;
pub mod sse;
pub mod szse;

pub use common::{beijing_today, build_client, latest_trading_day, parse_trade_date};
pub use snapshot::{collect_snapshot, MarketDataService, MarketDataSource, SnapshotOutcome};
