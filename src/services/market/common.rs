//! 公共常量和辅助函数

use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use chrono_tz::Asia::Shanghai;
use reqwest::Client;
use serde_json::Value;

use crate::config::ApiConfig;

// ==================== 交易所 API 常量 ====================

/// 上交所公共查询接口
pub const SSE_QUERY_API: &str = "https://query.sse.com.cn/commonQuery.do";
/// 上交所每日成交概况 sqlId
pub const SSE_DEAL_DAILY_SQL_ID: &str = "COMMON_SSE_SJ_GPSJ_CJGK_MRGK_C";
/// 上交所页面，作为 Referer
pub const SSE_REFERER: &str = "https://www.sse.com.cn/";
/// 深交所报表下载接口
pub const SZSE_REPORT_API: &str = "https://www.szse.cn/api/report/ShowReport";

// ==================== 东方财富 API 常量 ====================

/// 涨停股池
pub const EM_ZT_POOL_API: &str = "https://push2ex.eastmoney.com/getTopicZTPool";
/// 跌停股池
pub const EM_DT_POOL_API: &str = "https://push2ex.eastmoney.com/getTopicDTPool";
/// 涨跌停池接口 ut 参数
pub const EM_POOL_UT: &str = "7eea3edcaed734bea9cbfc24409ed989";
/// 板块列表接口
pub const EM_CLIST_API: &str = "https://push2.eastmoney.com/api/qt/clist/get";
/// 板块资金流接口 ut 参数
pub const EM_CLIST_UT: &str = "b2884a393a59ad64002292a3e90d46a5";

/// 亿
pub const HUNDRED_MILLION: f64 = 100_000_000.0;

/// 获取当前北京时间
pub fn get_beijing_time() -> chrono::DateTime<chrono_tz::Tz> {
    Utc::now().with_timezone(&Shanghai)
}

/// 北京时间的今天
pub fn beijing_today() -> NaiveDate {
    get_beijing_time().date_naive()
}

/// 最近的交易日：周末回退到上一个周五
///
/// 节假日不做判断
pub fn latest_trading_day(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date - Duration::days(2),
        _ => date,
    }
}

/// 解析交易日期，支持 YYYYMMDD 与 YYYY-MM-DD
pub fn parse_trade_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| anyhow!("无效的交易日期: {}，应为 YYYYMMDD 或 YYYY-MM-DD", s))
}

/// 构建 HTTP 客户端
pub fn build_client(api: &ApiConfig) -> Result<Client> {
    Client::builder()
        .timeout(std::time::Duration::from_secs(api.timeout_secs))
        .connect_timeout(std::time::Duration::from_secs(api.connect_timeout_secs))
        .user_agent(api.user_agent.as_str())
        .gzip(true)
        .cookie_store(true)
        .build()
        .map_err(|e| anyhow!("创建 HTTP 客户端失败: {}", e))
}

/// 解析数值字符串，去除千分位逗号，"-" 和空串视为缺失
pub fn parse_number_str(s: &str) -> Option<f64> {
    let cleaned = s.trim().replace(',', "");
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 解析 JSON 数值，兼容字符串形式的数字
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number_str(s),
        _ => None,
    }
}
