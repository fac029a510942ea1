//! 上交所每日成交概况
//!
//! 对应 akshare 的 stock_sse_deal_daily() 函数
//! 数据来源: https://www.sse.com.cn/market/stockdata/overview/day/

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;

use super::common::{parse_number, SSE_DEAL_DAILY_SQL_ID, SSE_QUERY_API, SSE_REFERER};
use crate::models::{SseDealDaily, SseDealRow};

/// 接口字段 -> 统计项名称
const SSE_FIELDS: [(&str, &str); 8] = [
    ("LIST_NUM", "挂牌数"),
    ("TOTAL_VALUE", "市价总值"),
    ("NEGO_VALUE", "流通市值"),
    ("TRADE_AMT", "成交金额"),
    ("TRADE_VOL", "成交量"),
    ("AVG_PE_RATE", "平均市盈率"),
    ("TOTAL_TO_RATE", "换手率"),
    ("NEGO_TO_RATE", "流通换手率"),
];

/// 成交金额统计项
pub const SSE_ITEM_AMOUNT: &str = "成交金额";
/// 成交量统计项
pub const SSE_ITEM_VOLUME: &str = "成交量";

/// 获取上交所每日成交概况
pub async fn get_sse_deal_daily(client: &Client, date: NaiveDate) -> Result<SseDealDaily> {
    let search_date = date.format("%Y-%m-%d").to_string();
    log::debug!("请求上交所每日概况 URL: {} 日期: {}", SSE_QUERY_API, search_date);

    let response = client
        .get(SSE_QUERY_API)
        .query(&[
            ("sqlId", SSE_DEAL_DAILY_SQL_ID),
            ("PRODUCT_CODE", "01,02,03,11,17"),
            ("type", "inParams"),
            ("SEARCH_DATE", search_date.as_str()),
        ])
        .header("Referer", SSE_REFERER)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(anyhow!("获取上交所每日概况失败: {}", response.status()));
    }

    let text = response.text().await?;
    parse_sse_deal_daily(&text, date)
}

/// 去掉可能存在的 JSONP 包装 `callback({...})`
fn strip_jsonp(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }
    match (trimmed.find('('), trimmed.rfind(')')) {
        (Some(start), Some(end)) if start < end => &trimmed[start + 1..end],
        _ => trimmed,
    }
}

/// 解析上交所每日概况
///
/// 接口按板块（PRODUCT_CODE）返回记录，这里转置为按统计项的行
pub fn parse_sse_deal_daily(text: &str, date: NaiveDate) -> Result<SseDealDaily> {
    let json: Value = serde_json::from_str(strip_jsonp(text))
        .map_err(|e| anyhow!("解析上交所每日概况失败: {}", e))?;

    let records = json["result"]
        .as_array()
        .ok_or_else(|| anyhow!("上交所每日概况缺少 result 字段"))?;

    if records.is_empty() {
        return Err(anyhow!("上交所 {} 无成交概况数据，可能是非交易日", date));
    }

    let mut rows: Vec<SseDealRow> = SSE_FIELDS
        .iter()
        .map(|(_, item)| SseDealRow {
            item: item.to_string(),
            stock: None,
            main_board_a: None,
            main_board_b: None,
            star_market: None,
            repurchase: None,
        })
        .collect();

    for record in records {
        let product = record["PRODUCT_CODE"].as_str().unwrap_or("");
        for (row, (field, _)) in rows.iter_mut().zip(SSE_FIELDS.iter()) {
            let value = parse_number(&record[*field]);
            match product {
                "11" => row.stock = value,
                "01" => row.main_board_a = value,
                "02" => row.main_board_b = value,
                "03" => row.star_market = value,
                "17" => row.repurchase = value,
                _ => {}
            }
        }
    }

    Ok(SseDealDaily { rows })
}
