//! 东方财富涨跌停池与概念资金流
//!
//! 对应 akshare 的 stock_zt_pool_em()、stock_zt_pool_dtgc_em()、
//! stock_sector_fund_flow_rank(sector_type="概念资金流") 函数
//! 数据来源: https://quote.eastmoney.com/ztb/ 、https://data.eastmoney.com/bkzj/gn.html

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;

use super::common::{
    parse_number, EM_CLIST_API, EM_CLIST_UT, EM_DT_POOL_API, EM_POOL_UT, EM_ZT_POOL_API,
};
use crate::models::{ConceptFundFlow, LimitDownStock, LimitUpStock};

/// 板块资金流接口返回字段
const CONCEPT_FIELDS: &str = "f12,f14,f2,f3,f62,f184,f66,f69,f72,f75,f78,f81,f84,f87,f204,f205,f124";

/// 请求涨跌停池接口，返回原始 JSON
async fn fetch_pool(client: &Client, url: &str, sort: &str, date: NaiveDate) -> Result<Value> {
    let date_str = date.format("%Y%m%d").to_string();
    log::debug!("请求股池 URL: {} 日期: {}", url, date_str);

    let response = client
        .get(url)
        .query(&[
            ("ut", EM_POOL_UT),
            ("dpt", "wz.ztzt"),
            ("Pageindex", "0"),
            ("pagesize", "10000"),
            ("sort", sort),
            ("date", date_str.as_str()),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(anyhow!("获取股池数据失败: {}", response.status()));
    }

    let json: Value = response.json().await?;
    Ok(json)
}

/// 取出 `data.pool` 数组；`data` 为 null 表示当日无数据
fn pool_items(json: &Value) -> Result<Vec<Value>> {
    if !json.is_object() {
        return Err(anyhow!("股池接口返回格式异常"));
    }
    match &json["data"] {
        Value::Null => Ok(Vec::new()),
        data => Ok(data["pool"].as_array().cloned().unwrap_or_default()),
    }
}

fn as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn as_count(value: &Value) -> Option<u32> {
    parse_number(value).filter(|v| *v >= 0.0).map(|v| v as u32)
}

/// 获取涨停股池
pub async fn get_limit_up_pool(client: &Client, date: NaiveDate) -> Result<Vec<LimitUpStock>> {
    let json = fetch_pool(client, EM_ZT_POOL_API, "fbt:asc", date).await?;
    parse_limit_up_pool(&json)
}

/// 解析涨停股池，价格字段 `p` 以厘为单位
pub fn parse_limit_up_pool(json: &Value) -> Result<Vec<LimitUpStock>> {
    let stocks = pool_items(json)?
        .iter()
        .map(|item| LimitUpStock {
            code: as_string(&item["c"]),
            name: as_string(&item["n"]),
            change_percent: parse_number(&item["zdp"]).unwrap_or(0.0),
            latest_price: parse_number(&item["p"]).unwrap_or(0.0) / 1000.0,
            amount: parse_number(&item["amount"]).unwrap_or(0.0),
            consecutive_boards: as_count(&item["lbc"]),
            industry: as_string(&item["hybk"]),
        })
        .collect();
    Ok(stocks)
}

/// 获取跌停股池
pub async fn get_limit_down_pool(client: &Client, date: NaiveDate) -> Result<Vec<LimitDownStock>> {
    let json = fetch_pool(client, EM_DT_POOL_API, "fund:asc", date).await?;
    parse_limit_down_pool(&json)
}

/// 解析跌停股池
pub fn parse_limit_down_pool(json: &Value) -> Result<Vec<LimitDownStock>> {
    let stocks = pool_items(json)?
        .iter()
        .map(|item| LimitDownStock {
            code: as_string(&item["c"]),
            name: as_string(&item["n"]),
            change_percent: parse_number(&item["zdp"]).unwrap_or(0.0),
            latest_price: parse_number(&item["p"]).unwrap_or(0.0) / 1000.0,
            amount: parse_number(&item["amount"]).unwrap_or(0.0),
            consecutive_days: as_count(&item["days"]),
            industry: as_string(&item["hybk"]),
        })
        .collect();
    Ok(stocks)
}

/// 获取概念板块资金流排名（按主力净流入降序）
pub async fn get_concept_fund_flow(client: &Client, page_size: usize) -> Result<Vec<ConceptFundFlow>> {
    log::debug!("请求概念资金流 URL: {}", EM_CLIST_API);

    let page_size = page_size.to_string();
    let response = client
        .get(EM_CLIST_API)
        .query(&[
            ("pn", "1"),
            ("pz", page_size.as_str()),
            ("po", "1"),
            ("np", "1"),
            ("ut", EM_CLIST_UT),
            ("fltt", "2"),
            ("invt", "2"),
            ("fid", "f62"),
            ("fs", "m:90 t:3"),
            ("fields", CONCEPT_FIELDS),
        ])
        .header("Referer", "https://data.eastmoney.com/")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(anyhow!("获取概念资金流失败: {}", response.status()));
    }

    let json: Value = response.json().await?;
    parse_concept_fund_flow(&json)
}

/// 解析概念资金流排名，保持接口返回顺序
///
/// `data.diff` 可能是数组，也可能是以序号为键的对象
pub fn parse_concept_fund_flow(json: &Value) -> Result<Vec<ConceptFundFlow>> {
    if !json.is_object() {
        return Err(anyhow!("概念资金流接口返回格式异常"));
    }

    let items: Vec<&Value> = match &json["data"]["diff"] {
        Value::Array(arr) => arr.iter().collect(),
        Value::Object(map) => {
            let mut entries: Vec<(u64, &Value)> = map
                .iter()
                .filter_map(|(k, v)| k.parse::<u64>().ok().map(|idx| (idx, v)))
                .collect();
            entries.sort_by_key(|(idx, _)| *idx);
            entries.into_iter().map(|(_, v)| v).collect()
        }
        _ => Vec::new(),
    };

    let flows = items
        .into_iter()
        .filter_map(|item| {
            let name = as_string(&item["f14"]);
            if name.is_empty() {
                return None;
            }
            Some(ConceptFundFlow {
                name,
                latest_price: parse_number(&item["f2"]),
                change_percent: parse_number(&item["f3"]).unwrap_or(0.0),
                main_net_inflow: parse_number(&item["f62"]),
                main_net_inflow_ratio: parse_number(&item["f184"]),
            })
        })
        .collect();

    Ok(flows)
}
