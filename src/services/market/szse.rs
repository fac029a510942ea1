//! 深交所市场总貌
//!
//! 对应 akshare 的 stock_szse_summary() 函数
//! 数据来源: https://www.szse.cn/market/overview/index.html

use anyhow::{anyhow, Result};
use calamine::{open_workbook_auto_from_rs, Reader};
use chrono::NaiveDate;
use reqwest::Client;
use std::io::Cursor;

use super::common::{parse_number_str, SZSE_REPORT_API};
use crate::models::SzseSummaryRow;

/// 股票类别
pub const SZSE_CATEGORY_STOCK: &str = "股票";

/// 获取深交所市场总貌
pub async fn get_szse_summary(client: &Client, date: NaiveDate) -> Result<Vec<SzseSummaryRow>> {
    let query_date = date.format("%Y-%m-%d").to_string();
    log::debug!("请求深交所市场总貌 URL: {} 日期: {}", SZSE_REPORT_API, query_date);

    let response = client
        .get(SZSE_REPORT_API)
        .query(&[
            ("SHOWTYPE", "xlsx"),
            ("CATALOGID", "1803_sczm"),
            ("TABKEY", "tab1"),
            ("txtQueryDate", query_date.as_str()),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(anyhow!("获取深交所市场总貌失败: {}", response.status()));
    }

    let bytes = response.bytes().await?;
    let grid = read_first_sheet(bytes.as_ref())?;
    parse_szse_summary(&grid)
}

/// 读取 Excel 第一个工作表为字符串表格
pub fn read_first_sheet(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let cursor = Cursor::new(bytes);
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|e| anyhow!("打开Excel文件失败: {}", e))?;

    let sheet_names = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(anyhow!("Excel文件没有工作表"));
    }

    let range = workbook
        .worksheet_range(&sheet_names[0])
        .map_err(|e| anyhow!("读取工作表失败: {}", e))?;

    let rows = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    calamine::Data::String(s) => s.clone(),
                    calamine::Data::Float(f) => format!("{}", f),
                    calamine::Data::Int(i) => format!("{}", i),
                    calamine::Data::Empty => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect();

    Ok(rows)
}

/// 解析深交所市场总貌表格
///
/// 以包含「证券类别」的行作为表头，按列名定位数值列
pub fn parse_szse_summary(grid: &[Vec<String>]) -> Result<Vec<SzseSummaryRow>> {
    let header_idx = grid
        .iter()
        .position(|row| row.iter().any(|c| c.trim() == "证券类别"))
        .ok_or_else(|| anyhow!("深交所市场总貌缺少表头「证券类别」"))?;

    let header = &grid[header_idx];
    let column = |name: &str| header.iter().position(|c| c.trim() == name);

    let category_col = column("证券类别").ok_or_else(|| anyhow!("缺少列: 证券类别"))?;
    let amount_col = column("成交金额").ok_or_else(|| anyhow!("缺少列: 成交金额"))?;
    let count_col = column("数量");
    let total_value_col = column("总市值");
    let float_value_col = column("流通市值");

    let cell = |row: &Vec<String>, idx: Option<usize>| {
        idx.and_then(|i| row.get(i)).and_then(|s| parse_number_str(s))
    };

    let rows = grid
        .iter()
        .skip(header_idx + 1)
        .filter_map(|row| {
            let category = row.get(category_col)?.trim().to_string();
            if category.is_empty() {
                return None;
            }
            Some(SzseSummaryRow {
                category,
                count: cell(row, count_col),
                turnover_amount: cell(row, Some(amount_col)),
                total_market_value: cell(row, total_value_col),
                float_market_value: cell(row, float_value_col),
            })
        })
        .collect();

    Ok(rows)
}

/// 取「股票」类别的成交金额（元）
pub fn stock_turnover_amount(rows: &[SzseSummaryRow]) -> Result<f64> {
    rows.iter()
        .find(|row| row.category == SZSE_CATEGORY_STOCK)
        .and_then(|row| row.turnover_amount)
        .ok_or_else(|| anyhow!("深交所市场总貌缺少股票成交金额"))
}
