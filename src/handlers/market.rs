//! 行情快照输出
//!
//! 将快照渲染为逐行的 `KEY:value` 文本，供外部调用方解析

use anyhow::Result;
use chrono::NaiveDate;

use crate::config::AppConfig;
use crate::models::{MarketSnapshot, TopicFlow};
use crate::services::market::{
    beijing_today, build_client, collect_snapshot, latest_trading_day, MarketDataService,
};

/// 采集快照并生成报告文本
///
/// 未指定日期时取北京时间今天，周末回退到周五
pub async fn run(config: &AppConfig, date: Option<NaiveDate>) -> Result<String> {
    let live_date = latest_trading_day(beijing_today());
    let trade_date = date.unwrap_or(live_date);
    log::info!("获取日期: {}", trade_date.format("%Y%m%d"));

    let client = build_client(&config.api)?;
    let service = MarketDataService::new(client, config.market.concept_page_size);

    // 各步骤的失败已在采集时记录
    let outcome = collect_snapshot(&service, trade_date, live_date, &config.market).await;
    let snapshot = outcome.into_result()?;
    if !snapshot.is_complete() {
        log::warn!("数据不完整：成交额或成交量为0");
    }

    Ok(render_report(&snapshot))
}

/// 题材名称中的分隔符和换行会破坏行格式
fn sanitize_field(s: &str) -> String {
    s.replace('|', "/").replace(['\r', '\n'], " ")
}

fn render_topic(topic: &TopicFlow) -> String {
    let close = topic
        .close_price
        .map(|p| p.to_string())
        .unwrap_or_default();
    format!(
        "{}|{}|{}|{}",
        topic.code,
        sanitize_field(&topic.name),
        topic.change_percent,
        close
    )
}

/// 渲染报告
pub fn render_report(snapshot: &MarketSnapshot) -> String {
    let mut lines = vec![
        "SUCCESS".to_string(),
        format!("TOTAL_AMOUNT:{}", snapshot.total_turnover_amount.round() as i64),
        format!("TOTAL_VOLUME:{}", snapshot.total_turnover_volume.round() as i64),
        format!("LIMIT_UP:{}", snapshot.limit_up_count),
        format!("LIMIT_DOWN:{}", snapshot.limit_down_count),
    ];
    if let Some(max) = snapshot.max_consecutive_limit_up {
        lines.push(format!("MAX_CONTINUOUS_LIMIT:{}", max));
    }

    if !snapshot.topics.is_empty() {
        lines.push("TOPICS_START".to_string());
        lines.extend(snapshot.topics.iter().map(render_topic));
        lines.push("TOPICS_END".to_string());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
