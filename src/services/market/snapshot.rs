//! 单日市场快照汇总
//!
//! 依次请求各数据源，每一步独立容错：失败的步骤记录原因，
//! 对应字段保持 0 或空值，不影响其余步骤

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use reqwest::Client;
use std::fmt;

use super::common::HUNDRED_MILLION;
use super::sse::{SSE_ITEM_AMOUNT, SSE_ITEM_VOLUME};
use super::{eastmoney, sse, szse};
use crate::config::MarketConfig;
use crate::models::{
    ConceptFundFlow, LimitDownStock, LimitUpStock, MarketSnapshot, SseDealDaily, SzseSummaryRow,
    TopicFlow,
};

/// 行情数据源
#[allow(async_fn_in_trait)]
pub trait MarketDataSource {
    /// 上交所每日成交概况
    async fn sse_deal_daily(&self, date: NaiveDate) -> Result<SseDealDaily>;
    /// 深交所市场总貌
    async fn szse_summary(&self, date: NaiveDate) -> Result<Vec<SzseSummaryRow>>;
    /// 涨停股池
    async fn limit_up_pool(&self, date: NaiveDate) -> Result<Vec<LimitUpStock>>;
    /// 跌停股池
    async fn limit_down_pool(&self, date: NaiveDate) -> Result<Vec<LimitDownStock>>;
    /// 概念资金流排名
    async fn concept_fund_flow(&self, date: NaiveDate) -> Result<Vec<ConceptFundFlow>>;
}

/// 基于 HTTP 的行情数据服务
pub struct MarketDataService {
    client: Client,
    concept_page_size: usize,
}

impl MarketDataService {
    pub fn new(client: Client, concept_page_size: usize) -> Self {
        Self {
            client,
            concept_page_size,
        }
    }
}

impl MarketDataSource for MarketDataService {
    async fn sse_deal_daily(&self, date: NaiveDate) -> Result<SseDealDaily> {
        sse::get_sse_deal_daily(&self.client, date).await
    }

    async fn szse_summary(&self, date: NaiveDate) -> Result<Vec<SzseSummaryRow>> {
        szse::get_szse_summary(&self.client, date).await
    }

    async fn limit_up_pool(&self, date: NaiveDate) -> Result<Vec<LimitUpStock>> {
        eastmoney::get_limit_up_pool(&self.client, date).await
    }

    async fn limit_down_pool(&self, date: NaiveDate) -> Result<Vec<LimitDownStock>> {
        eastmoney::get_limit_down_pool(&self.client, date).await
    }

    /// 接口只提供实时排名，日期由 [`collect_snapshot`] 把关
    async fn concept_fund_flow(&self, _date: NaiveDate) -> Result<Vec<ConceptFundFlow>> {
        eastmoney::get_concept_fund_flow(&self.client, self.concept_page_size).await
    }
}

/// 采集步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotStep {
    Shanghai,
    Shenzhen,
    LimitUp,
    LimitDown,
    Topics,
}

impl fmt::Display for SnapshotStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SnapshotStep::Shanghai => "上交所成交概况",
            SnapshotStep::Shenzhen => "深交所市场总貌",
            SnapshotStep::LimitUp => "涨停股池",
            SnapshotStep::LimitDown => "跌停股池",
            SnapshotStep::Topics => "概念资金流",
        };
        f.write_str(name)
    }
}

/// 单个步骤的失败记录
#[derive(Debug, Clone)]
pub struct FieldFailure {
    pub step: SnapshotStep,
    pub message: String,
}

/// 采集结果：快照与失败记录
#[derive(Debug, Clone)]
pub struct SnapshotOutcome {
    pub snapshot: MarketSnapshot,
    pub failures: Vec<FieldFailure>,
    /// 实际尝试的步骤数
    pub attempted: usize,
}

impl SnapshotOutcome {
    /// 所有步骤都失败，没有任何数据
    pub fn nothing_gathered(&self) -> bool {
        self.attempted > 0 && self.failures.len() >= self.attempted
    }

    /// 汇总为致命错误
    pub fn into_result(self) -> Result<MarketSnapshot> {
        if self.nothing_gathered() {
            let reasons: Vec<String> = self
                .failures
                .iter()
                .map(|f| format!("{}: {}", f.step, f.message))
                .collect();
            return Err(anyhow!("所有数据源均获取失败（{}）", reasons.join("；")));
        }
        Ok(self.snapshot)
    }
}

/// 记录失败并返回 None
fn tolerate<T>(step: SnapshotStep, result: Result<T>, failures: &mut Vec<FieldFailure>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("{}获取失败: {}", step, e);
            failures.push(FieldFailure {
                step,
                message: e.to_string(),
            });
            None
        }
    }
}

/// 采集单日市场快照
///
/// `live_date` 为当前最近交易日；概念资金流只有实时数据，
/// 查询其他日期时跳过该步骤
pub async fn collect_snapshot<S: MarketDataSource>(
    source: &S,
    date: NaiveDate,
    live_date: NaiveDate,
    config: &MarketConfig,
) -> SnapshotOutcome {
    let mut failures = Vec::new();
    let mut attempted = 0;
    let mut snapshot = MarketSnapshot::empty(date);

    // 上交所：成交金额、成交量（亿元 / 亿股）
    attempted += 1;
    let shanghai = tolerate(
        SnapshotStep::Shanghai,
        source.sse_deal_daily(date).await.and_then(|daily| {
            let amount = daily
                .stock_value(SSE_ITEM_AMOUNT)
                .ok_or_else(|| anyhow!("缺少{}行", SSE_ITEM_AMOUNT))?;
            let volume = daily.stock_value(SSE_ITEM_VOLUME).unwrap_or(0.0);
            Ok((amount * HUNDRED_MILLION, volume * HUNDRED_MILLION))
        }),
        &mut failures,
    );
    if let Some((amount, volume)) = shanghai {
        log::info!("上交所 {}: 成交额 {:.2} 亿", date, amount / HUNDRED_MILLION);
        snapshot.total_turnover_amount += amount;
        snapshot.total_turnover_volume = volume;
    }

    // 深交所：股票类别成交金额（元）
    attempted += 1;
    let shenzhen = tolerate(
        SnapshotStep::Shenzhen,
        source
            .szse_summary(date)
            .await
            .and_then(|rows| szse::stock_turnover_amount(&rows)),
        &mut failures,
    );
    match shenzhen {
        Some(amount) => {
            log::info!("深交所 {}: 成交额 {:.2} 亿", date, amount / HUNDRED_MILLION);
            snapshot.total_turnover_amount += amount;
        }
        None if shanghai.is_some() => log::warn!("总成交额仅包含沪市"),
        None => {}
    }

    // 涨停池：家数与最高连板
    attempted += 1;
    if let Some(pool) = tolerate(SnapshotStep::LimitUp, source.limit_up_pool(date).await, &mut failures) {
        snapshot.limit_up_count = pool.len();
        snapshot.max_consecutive_limit_up = Some(
            pool.iter()
                .filter_map(|s| s.consecutive_boards)
                .max()
                .unwrap_or(0),
        );
        log::info!("涨停池 {}: {} 条", date, pool.len());
    }

    // 跌停池
    attempted += 1;
    if let Some(pool) = tolerate(SnapshotStep::LimitDown, source.limit_down_pool(date).await, &mut failures) {
        snapshot.limit_down_count = pool.len();
        log::info!("跌停池 {}: {} 条", date, pool.len());
    }

    // 概念资金流：取前 N 名
    if config.topics_enabled && date != live_date {
        log::warn!("{}只有 {} 的实时排名，跳过 {} 的题材数据", SnapshotStep::Topics, live_date, date);
    } else if config.topics_enabled {
        attempted += 1;
        if let Some(flows) = tolerate(SnapshotStep::Topics, source.concept_fund_flow(date).await, &mut failures) {
            snapshot.topics = flows
                .iter()
                .take(config.topic_count)
                .map(TopicFlow::from_concept)
                .collect();
            log::info!("概念资金流: {} 条，取前 {} 条", flows.len(), snapshot.topics.len());
        }
    }

    SnapshotOutcome {
        snapshot,
        failures,
        attempted,
    }
}

/// 测试用的内存数据源
#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use crate::models::SseDealRow;

    /// 内存数据源，None 表示该接口调用失败
    #[derive(Default)]
    pub(crate) struct FakeSource {
        pub sse: Option<SseDealDaily>,
        pub szse: Option<Vec<SzseSummaryRow>>,
        pub limit_up: Option<Vec<LimitUpStock>>,
        pub limit_down: Option<Vec<LimitDownStock>>,
        pub concepts: Option<Vec<ConceptFundFlow>>,
    }

    fn fail<T>(name: &str) -> Result<T> {
        Err(anyhow!("模拟 {} 请求失败", name))
    }

    impl MarketDataSource for FakeSource {
        async fn sse_deal_daily(&self, _date: NaiveDate) -> Result<SseDealDaily> {
            self.sse.clone().map_or_else(|| fail("sse"), Ok)
        }
        async fn szse_summary(&self, _date: NaiveDate) -> Result<Vec<SzseSummaryRow>> {
            self.szse.clone().map_or_else(|| fail("szse"), Ok)
        }
        async fn limit_up_pool(&self, _date: NaiveDate) -> Result<Vec<LimitUpStock>> {
            self.limit_up.clone().map_or_else(|| fail("zt"), Ok)
        }
        async fn limit_down_pool(&self, _date: NaiveDate) -> Result<Vec<LimitDownStock>> {
            self.limit_down.clone().map_or_else(|| fail("dt"), Ok)
        }
        async fn concept_fund_flow(&self, _date: NaiveDate) -> Result<Vec<ConceptFundFlow>> {
            self.concepts.clone().map_or_else(|| fail("concept"), Ok)
        }
    }

    pub(crate) fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn sse_daily(amount: f64, volume: f64) -> SseDealDaily {
        let row = |item: &str, value: f64| SseDealRow {
            item: item.to_string(),
            stock: Some(value),
            main_board_a: None,
            main_board_b: None,
            star_market: None,
            repurchase: None,
        };
        SseDealDaily {
            rows: vec![row("成交金额", amount), row("成交量", volume)],
        }
    }

    fn szse_rows(amount: f64) -> Vec<SzseSummaryRow> {
        vec![
            SzseSummaryRow {
                category: "股票".to_string(),
                count: Some(2852.0),
                turnover_amount: Some(amount),
                total_market_value: None,
                float_market_value: None,
            },
            SzseSummaryRow {
                category: "基金".to_string(),
                count: Some(780.0),
                turnover_amount: Some(1.0),
                total_market_value: None,
                float_market_value: None,
            },
        ]
    }

    fn limit_up(code: &str, boards: Option<u32>) -> LimitUpStock {
        LimitUpStock {
            code: code.to_string(),
            name: format!("股票{}", code),
            change_percent: 10.0,
            latest_price: 10.0,
            amount: 1.0e8,
            consecutive_boards: boards,
            industry: "银行".to_string(),
        }
    }

    fn limit_down(code: &str) -> LimitDownStock {
        LimitDownStock {
            code: code.to_string(),
            name: format!("股票{}", code),
            change_percent: -10.0,
            latest_price: 5.0,
            amount: 1.0e7,
            consecutive_days: Some(1),
            industry: "化工".to_string(),
        }
    }

    fn concept(name: &str, price: Option<f64>) -> ConceptFundFlow {
        ConceptFundFlow {
            name: name.to_string(),
            latest_price: price,
            change_percent: 2.5,
            main_net_inflow: Some(1.0e9),
            main_net_inflow_ratio: Some(3.0),
        }
    }

    pub(crate) fn full_source() -> FakeSource {
        FakeSource {
            sse: Some(sse_daily(1.0, 2.0)),
            szse: Some(szse_rows(50_000_000.0)),
            limit_up: Some(vec![limit_up("600000", Some(1)), limit_up("000001", Some(5)), limit_up("300001", None)]),
            limit_down: Some(vec![limit_down("002001"), limit_down("002002")]),
            concepts: Some((0..15).map(|i| concept(&format!("题材{}", i), Some(1000.0))).collect()),
        }
    }
}
