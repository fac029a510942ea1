//! 行情数据模型
//!
//! 定义交易所成交概况、涨跌停池、概念资金流以及汇总快照的数据结构

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 上交所每日概况中的一行（按统计项划分）
///
/// 金额类单位为亿元，成交量单位为亿股
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SseDealRow {
    /// 单日情况（统计项名称，如 成交金额、成交量）
    pub item: String,
    /// 股票（合计）
    pub stock: Option<f64>,
    /// 主板A
    pub main_board_a: Option<f64>,
    /// 主板B
    pub main_board_b: Option<f64>,
    /// 科创板
    pub star_market: Option<f64>,
    /// 股票回购
    pub repurchase: Option<f64>,
}

/// 上交所每日成交概况
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SseDealDaily {
    pub rows: Vec<SseDealRow>,
}

impl SseDealDaily {
    /// 按统计项名称查找「股票」列的数值
    pub fn stock_value(&self, item: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.item == item)
            .and_then(|row| row.stock)
    }
}

/// 深交所市场总貌中的一行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SzseSummaryRow {
    /// 证券类别
    pub category: String,
    /// 数量
    pub count: Option<f64>,
    /// 成交金额（元）
    pub turnover_amount: Option<f64>,
    /// 总市值（元）
    pub total_market_value: Option<f64>,
    /// 流通市值（元）
    pub float_market_value: Option<f64>,
}

/// 涨停池个股
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitUpStock {
    pub code: String,
    pub name: String,
    /// 涨跌幅（百分比）
    pub change_percent: f64,
    /// 最新价
    pub latest_price: f64,
    /// 成交额（元）
    pub amount: f64,
    /// 连板数
    pub consecutive_boards: Option<u32>,
    /// 所属行业
    pub industry: String,
}

/// 跌停池个股
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitDownStock {
    pub code: String,
    pub name: String,
    pub change_percent: f64,
    pub latest_price: f64,
    pub amount: f64,
    /// 连续跌停天数
    pub consecutive_days: Option<u32>,
    pub industry: String,
}

/// 概念板块资金流排名中的一行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptFundFlow {
    /// 板块名称
    pub name: String,
    /// 最新价（停牌或缺失时为空）
    pub latest_price: Option<f64>,
    /// 涨跌幅（百分比）
    pub change_percent: f64,
    /// 主力净流入（元）
    pub main_net_inflow: Option<f64>,
    /// 主力净流入占比（百分比）
    pub main_net_inflow_ratio: Option<f64>,
}

/// 题材资金流向（输出用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicFlow {
    /// 由名称摘要得到的 8 位短代码
    pub code: String,
    pub name: String,
    pub change_percent: f64,
    pub close_price: Option<f64>,
}

impl TopicFlow {
    pub fn from_concept(concept: &ConceptFundFlow) -> Self {
        Self {
            code: topic_code(&concept.name),
            name: concept.name.clone(),
            change_percent: concept.change_percent,
            close_price: concept.latest_price.filter(|p| p.is_finite() && *p != 0.0),
        }
    }
}

/// 由题材名称生成短代码：SHA-256 摘要的前 8 位十六进制字符
///
/// 数据源不提供稳定的短代码，同名题材总是得到相同代码
pub fn topic_code(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    hex::encode(digest)[..8].to_string()
}

/// 单日市场快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// 交易日期
    pub trade_date: NaiveDate,
    /// 两市总成交额（元）
    pub total_turnover_amount: f64,
    /// 成交量（股，仅沪市）
    pub total_turnover_volume: f64,
    /// 涨停家数
    pub limit_up_count: usize,
    /// 跌停家数
    pub limit_down_count: usize,
    /// 最高连板数（涨停池获取失败时为空）
    pub max_consecutive_limit_up: Option<u32>,
    /// 题材资金流排名
    pub topics: Vec<TopicFlow>,
}

impl MarketSnapshot {
    pub fn empty(trade_date: NaiveDate) -> Self {
        Self {
            trade_date,
            total_turnover_amount: 0.0,
            total_turnover_volume: 0.0,
            limit_up_count: 0,
            limit_down_count: 0,
            max_consecutive_limit_up: None,
            topics: Vec::new(),
        }
    }

    /// 成交额与成交量都不为 0 时视为完整数据
    pub fn is_complete(&self) -> bool {
        self.total_turnover_amount > 0.0 && self.total_turnover_volume > 0.0
    }
}
