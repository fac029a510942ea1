use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "market-digest")]
#[command(about = "A股市场快照与推文汇总", long_about = None)]
pub struct Cli {
    /// 配置文件路径（JSON）
    #[arg(short, long, global = true, env = "MARKET_DIGEST_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 输出单日市场快照（成交额、涨跌停、题材资金流）
    Market {
        /// 交易日期，YYYYMMDD 或 YYYY-MM-DD，默认最近交易日
        #[arg(short, long)]
        date: Option<String>,
        /// 不采集概念资金流
        #[arg(long)]
        no_topics: bool,
    },
    /// 输出关注用户的近期推文汇总
    Feed {
        /// 关注的用户，可重复指定，覆盖配置
        #[arg(long = "handle")]
        handles: Vec<String>,
        /// 时间窗口（小时）
        #[arg(long)]
        hours: Option<i64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_market_command() {
        let cli = Cli::try_parse_from(["market-digest", "market", "--date", "20241216", "--no-topics"]).unwrap();
        match cli.command {
            Commands::Market { date, no_topics } => {
                assert_eq!(date.as_deref(), Some("20241216"));
                assert!(no_topics);
            }
            _ => panic!("应解析为 market 子命令"),
        }
    }

    #[test]
    fn test_parse_feed_command() {
        let cli = Cli::try_parse_from([
            "market-digest", "--config", "cfg.json", "feed", "--handle", "dotey", "--handle", "vista8", "--hours", "12",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
        match cli.command {
            Commands::Feed { handles, hours } => {
                assert_eq!(handles, vec!["dotey", "vista8"]);
                assert_eq!(hours, Some(12));
            }
            _ => panic!("应解析为 feed 子命令"),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["market-digest"]).is_err());
    }
}
