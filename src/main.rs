//! 市场快照与推文汇总命令行
//!
//! 结构化结果写入标准输出，日志与诊断信息写入标准错误

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use env_logger::Env;
use std::io::Write;
use std::process::ExitCode;

use market_digest::cli::{Cli, Commands};
use market_digest::config::AppConfig;
use market_digest::handlers;
use market_digest::services::market::parse_trade_date;

/// 程序入口
///
/// 任何未被局部容错吸收的错误都输出 `ERROR: <message>` 并以非零状态退出
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            log::error!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_env_overrides();

    // 初始化日志系统，RUST_LOG 优先，其次使用配置中的级别
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));
    log::info!("配置来源: {}", config.source_label());

    let output = match cli.command {
        Commands::Market { date, no_topics } => {
            let date = date.as_deref().map(parse_trade_date).transpose()?;
            if no_topics {
                config.market.topics_enabled = false;
            }
            handlers::market::run(&config, date).await?
        }
        Commands::Feed { handles, hours } => {
            if !handles.is_empty() {
                config.feed.handles = handles;
            }
            if let Some(hours) = hours {
                config.feed.window_hours = hours;
            }
            handlers::feed::run(&config, Utc::now()).await?
        }
    };

    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    lock.write_all(output.as_bytes())?;
    lock.flush()?;
    Ok(())
}
