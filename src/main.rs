use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use astock_analyst::commands::{market_cmd, stock_cmd};
use astock_analyst::models::ai::AIConfig;
use astock_analyst::services::data_fetcher::DataFetcher;
use astock_analyst::services::market_data::MarketDataService;

/// A股AI投资分析工具：大盘走势/板块热点/个股资金流 + AI 研报
#[derive(Parser)]
#[command(name = "astock", version, about)]
struct Cli {
    /// AI 接口地址（OpenAI 兼容），默认 Gemini 兼容端点
    #[arg(long)]
    base_url: Option<String>,

    /// AI 模型名称
    #[arg(long)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 大盘分析：上证指数走势 + 板块涨幅榜 + AI 宏观研报
    Market,
    /// 个股分析：主力资金流 + AI 主力意图研报
    Stock {
        /// 6 位股票代码，如 600519
        symbol: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut ai_config = AIConfig::from_env();
    if let Some(base_url) = cli.base_url {
        ai_config.base_url = base_url;
    }
    if let Some(model) = cli.model {
        ai_config.model_name = model;
    }

    let fetcher = DataFetcher::new(MarketDataService::new()?);

    match cli.command {
        Commands::Market => market_cmd::run(&fetcher, &ai_config).await,
        Commands::Stock { symbol } => stock_cmd::run(&fetcher, &ai_config, &symbol).await,
    }
}
