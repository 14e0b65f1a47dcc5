use anyhow::{Context, Result};

use crate::models::ai::AIConfig;
use crate::services::ai_service::AIService;
use crate::services::data_fetcher::DataFetcher;
use crate::services::market_data::MarketDataSource;
use crate::utils::render;

/// 大盘分析：指数走势 + 板块涨幅榜 + AI 宏观研报。
/// 指数拿不到只降级提示，板块数据是硬依赖，失败直接报错退出。
pub async fn run<S: MarketDataSource>(
    fetcher: &DataFetcher<S>,
    ai_config: &AIConfig,
) -> Result<()> {
    println!("📡 正在获取上证指数 K 线数据...");
    match fetcher.get_index_series().await {
        Ok(series) => {
            println!("\n## 1. 上证指数近期走势\n");
            println!("{}\n", render::index_chart(&series, 50));
        }
        Err(e) => {
            tracing::warn!("指数数据获取失败: {}", e);
            println!("⚠️ 获取上证指数失败，跳过走势图: {}", e);
        }
    }

    println!("📡 正在获取板块涨幅榜...");
    let board = fetcher
        .get_sector_leaderboard()
        .await
        .context("获取板块数据失败（所有接口均已尝试）")?;

    if board.is_substituted() {
        println!("⚠️ 行业板块接口不可用，已切换至概念板块数据作为市场热点分析，请知悉。");
    }
    println!("\n## 2. 今日{}涨幅榜 Top 10\n", board.kind_name());
    println!("{}\n", render::sector_table(&board));

    println!("🤖 正在生成 AI 宏观分析报告...");
    println!("\n## 3. AI 宏观分析报告\n");
    match AIService::generate_market_report(ai_config, &board).await {
        Ok(report) => println!("{}", report),
        Err(e) => println!("❌ AI 调用失败，请检查 Key 或网络。错误信息: {}", e),
    }

    Ok(())
}
