use anyhow::Result;

use crate::models::ai::AIConfig;
use crate::services::ai_service::AIService;
use crate::services::data_fetcher::DataFetcher;
use crate::services::market_data::MarketDataSource;
use crate::utils::render;

/// 个股分析：最近 5 个交易日资金流 + AI 主力意图研报。
/// 代码非法或数据拿不到都算失败，AI 挂了只提示不影响退出码。
pub async fn run<S: MarketDataSource>(
    fetcher: &DataFetcher<S>,
    ai_config: &AIConfig,
    symbol: &str,
) -> Result<()> {
    println!("📡 正在获取 {} 的主力资金流数据...", symbol);
    let window = fetcher.get_fund_flow_window(symbol).await?;

    println!("\n## 1. {} 最近 5 个交易日主力资金流\n", symbol);
    println!("{}\n", render::fund_flow_table(&window));

    println!("🤖 正在生成 AI 主力意图分析报告...");
    println!("\n## 2. AI 主力意图分析报告\n");
    match AIService::generate_stock_report(ai_config, &window).await {
        Ok(report) => println!("{}", report),
        Err(e) => println!("❌ AI 调用失败: 错误信息: {}", e),
    }

    Ok(())
}
