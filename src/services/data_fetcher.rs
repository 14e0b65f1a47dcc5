use anyhow::{Result, anyhow};
use chrono::{Duration as ChronoDuration, Local};
use std::time::Duration;

use crate::models::market::{
    FundFlowWindow, IndexSeries, SectorLeaderboard, top_by_change, validate_stock_symbol,
};
use crate::services::market_data::MarketDataSource;
use crate::utils::retry::{RetryPolicy, SourceAttempt, boxed_fetch, retry_with_delay, try_sources};

/// 指数走势回看天数（自然日）
const INDEX_LOOKBACK_DAYS: i64 = 90;
/// 上证指数
const SH_INDEX_SYMBOL: &str = "000001";
const SH_INDEX_SINA_SYMBOL: &str = "sh000001";
/// 涨幅榜取前几名
const LEADERBOARD_SIZE: usize = 10;

/// 带容错编排的数据获取层：
/// 指数走东财->新浪降级，板块走行业->概念降级，资金流走固定重试。
pub struct DataFetcher<S: MarketDataSource> {
    source: S,
}

impl<S: MarketDataSource> DataFetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source_ref(&self) -> &S {
        &self.source
    }

    /// 最近 90 天上证指数收盘序列。
    /// 东财失败后等 1 秒再打新浪，避免连环限流。
    pub async fn get_index_series(&self) -> Result<IndexSeries> {
        let today = Local::now().date_naive();
        let beg = (today - ChronoDuration::days(INDEX_LOOKBACK_DAYS)).format("%Y%m%d").to_string();
        let fin = today.format("%Y%m%d").to_string();

        let chain = vec![
            SourceAttempt::new(
                "东方财富",
                RetryPolicy::once(),
                boxed_fetch(|| {
                    self.source
                        .index_kline_eastmoney(SH_INDEX_SYMBOL, beg.as_str(), fin.as_str())
                }),
            ),
            SourceAttempt::new(
                "新浪财经",
                RetryPolicy::once(),
                boxed_fetch(|| self.source.index_daily_sina(SH_INDEX_SINA_SYMBOL)),
            )
            .with_pause(Duration::from_secs(1)),
        ];

        let (points, idx) = try_sources(chain).await?;
        let label = if idx == 0 { "东方财富" } else { "新浪财经" };
        Ok(IndexSeries::from_unsorted(
            label.to_string(),
            points,
            INDEX_LOOKBACK_DAYS as usize,
        ))
    }

    /// 当日板块涨幅榜 Top 10。
    /// 行业板块接口重试 3 次，仍失败则降级概念板块并在返回类型上标记。
    pub async fn get_sector_leaderboard(&self) -> Result<SectorLeaderboard> {
        let chain = vec![
            SourceAttempt::new(
                "行业板块",
                RetryPolicy::new(3, 500),
                boxed_fetch(|| self.source.industry_board_spot()),
            ),
            SourceAttempt::new(
                "概念板块",
                RetryPolicy::once(),
                boxed_fetch(|| self.source.concept_board_spot()),
            )
            .with_pause(Duration::from_millis(500)),
        ];

        let (rows, idx) = try_sources(chain).await?;
        let top = top_by_change(rows, LEADERBOARD_SIZE);
        Ok(if idx == 0 {
            SectorLeaderboard::Industry(top)
        } else {
            SectorLeaderboard::Concept(top)
        })
    }

    /// 个股最近 5 个交易日的主力资金流。
    /// 代码格式先行校验，不合法直接报错不发请求。
    pub async fn get_fund_flow_window(&self, symbol: &str) -> Result<FundFlowWindow> {
        validate_stock_symbol(symbol)?;

        let history = retry_with_delay(RetryPolicy::new(3, 1000), || {
            self.source.fund_flow_history(symbol)
        })
        .await?;

        if history.is_empty() {
            return Err(anyhow!("未获取到 {} 的资金流历史数据", symbol));
        }
        Ok(FundFlowWindow::from_history(symbol, history))
    }
}
