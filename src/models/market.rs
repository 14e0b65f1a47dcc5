use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 指数单日收盘数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
}

/// 清洗后的指数K线序列，按日期升序
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSeries {
    /// 实际命中的数据源名称，展示时随图标注
    pub source: String,
    pub points: Vec<IndexPoint>,
}

impl IndexSeries {
    /// 排序去杂后保留最近 keep_last 个交易日。
    /// 备用接口返回的顺序和区间都不可靠，统一在这里规整。
    pub fn from_unsorted(source: String, mut points: Vec<IndexPoint>, keep_last: usize) -> Self {
        points.sort_by_key(|p| p.date);
        if points.len() > keep_last {
            points.drain(..points.len() - keep_last);
        }
        Self { source, points }
    }
}

/// 板块快照中的一行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorRow {
    pub name: String,
    pub change_pct: f64,
}

/// 板块涨幅榜。行业板块接口不可用时降级为概念板块，
/// 两种形态在类型上区分开，展示层据此提示用户。
#[derive(Debug, Clone)]
pub enum SectorLeaderboard {
    Industry(Vec<SectorRow>),
    Concept(Vec<SectorRow>),
}

impl SectorLeaderboard {
    pub fn rows(&self) -> &[SectorRow] {
        match self {
            SectorLeaderboard::Industry(rows) | SectorLeaderboard::Concept(rows) => rows,
        }
    }

    /// 是否为概念板块兜底数据
    pub fn is_substituted(&self) -> bool {
        matches!(self, SectorLeaderboard::Concept(_))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            SectorLeaderboard::Industry(_) => "行业板块",
            SectorLeaderboard::Concept(_) => "概念板块",
        }
    }
}

/// 按涨跌幅降序取前 n 名，同涨幅保持接口返回的相对顺序
pub fn top_by_change(mut rows: Vec<SectorRow>, n: usize) -> Vec<SectorRow> {
    rows.sort_by(|a, b| {
        b.change_pct
            .partial_cmp(&a.change_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows.truncate(n);
    rows
}

/// 个股单日主力资金流，金额单位为元
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundFlowDay {
    pub date: String,
    pub close: f64,
    pub change_pct: f64,
    pub main_net_inflow: f64,
    pub main_net_pct: f64,
    pub super_large_net: f64,
    pub large_net: f64,
    pub medium_net: f64,
    pub small_net: f64,
}

/// 资金流分析只看最近几个交易日
pub const FUND_FLOW_WINDOW_DAYS: usize = 5;

/// 个股最近几个交易日的资金流窗口，按日期升序
#[derive(Debug, Clone)]
pub struct FundFlowWindow {
    pub symbol: String,
    pub days: Vec<FundFlowDay>,
}

impl FundFlowWindow {
    /// 全量历史 -> 最近 FUND_FLOW_WINDOW_DAYS 个交易日。
    /// 日期为 YYYY-MM-DD 文本，字典序即时间序。
    pub fn from_history(symbol: &str, mut history: Vec<FundFlowDay>) -> Self {
        history.sort_by(|a, b| a.date.cmp(&b.date));
        if history.len() > FUND_FLOW_WINDOW_DAYS {
            history.drain(..history.len() - FUND_FLOW_WINDOW_DAYS);
        }
        Self {
            symbol: symbol.to_string(),
            days: history,
        }
    }
}

/// 个股代码校验：必须是 6 位数字。发请求前先拦住格式错误的输入。
pub fn validate_stock_symbol(symbol: &str) -> Result<()> {
    if symbol.len() == 6 && symbol.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(anyhow!(
            "无效的股票代码「{}」：请输入 6 位数字代码，如 600519",
            symbol
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, n).unwrap()
    }

    fn point(n: u32, close: f64) -> IndexPoint {
        IndexPoint {
            date: day(n),
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_index_series_sorts_and_trims() {
        let points = vec![point(5, 3100.0), point(1, 3000.0), point(3, 3050.0), point(2, 3020.0)];
        let series = IndexSeries::from_unsorted("东方财富".to_string(), points, 3);
        let dates: Vec<NaiveDate> = series.points.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(2), day(3), day(5)]);
        assert_eq!(series.source, "东方财富");
    }

    #[test]
    fn test_index_series_shorter_than_window() {
        let series = IndexSeries::from_unsorted("新浪财经".to_string(), vec![point(1, 3000.0)], 90);
        assert_eq!(series.points.len(), 1);
    }

    #[test]
    fn test_top_by_change_desc_and_truncated() {
        let rows: Vec<SectorRow> = (0..15)
            .map(|i| SectorRow {
                name: format!("板块{}", i),
                change_pct: i as f64 * 0.5,
            })
            .collect();
        let top = top_by_change(rows, 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].name, "板块14");
        assert!(top.windows(2).all(|w| w[0].change_pct >= w[1].change_pct));
    }

    #[test]
    fn test_top_by_change_tie_keeps_input_order() {
        let rows = vec![
            SectorRow { name: "甲".to_string(), change_pct: 2.0 },
            SectorRow { name: "乙".to_string(), change_pct: 2.0 },
            SectorRow { name: "丙".to_string(), change_pct: 3.0 },
        ];
        let top = top_by_change(rows, 3);
        assert_eq!(top[0].name, "丙");
        assert_eq!(top[1].name, "甲");
        assert_eq!(top[2].name, "乙");
    }

    fn flow_day(date: &str) -> FundFlowDay {
        FundFlowDay {
            date: date.to_string(),
            close: 10.0,
            change_pct: 0.0,
            main_net_inflow: 0.0,
            main_net_pct: 0.0,
            super_large_net: 0.0,
            large_net: 0.0,
            medium_net: 0.0,
            small_net: 0.0,
        }
    }

    #[test]
    fn test_fund_flow_window_keeps_last_five_ascending() {
        let history: Vec<FundFlowDay> = (10..20)
            .rev()
            .map(|d| flow_day(&format!("2025-08-{}", d)))
            .collect();
        let window = FundFlowWindow::from_history("600519", history);
        assert_eq!(window.days.len(), FUND_FLOW_WINDOW_DAYS);
        assert_eq!(window.days.first().unwrap().date, "2025-08-15");
        assert_eq!(window.days.last().unwrap().date, "2025-08-19");
    }

    #[test]
    fn test_fund_flow_window_short_history() {
        let history = vec![flow_day("2025-08-28"), flow_day("2025-08-29")];
        let window = FundFlowWindow::from_history("000001", history);
        assert_eq!(window.days.len(), 2);
    }

    #[test]
    fn test_validate_stock_symbol() {
        assert!(validate_stock_symbol("600519").is_ok());
        assert!(validate_stock_symbol("000001").is_ok());
        assert!(validate_stock_symbol("12345").is_err());
        assert!(validate_stock_symbol("1234567").is_err());
        assert!(validate_stock_symbol("12AB56").is_err());
        assert!(validate_stock_symbol("sh600519").is_err());
        assert!(validate_stock_symbol("").is_err());
    }

    #[test]
    fn test_leaderboard_substitution_flag() {
        let industry = SectorLeaderboard::Industry(vec![]);
        let concept = SectorLeaderboard::Concept(vec![]);
        assert!(!industry.is_substituted());
        assert!(concept.is_substituted());
        assert_eq!(industry.kind_name(), "行业板块");
        assert_eq!(concept.kind_name(), "概念板块");
    }
}
