use crate::models::market::{FundFlowWindow, IndexSeries, SectorLeaderboard};

/// 走势图最多输出的行数，数据多时按间隔抽样
const CHART_MAX_ROWS: usize = 30;

/// 收盘价走势的纯文本图：每行一个交易日，收盘价映射为条形长度
pub fn index_chart(series: &IndexSeries, width: usize) -> String {
    if series.points.is_empty() {
        return "（无数据）".to_string();
    }

    let min = series
        .points
        .iter()
        .map(|p| p.close)
        .fold(f64::INFINITY, f64::min);
    let max = series
        .points
        .iter()
        .map(|p| p.close)
        .fold(f64::NEG_INFINITY, f64::max);

    let first = series.points.first().map(|p| p.date).unwrap_or_default();
    let last = series.points.last().map(|p| p.date).unwrap_or_default();
    let mut lines = vec![format!(
        "上证指数收盘价走势 {} ~ {}（数据源：{}）",
        first, last, series.source
    )];

    let step = series.points.len().div_ceil(CHART_MAX_ROWS).max(1);
    let last_idx = series.points.len() - 1;
    for (i, point) in series.points.iter().enumerate() {
        if i % step != 0 && i != last_idx {
            continue;
        }
        let bar_len = if max > min {
            ((point.close - min) / (max - min) * width as f64).round() as usize
        } else {
            width / 2
        };
        lines.push(format!(
            "{} {:>9.2} |{}",
            point.date,
            point.close,
            "█".repeat(bar_len)
        ));
    }

    lines.join("\n")
}

/// 板块涨幅榜文本表格
pub fn sector_table(board: &SectorLeaderboard) -> String {
    let mut lines = vec![format!("排名  {:<10}  涨跌幅", "名称")];
    for (i, row) in board.rows().iter().enumerate() {
        lines.push(format!("{:>4}  {:<10}  {:>6.2}%", i + 1, row.name, row.change_pct));
    }
    lines.join("\n")
}

/// 个股资金流窗口文本表格，金额换算为万元
pub fn fund_flow_table(window: &FundFlowWindow) -> String {
    let mut lines = vec![format!(
        "{:<10}  {:>8}  {:>7}  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}  {:>7}",
        "日期", "收盘价", "涨跌幅", "主力净流入", "超大单", "大单", "中单", "小单", "主力占比"
    )];
    for d in &window.days {
        lines.push(format!(
            "{:<10}  {:>8.2}  {:>6.2}%  {:>9.0}万  {:>9.0}万  {:>9.0}万  {:>9.0}万  {:>9.0}万  {:>6.2}%",
            d.date,
            d.close,
            d.change_pct,
            d.main_net_inflow / 1e4,
            d.super_large_net / 1e4,
            d.large_net / 1e4,
            d.medium_net / 1e4,
            d.small_net / 1e4,
            d.main_net_pct,
        ));
    }
    lines.join("\n")
}
