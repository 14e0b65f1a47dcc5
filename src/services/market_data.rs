use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use serde_json::Value;

use crate::models::market::{FundFlowDay, IndexPoint, SectorRow};
use crate::utils::http::build_market_client;

const EASTMONEY_KLINE_URL: &str = "https://push2his.eastmoney.com/api/qt/stock/kline/get";
const EASTMONEY_CLIST_URL: &str = "https://push2.eastmoney.com/api/qt/clist/get";
const EASTMONEY_FFLOW_URL: &str = "https://push2his.eastmoney.com/api/qt/stock/fflow/daykline/get";
const SINA_KLINE_URL: &str =
    "http://quotes.sina.cn/cn/api/json_v2.php/CN_MarketDataService.getKLineData";

/// 行情数据源抽象：每个数据集一个方法，返回统一清洗后的结构。
/// 测试时可注入假数据源。
#[allow(async_fn_in_trait)]
pub trait MarketDataSource {
    /// 东方财富指数日K，支持日期区间（beg/end 格式 YYYYMMDD）
    async fn index_kline_eastmoney(
        &self,
        symbol: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<IndexPoint>>;

    /// 新浪指数日K（备用接口，无日期筛选，字段名与东财不同）
    async fn index_daily_sina(&self, symbol: &str) -> Result<Vec<IndexPoint>>;

    /// 东方财富行业板块实时快照
    async fn industry_board_spot(&self) -> Result<Vec<SectorRow>>;

    /// 东方财富概念板块实时快照
    async fn concept_board_spot(&self) -> Result<Vec<SectorRow>>;

    /// 个股主力资金流全量历史（接口不支持日期筛选）
    async fn fund_flow_history(&self, symbol: &str) -> Result<Vec<FundFlowDay>>;
}

pub struct MarketDataService {
    client: reqwest::Client,
}

impl MarketDataService {
    pub fn new() -> Result<Self> {
        let client = build_market_client()?;
        Ok(Self { client })
    }

    /// 板块快照通用拉取。
    /// fs 筛选: m:90+t:2 行业板块, m:90+t:3 概念板块；字段: f12=代码, f14=名称, f3=涨跌幅
    async fn fetch_board_spot(&self, fs: &str, kind: &str) -> Result<Vec<SectorRow>> {
        let url = format!(
            "{}?pn=1&pz=100&po=1&np=1&ut=bd1d9ddb04089700cf9c27f6f7426281&fltt=2&invt=2&fid=f3&fs={}&fields=f3,f12,f14",
            EASTMONEY_CLIST_URL, fs
        );

        let resp = self
            .client
            .get(&url)
            .header("Referer", "https://quote.eastmoney.com/")
            .send()
            .await?;
        let json: Value = resp.json().await?;

        let diff = json
            .get("data")
            .and_then(|d| d.get("diff"))
            .and_then(|v| v.as_array())
            .ok_or_else(|| anyhow!("东方财富{}响应缺少 diff 字段", kind))?;

        let mut rows = Vec::with_capacity(diff.len());
        for item in diff {
            let name = match item.get("f14").and_then(|v| v.as_str()) {
                Some(n) => n.to_string(),
                None => continue,
            };
            rows.push(SectorRow {
                name,
                change_pct: get_f64(item, "f3"),
            });
        }

        if rows.is_empty() {
            return Err(anyhow!("东方财富{}数据为空", kind));
        }
        Ok(rows)
    }
}

impl MarketDataSource for MarketDataService {
    async fn index_kline_eastmoney(
        &self,
        symbol: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<IndexPoint>> {
        let url = format!(
            "{}?secid={}&ut=fa5fd1943c7b386f172d6893dbfba10b&fields1=f1,f2,f3,f4,f5,f6&fields2=f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61&klt=101&fqt=0&beg={}&end={}",
            EASTMONEY_KLINE_URL,
            index_secid(symbol),
            start,
            end
        );

        let resp = self
            .client
            .get(&url)
            .header("Referer", "https://quote.eastmoney.com/")
            .send()
            .await?;
        let json: Value = resp.json().await?;

        let klines = json
            .get("data")
            .and_then(|d| d.get("klines"))
            .and_then(|v| v.as_array())
            .ok_or_else(|| anyhow!("东方财富指数K线响应缺少 klines 字段"))?;

        let mut points = Vec::with_capacity(klines.len());
        for row in klines {
            if let Some(s) = row.as_str() {
                if let Some(point) = parse_eastmoney_kline_row(s) {
                    points.push(point);
                }
            }
        }

        if points.is_empty() {
            return Err(anyhow!("东方财富指数K线数据为空"));
        }
        Ok(points)
    }

    async fn index_daily_sina(&self, symbol: &str) -> Result<Vec<IndexPoint>> {
        // 该接口无日期区间参数，多拉一段由调用方截取
        let url = format!("{}?symbol={}&scale=240&ma=no&datalen=180", SINA_KLINE_URL, symbol);
        let resp = self.client.get(&url).send().await?;
        let text = resp.text().await?;

        let items: Vec<SinaKLineItem> = serde_json::from_str(&text)
            .map_err(|e| anyhow!("新浪指数K线解析失败: {}", e))?;

        let points: Vec<IndexPoint> = items
            .into_iter()
            .filter_map(|item| {
                let date = NaiveDate::parse_from_str(&item.day, "%Y-%m-%d").ok()?;
                Some(IndexPoint {
                    date,
                    close: item.close.parse().unwrap_or(0.0),
                    volume: item.volume.parse().unwrap_or(0.0),
                })
            })
            .collect();

        if points.is_empty() {
            return Err(anyhow!("新浪指数K线数据为空"));
        }
        Ok(points)
    }

    async fn industry_board_spot(&self) -> Result<Vec<SectorRow>> {
        self.fetch_board_spot("m:90+t:2+f:!50", "行业板块").await
    }

    async fn concept_board_spot(&self) -> Result<Vec<SectorRow>> {
        self.fetch_board_spot("m:90+t:3+f:!50", "概念板块").await
    }

    async fn fund_flow_history(&self, symbol: &str) -> Result<Vec<FundFlowDay>> {
        let url = format!(
            "{}?lmt=0&klt=101&secid={}&fields1=f1,f2,f3,f7&fields2=f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61,f62,f63,f64,f65&ut=b2884a393a59ad64002292a3e90d46a5",
            EASTMONEY_FFLOW_URL,
            stock_secid(symbol)
        );

        let resp = self
            .client
            .get(&url)
            .header("Referer", "https://data.eastmoney.com/")
            .send()
            .await?;
        let json: Value = resp.json().await?;

        let klines = json
            .get("data")
            .and_then(|d| d.get("klines"))
            .and_then(|v| v.as_array())
            .ok_or_else(|| anyhow!("东方财富资金流响应缺少 klines 字段"))?;

        let mut days = Vec::with_capacity(klines.len());
        for row in klines {
            if let Some(s) = row.as_str() {
                if let Some(day) = parse_fund_flow_row(s) {
                    days.push(day);
                }
            }
        }
        Ok(days)
    }
}

#[derive(serde::Deserialize)]
struct SinaKLineItem {
    day: String,
    close: String,
    volume: String,
}

/// 东财指数K线行: 日期,开盘,收盘,最高,最低,成交量,成交额,...
fn parse_eastmoney_kline_row(row: &str) -> Option<IndexPoint> {
    let parts: Vec<&str> = row.split(',').collect();
    if parts.len() < 6 {
        return None;
    }
    let date = NaiveDate::parse_from_str(parts[0], "%Y-%m-%d").ok()?;
    Some(IndexPoint {
        date,
        close: parse_f64(parts[2]),
        volume: parse_f64(parts[5]),
    })
}

/// 东财资金流行，字段顺序:
/// f51日期,f52主力净额,f53小单净额,f54中单净额,f55大单净额,f56超大单净额,
/// f57主力净占比,f58~f61各类净占比,f62收盘价,f63涨跌幅,...
fn parse_fund_flow_row(row: &str) -> Option<FundFlowDay> {
    let parts: Vec<&str> = row.split(',').collect();
    if parts.len() < 13 {
        return None;
    }
    NaiveDate::parse_from_str(parts[0], "%Y-%m-%d").ok()?;
    Some(FundFlowDay {
        date: parts[0].to_string(),
        main_net_inflow: parse_f64(parts[1]),
        small_net: parse_f64(parts[2]),
        medium_net: parse_f64(parts[3]),
        large_net: parse_f64(parts[4]),
        super_large_net: parse_f64(parts[5]),
        main_net_pct: parse_f64(parts[6]),
        close: parse_f64(parts[11]),
        change_pct: parse_f64(parts[12]),
    })
}

fn parse_f64(s: &str) -> f64 {
    s.trim().parse::<f64>().unwrap_or(0.0)
}

fn get_f64(item: &Value, key: &str) -> f64 {
    item.get(key)
        .and_then(|v| {
            if v.is_f64() {
                v.as_f64()
            } else if v.is_i64() {
                v.as_i64().map(|i| i as f64)
            } else if v.is_string() {
                v.as_str().and_then(|s| s.parse::<f64>().ok())
            } else {
                None
            }
        })
        .unwrap_or(0.0)
}

/// 指数 secid：39 开头为深证系指数，其余走沪市
fn index_secid(symbol: &str) -> String {
    if symbol.starts_with("39") {
        format!("0.{}", symbol)
    } else {
        format!("1.{}", symbol)
    }
}

/// 6位个股代码 -> 东财 secid：6 开头沪市，其余深市
fn stock_secid(code: &str) -> String {
    match code.chars().next() {
        Some('6') => format!("1.{}", code),
        _ => format!("0.{}", code),
    }
}
