pub mod market_cmd;
pub mod stock_cmd;
