pub mod ai_service;
pub mod data_fetcher;
pub mod market_data;
