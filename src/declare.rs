use serde::{Deserialize, Serialize};

/// 單一股票的最新報價
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Stock {
    pub symbol: String,
    pub name: String,
    pub price: String,
    pub close_yesterday: String,
    pub currency: String,
    pub market_cap: String,
    pub volume: String,
    pub timezone: String,
    pub timezone_name: String,
    pub gmt_offset: String,
    pub last_trade_time: String,
}

/// 同一交易所的報價，`stocks` 不會是空的
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StockData {
    pub stock_exchange: String,
    pub stocks: Vec<Stock>,
}
