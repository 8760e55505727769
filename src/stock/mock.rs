use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::{config::App, error::GatewayError, util::http::Fetch};

/// 回傳固定結果並記錄請求網址的 `Fetch`
pub struct MockFetcher {
    result: Result<Vec<u8>, GatewayError>,
    urls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn ok(body: Vec<u8>) -> Self {
        MockFetcher {
            result: Ok(body),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn err(why: GatewayError) -> Self {
        MockFetcher {
            result: Err(why),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Fetch for MockFetcher {
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, GatewayError> {
        if let Ok(mut urls) = self.urls.lock() {
            urls.push(url.to_string());
        }
        self.result.clone()
    }
}

pub fn app() -> App {
    App::from_json(
        r#"{
            "upstream": {
                "url": "http://upstream.test/stock?symbol=%s",
                "url_with_sorting": "http://upstream.test/stock?symbol=%s&api_token=%s&sort_order=%s",
                "url_with_sorting_and_output": "http://upstream.test/stock?symbol=%s&api_token=%s&sort_by=%s&output=%s",
                "api_token": "demo"
            }
        }"#,
    )
    .expect("test config")
}

/// 以 (股票代號, 交易所) 組出報價來源的回應
pub fn envelope(records: &[(&str, &str)]) -> Vec<u8> {
    let data: Vec<_> = records
        .iter()
        .map(|(symbol, exchange)| {
            json!({
                "symbol": symbol,
                "name": format!("{} Inc.", symbol),
                "currency": "USD",
                "price": "100.00",
                "price_open": "99.00",
                "day_high": "101.00",
                "day_low": "98.50",
                "52_week_high": "120.00",
                "52_week_low": "80.00",
                "day_change": "1.00",
                "change_pct": "1.01",
                "close_yesterday": "99.00",
                "market_cap": "1000000",
                "volume": "12345",
                "volume_avg": "23456",
                "shares": "10000",
                "stock_exchange_long": format!("{} Stock Exchange", exchange),
                "stock_exchange_short": exchange,
                "timezone": "EDT",
                "timezone_name": "America/New_York",
                "gmt_offset": "-14400",
                "last_trade_time": "2019-05-31 16:00:01"
            })
        })
        .collect();

    json!({
        "symbols_requested": records.len(),
        "symbols_returned": records.len(),
        "data": data,
    })
    .to_string()
    .into_bytes()
}
