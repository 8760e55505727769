//! # 股票報價查詢
//!
//! 依照請求參數組出報價來源的網址，取得回應後解析，再依交易所分組。
//!
//! - `url`：選擇並填入網址模板
//! - `envelope`：報價來源的回應格式
//! - `group`：依交易所代碼分組

use crate::{
    config::App,
    declare::StockData,
    error::GatewayError,
    util::{http::Fetch, text},
};

pub mod envelope;
pub mod group;
pub mod url;

#[cfg(test)]
pub(crate) mod mock;

/// 單次查詢的參數
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockRequest {
    /// 一個或多個以逗號分隔的股票代號，已轉成大寫
    pub symbol: String,
    /// 已轉成大寫且不重複的交易所代碼，至少一個
    pub stock_exchanges: Vec<String>,
    pub sort_order: String,
    pub sort_by: String,
    pub output: String,
}

impl StockRequest {
    /// `stock_exchange` 為逗號分隔的交易所代碼，沒有指定時使用 `default_exchange`
    pub fn new(
        symbol: &str,
        stock_exchange: Option<&str>,
        default_exchange: &str,
    ) -> Result<Self, GatewayError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(GatewayError::MissingSymbol);
        }

        let mut stock_exchanges = stock_exchange.map(text::split_codes).unwrap_or_default();
        if stock_exchanges.is_empty() {
            stock_exchanges = text::split_codes(default_exchange);
        }

        Ok(StockRequest {
            symbol: symbol.to_uppercase(),
            stock_exchanges,
            sort_order: url::SORT_ORDER.to_string(),
            sort_by: url::SORT_BY.to_string(),
            output: url::OUTPUT.to_string(),
        })
    }

    pub fn with_sort_order(mut self, sort_order: Option<&str>) -> Self {
        if let Some(sort_order) = sort_order {
            self.sort_order = sort_order.to_string();
        }
        self
    }

    pub fn with_sort_by(mut self, sort_by: Option<&str>) -> Self {
        if let Some(sort_by) = sort_by {
            self.sort_by = sort_by.to_string();
        }
        self
    }

    pub fn with_output(mut self, output: Option<&str>) -> Self {
        if let Some(output) = output {
            self.output = output.to_string();
        }
        self
    }
}

/// Fetches the quotes for `request` and groups them by exchange.
///
/// # Errors
///
/// Fetch and decode failures are passed through unchanged.
/// `GatewayError::NoResult` is returned when none of the requested exchanges
/// has a matching quote.
pub async fn get_data(
    app: &App,
    fetcher: &dyn Fetch,
    request: &StockRequest,
) -> Result<Vec<StockData>, GatewayError> {
    let url = url::trading_url(
        &app.upstream,
        &request.symbol,
        &request.sort_order,
        &request.sort_by,
        &request.output,
    );

    let body = fetcher.get_bytes(&url).await?;
    let response = envelope::parse(&body)?;
    let groups = group::group_by_exchange(&response.data, &request.stock_exchanges);

    if groups.is_empty() {
        return Err(GatewayError::NoResult);
    }

    Ok(groups)
}
