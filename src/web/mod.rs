use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::{
    config::App,
    error::{GatewayError, ERROR_MESSAGE_PREFIX},
    logging,
    stock::{self, StockRequest},
    util::http::Fetch,
};

const JSON_INDENT: &[u8] = b"\t";

/// 所有請求共用的唯讀狀態
pub struct AppState {
    pub app: Arc<App>,
    pub fetcher: Arc<dyn Fetch>,
}

impl AppState {
    pub fn new(app: Arc<App>, fetcher: Arc<dyn Fetch>) -> Self {
        AppState { app, fetcher }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct StockQuery {
    /// 逗號分隔的交易所代碼
    pub stock_exchange: Option<String>,
    pub sort_order: Option<String>,
    pub sort_by: Option<String>,
    pub output: Option<String>,
}

impl StockQuery {
    /// 同一個參數出現多次時只取第一個值，未知的參數忽略
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = StockQuery::default();

        for (key, value) in pairs {
            let slot = match key.as_str() {
                "stock_exchange" => &mut query.stock_exchange,
                "sort_order" => &mut query.sort_order,
                "sort_by" => &mut query.sort_by,
                "output" => &mut query.output,
                _ => continue,
            };

            if slot.is_none() {
                *slot = Some(value);
            }
        }

        query
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/favicon.ico", get(|| async { StatusCode::NOT_FOUND }))
        .route("/api/v1/stocks", get(missing_symbol))
        .route("/api/v1/stocks/", get(missing_symbol))
        .route("/api/v1/stocks/{symbol}", get(stocks))
        .with_state(state)
}

async fn index() -> &'static str {
    "I am running...\n"
}

async fn missing_symbol() -> GatewayError {
    failure("", GatewayError::MissingSymbol)
}

/// 回傳指定股票在各交易所的報價
async fn stocks(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, GatewayError> {
    let query = StockQuery::from_pairs(pairs);
    let request = StockRequest::new(
        &symbol,
        query.stock_exchange.as_deref(),
        &state.app.system.default_stock_exchange,
    )
    .map_err(|why| failure(&symbol, why))?
    .with_sort_order(query.sort_order.as_deref())
    .with_sort_by(query.sort_by.as_deref())
    .with_output(query.output.as_deref());
    logging::debug_file_async(format!("{:?}", request));

    let groups = stock::get_data(&state.app, state.fetcher.as_ref(), &request)
        .await
        .map_err(|why| failure(&symbol, why))?;

    logging::info_file_async(format!(
        "{} {:?} => {} group(s)",
        request.symbol,
        request.stock_exchanges,
        groups.len()
    ));

    to_pretty_json(&groups).map_err(|why| failure(&symbol, why))
}

/// 呼叫端的錯誤記為 warn，其餘記為 error
fn failure(symbol: &str, why: GatewayError) -> GatewayError {
    let msg = format!("{}{} ({})", ERROR_MESSAGE_PREFIX, why, symbol);
    if why.status_code().is_client_error() {
        logging::warn_file_async(msg);
    } else {
        logging::error_file_async(msg);
    }
    why
}

/// 以 tab 縮排輸出 JSON
fn to_pretty_json<T: Serialize>(value: &T) -> Result<Response, GatewayError> {
    let mut body = Vec::with_capacity(1024);
    let mut ser = Serializer::with_formatter(&mut body, PrettyFormatter::with_indent(JSON_INDENT));
    value
        .serialize(&mut ser)
        .map_err(|why| GatewayError::DecodeError(why.to_string()))?;
    body.push(b'\n');

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}
