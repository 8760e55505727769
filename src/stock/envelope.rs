use serde::{Deserialize, Deserializer, Serialize};

use crate::{declare::Stock, error::GatewayError};

/// 報價來源回傳的單筆股票資料
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TradingData {
    #[serde(deserialize_with = "null_as_default")]
    pub symbol: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(deserialize_with = "null_as_default")]
    pub price: String,
    #[serde(deserialize_with = "null_as_default")]
    pub price_open: String,
    #[serde(deserialize_with = "null_as_default")]
    pub day_high: String,
    #[serde(deserialize_with = "null_as_default")]
    pub day_low: String,
    #[serde(rename = "52_week_high", deserialize_with = "null_as_default")]
    pub fifty_two_week_high: String,
    #[serde(rename = "52_week_low", deserialize_with = "null_as_default")]
    pub fifty_two_week_low: String,
    #[serde(deserialize_with = "null_as_default")]
    pub day_change: String,
    #[serde(deserialize_with = "null_as_default")]
    pub change_pct: String,
    #[serde(deserialize_with = "null_as_default")]
    pub close_yesterday: String,
    #[serde(deserialize_with = "null_as_default")]
    pub market_cap: String,
    #[serde(deserialize_with = "null_as_default")]
    pub volume: String,
    #[serde(deserialize_with = "null_as_default")]
    pub volume_avg: String,
    #[serde(deserialize_with = "null_as_default")]
    pub shares: String,
    #[serde(deserialize_with = "null_as_default")]
    pub stock_exchange_long: String,
    #[serde(deserialize_with = "null_as_default")]
    pub stock_exchange_short: String,
    #[serde(deserialize_with = "null_as_default")]
    pub timezone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub timezone_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub gmt_offset: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_trade_time: String,
}

impl From<&TradingData> for Stock {
    fn from(d: &TradingData) -> Self {
        Stock {
            symbol: d.symbol.clone(),
            name: d.name.clone(),
            price: d.price.clone(),
            close_yesterday: d.close_yesterday.clone(),
            currency: d.currency.clone(),
            market_cap: d.market_cap.clone(),
            volume: d.volume.clone(),
            timezone: d.timezone.clone(),
            timezone_name: d.timezone_name.clone(),
            gmt_offset: d.gmt_offset.clone(),
            last_trade_time: d.last_trade_time.clone(),
        }
    }
}

/// 報價來源的回應本體
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TradingResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub symbols_requested: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub symbols_returned: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub data: Vec<TradingData>,
}

/// 將 JSON 的 null 視為型別的預設值
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes the upstream body.
///
/// An empty `data` list is a valid response.
pub fn parse(body: &[u8]) -> Result<TradingResponse, GatewayError> {
    serde_json::from_slice::<TradingResponse>(body).map_err(|why| {
        GatewayError::DecodeError(format!(
            "something went wrong while processing trading data: {}",
            why
        ))
    })
}
