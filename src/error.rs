use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// 回應錯誤時訊息的前綴
pub const ERROR_MESSAGE_PREFIX: &str = "Unable to retrieve data: ";

/// 報價閘道的錯誤種類
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// 設定檔不存在、無法解析或缺少必要欄位，只會發生在啟動階段
    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),
    /// 請求路徑中沒有股票代號
    #[error("invalid parameter")]
    MissingSymbol,
    /// 無法連線到報價來源（連線被拒、逾時、DNS 等）
    #[error("failed to access trading API: {0}")]
    UpstreamUnreachable(String),
    /// 報價來源回應了非 200 的狀態碼
    #[error("unable to retrieve data from the given url {status_code}")]
    UpstreamError { status_code: u16 },
    /// 報價來源回傳的內容無法解析
    #[error("unable to process stock(s) data {0}")]
    DecodeError(String),
    /// 指定的交易所中沒有任何符合的報價
    #[error("no result")]
    NoResult,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MissingSymbol | GatewayError::NoResult => StatusCode::BAD_REQUEST,
            GatewayError::ConfigurationInvalid(_)
            | GatewayError::UpstreamUnreachable(_)
            | GatewayError::UpstreamError { .. }
            | GatewayError::DecodeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{}{}\n", ERROR_MESSAGE_PREFIX, self),
        )
            .into_response()
    }
}
