use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
};

use config::{Config as config_config, File as config_file, FileFormat};
use serde::{Deserialize, Serialize};

use crate::{error::GatewayError, logging, util::text};

const CONFIG_PATH: &str = "app.json";

/// 未設定時 HTTP 服務使用的埠號
pub const DEFAULT_HTTP_PORT: u16 = 8080;
/// 未指定交易所時使用的預設交易所代碼
pub const DEFAULT_STOCK_EXCHANGE: &str = "AMEX";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub upstream: Upstream,
    #[serde(default)]
    pub system: System,
}

const UPSTREAM_URL: &str = "UPSTREAM_URL";
const UPSTREAM_URL_WITH_SORTING: &str = "UPSTREAM_URL_WITH_SORTING";
const UPSTREAM_URL_WITH_SORTING_AND_OUTPUT: &str = "UPSTREAM_URL_WITH_SORTING_AND_OUTPUT";
const UPSTREAM_API_TOKEN: &str = "UPSTREAM_API_TOKEN";

/// 報價來源的連線設定，模板中的 `%s` 依序代入參數
#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Upstream {
    /// 只帶股票代號的查詢網址
    #[serde(default)]
    pub url: String,
    /// 股票代號、token、排序方向
    #[serde(default)]
    pub url_with_sorting: String,
    /// 股票代號、token、排序欄位、輸出格式
    #[serde(default)]
    pub url_with_sorting_and_output: String,
    #[serde(default)]
    pub api_token: String,
}

const SYSTEM_HTTP_PORT: &str = "SYSTEM_HTTP_PORT";
const SYSTEM_DEFAULT_STOCK_EXCHANGE: &str = "SYSTEM_DEFAULT_STOCK_EXCHANGE";

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct System {
    pub http_port: u16,
    pub default_stock_exchange: String,
}

impl Default for System {
    fn default() -> Self {
        System {
            http_port: DEFAULT_HTTP_PORT,
            default_stock_exchange: DEFAULT_STOCK_EXCHANGE.to_string(),
        }
    }
}

impl App {
    /// 讀取預設路徑的設定檔，並以環境變數覆蓋
    pub fn load() -> Result<Self, GatewayError> {
        Self::load_from(config_path())
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, GatewayError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GatewayError::ConfigurationInvalid(format!(
                "config file {} not found",
                path.display()
            )));
        }

        let app: App = config_config::builder()
            .add_source(config_file::from(path))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|why| GatewayError::ConfigurationInvalid(why.to_string()))?;

        app.override_with_env().validate()
    }

    /// 由 JSON 文字建立設定，不套用環境變數
    pub fn from_json(text: &str) -> Result<Self, GatewayError> {
        let app: App = config_config::builder()
            .add_source(config_file::from_str(text, FileFormat::Json))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|why| GatewayError::ConfigurationInvalid(why.to_string()))?;

        app.validate()
    }

    /// 基礎查詢網址必須存在
    pub fn validate(self) -> Result<Self, GatewayError> {
        if self.upstream.url.trim().is_empty() {
            return Err(GatewayError::ConfigurationInvalid(
                "upstream.url must not be empty".to_string(),
            ));
        }

        if text::split_codes(&self.system.default_stock_exchange).is_empty() {
            return Err(GatewayError::ConfigurationInvalid(
                "system.default_stock_exchange must not be empty".to_string(),
            ));
        }

        Ok(self)
    }

    /// 將來至於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Self {
        if let Ok(url) = env::var(UPSTREAM_URL) {
            self.upstream.url = url;
        }

        if let Ok(url) = env::var(UPSTREAM_URL_WITH_SORTING) {
            self.upstream.url_with_sorting = url;
        }

        if let Ok(url) = env::var(UPSTREAM_URL_WITH_SORTING_AND_OUTPUT) {
            self.upstream.url_with_sorting_and_output = url;
        }

        if let Ok(token) = env::var(UPSTREAM_API_TOKEN) {
            self.upstream.api_token = token;
        }

        if let Ok(port) = env::var(SYSTEM_HTTP_PORT) {
            self.system.http_port = u16::from_str(&port).unwrap_or_else(|why| {
                let msg = format!(
                    "{}={} is not a valid port ({}), using {}",
                    SYSTEM_HTTP_PORT, port, why, DEFAULT_HTTP_PORT
                );
                logging::error_console(msg.clone());
                logging::warn_file_async(msg);
                DEFAULT_HTTP_PORT
            });
        }

        if let Ok(exchange) = env::var(SYSTEM_DEFAULT_STOCK_EXCHANGE) {
            self.system.default_stock_exchange = exchange;
        }

        self
    }
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}
