use std::{
    error::Error as _,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};

use crate::{error::GatewayError, logging::Logger, util::text};

/// 對報價來源發出請求的逾時時間
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("http"));

/// 將 http 記錄器中尚未寫入的訊息寫入檔案
pub fn flush_log(timeout: Duration) -> bool {
    LOGGER.flush(timeout)
}

/// Fetches the raw body behind a URL.
///
/// The stock pipeline only depends on this trait, so it can run against
/// canned payloads in tests.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Performs a single GET request.
    ///
    /// # Errors
    ///
    /// * `GatewayError::UpstreamUnreachable` when the request cannot be sent,
    ///   times out or the body cannot be read.
    /// * `GatewayError::UpstreamError` when the status code is not 200.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, GatewayError>;
}

/// `Fetch` implementation backed by a pooled reqwest client.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
    /// 寫入日誌前要從網址中遮蔽的字串
    secret: String,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        // rustls 只需要安裝一次 provider，重複安裝時回傳的錯誤可忽略
        let _ = rustls::crypto::ring::default_provider().install_default();

        let client = Client::builder()
            // ===== 壓縮 =====
            .brotli(true)
            .gzip(true)
            .zstd(true)
            // ===== 超時設置 =====
            .connect_timeout(timeout)
            .timeout(timeout)
            // ===== TCP 優化 =====
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            // ===== 連接池 =====
            .pool_max_idle_per_host(20)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))?;

        Ok(HttpFetcher {
            client,
            timeout,
            secret: String::new(),
        })
    }

    /// 設定不可出現在日誌中的字串，通常是 API token
    pub fn with_secret(mut self, secret: &str) -> Self {
        self.secret = secret.to_string();
        self
    }

    fn unreachable(&self, why: reqwest::Error) -> GatewayError {
        let why = why.without_url();
        let mut msg = if why.is_timeout() {
            format!("request timed out after {} ms", self.timeout.as_millis())
        } else {
            why.to_string()
        };

        let mut source = why.source();
        while let Some(cause) = source {
            msg.push_str(": ");
            msg.push_str(&cause.to_string());
            source = cause.source();
        }

        GatewayError::UpstreamUnreachable(text::mask_secret(&msg, &self.secret))
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, GatewayError> {
        let visit_log = format!("GET:{}", text::mask_secret(url, &self.secret));
        let start = Instant::now();

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(why) => {
                let why = self.unreachable(why);
                LOGGER.error(format!(
                    "{} failed because {}. {} ms",
                    visit_log,
                    why,
                    start.elapsed().as_millis()
                ));
                return Err(why);
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            LOGGER.error(format!(
                "{} responded {}. {} ms",
                visit_log,
                status,
                start.elapsed().as_millis()
            ));
            return Err(GatewayError::UpstreamError {
                status_code: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|why| self.unreachable(why))?;
        LOGGER.info(format!(
            "{} {} {} bytes {} ms",
            visit_log,
            status,
            body.len(),
            start.elapsed().as_millis()
        ));

        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::{http::StatusCode as AxumStatus, routing::get, Router};
    use tokio::net::TcpListener;

    use super::*;

    async fn serve() -> SocketAddr {
        let router = Router::new()
            .route("/ok", get(|| async { r#"{"data":[]}"# }))
            .route(
                "/unavailable",
                get(|| async { (AxumStatus::SERVICE_UNAVAILABLE, "maintenance") }),
            )
            .route("/missing", get(|| async { AxumStatus::NOT_FOUND }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    "late"
                }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        addr
    }

    #[tokio::test]
    async fn test_get_bytes_ok() {
        let addr = serve().await;
        let fetcher = HttpFetcher::new(UPSTREAM_TIMEOUT).unwrap();

        let body = fetcher
            .get_bytes(&format!("http://{}/ok", addr))
            .await
            .unwrap();
        assert_eq!(body, br#"{"data":[]}"#.to_vec());
        assert!(flush_log(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_get_bytes_non_200() {
        let addr = serve().await;
        let fetcher = HttpFetcher::new(UPSTREAM_TIMEOUT).unwrap();

        let result = fetcher
            .get_bytes(&format!("http://{}/unavailable", addr))
            .await;
        assert_eq!(result, Err(GatewayError::UpstreamError { status_code: 503 }));

        let result = fetcher.get_bytes(&format!("http://{}/missing", addr)).await;
        assert_eq!(result, Err(GatewayError::UpstreamError { status_code: 404 }));
    }

    #[tokio::test]
    async fn test_get_bytes_timeout() {
        let addr = serve().await;
        let fetcher = HttpFetcher::new(Duration::from_millis(300)).unwrap();

        let start = Instant::now();
        let result = fetcher.get_bytes(&format!("http://{}/slow", addr)).await;
        assert!(matches!(result, Err(GatewayError::UpstreamUnreachable(_))));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_get_bytes_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::new(UPSTREAM_TIMEOUT)
            .unwrap()
            .with_secret("topsecret");
        let result = fetcher
            .get_bytes(&format!("http://{}/?api_token=topsecret", addr))
            .await;

        match result {
            Err(GatewayError::UpstreamUnreachable(msg)) => {
                assert!(!msg.contains("topsecret"), "{}", msg);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
