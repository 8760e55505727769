use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Result;
use tokio::net::TcpListener;

use crate::{
    config::App,
    util::http::{HttpFetcher, UPSTREAM_TIMEOUT},
    web::AppState,
};

pub mod config;
pub mod declare;
pub mod error;
pub mod logging;
pub mod stock;
pub mod util;
pub mod web;

#[cfg(all(target_os = "linux", target_env = "musl"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let app = match App::load() {
        Ok(app) => Arc::new(app),
        Err(why) => {
            logging::error_console(format!("unable to load property details: {}", why));
            return Err(why.into());
        }
    };
    logging::info_console("property details successfully loaded".to_string());

    let fetcher = HttpFetcher::new(UPSTREAM_TIMEOUT)?.with_secret(&app.upstream.api_token);
    let state = Arc::new(AppState::new(app.clone(), Arc::new(fetcher)));

    let addr = SocketAddr::from(([0, 0, 0, 0], app.system.http_port));
    let listener = TcpListener::bind(addr).await?;
    let msg = format!("stock gateway is listening on {}", addr);
    logging::info_console(msg.clone());
    logging::info_file_async(msg);

    axum::serve(listener, web::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let msg = "stock gateway stopped".to_string();
    logging::info_console(msg.clone());
    logging::info_file_async(msg);

    // 程式結束前把寫入線程中的日誌寫完
    let flush_timeout = Duration::from_secs(2);
    let flushed = [
        logging::flush_file(flush_timeout),
        util::http::flush_log(flush_timeout),
    ];
    if flushed.contains(&false) {
        logging::error_console("Failed to flush log files before exit".to_string());
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(why) = tokio::signal::ctrl_c().await {
        logging::error_console(format!("Failed to listen for ctrl-c because {:?}", why));
        std::future::pending::<()>().await;
    }
    logging::info_console("shutting down".to_string());
}
