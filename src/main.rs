//! # 二维码生成服务 — 应用入口
//!
//! 本文件仅负责日志初始化、配置加载与 HTTP 服务启动。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use actix_web::{App, HttpServer, web};
use qr_generator::http;
use qr_generator::qr_image::{QrConfig, QrHandler};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = QrConfig::from_env();
    let bind_addr = config.bind_addr;
    log::info!(
        "setup: 配置加载完成 - bind={} max_logo_bytes={} download_timeout={}s",
        bind_addr,
        config.max_logo_bytes,
        config.download_timeout_secs
    );

    let handler = QrHandler::new(config).map_err(std::io::Error::other)?;
    let handler = web::Data::new(handler);

    log::info!("setup: 开始监听 {}", bind_addr);
    HttpServer::new(move || App::new().app_data(handler.clone()).configure(http::configure))
        .bind(bind_addr)?
        .run()
        .await
}
