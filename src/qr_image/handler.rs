//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `QrHandler` 只负责流程编排，不直接与 HTTP 框架绑定。
//! 处理链路固定为：
//! 1. 校验参数（失败直接返回 400）
//! 2. 生成二维码主体（失败返回 500）
//! 3. 可选：下载 Logo → 缩放 → 生成底板 → 合成
//! 4. 编码 PNG
//!
//! ## 实现思路
//!
//! - Logo 分支整体返回 `Result<_, LogoError>`，错误只在 `process` 中的一处被吞掉并记录日志，
//!   响应降级为无 Logo 的二维码。
//! - 编码、缩放、合成属于 CPU 密集操作，放到 `spawn_blocking` 执行，不阻塞异步运行时。
//! - 处理器只持有只读配置与复用的 HTTP 客户端，不保存任何请求间状态。
//! - 记录 `encode/logo/png/total` 阶段耗时，便于性能诊断。

use image::RgbaImage;
use std::time::{Duration, Instant};

use super::compositor::{compose, encode_png};
use super::encoder::encode_symbol;
use super::error::{FetchError, LogoError};
use super::overlay::{build_plate, resize_logo};
use super::source::{GeneratedImage, OverlayGeometry};
use super::validation::{QrQuery, validate};
use super::QrConfig;
use crate::error::AppError;

/// 二维码处理器。
///
/// 封装了只读配置与 HTTP 客户端，并编排各子模块实现完整流程。
pub struct QrHandler {
    pub(super) config: QrConfig,
    pub(super) client: reqwest::Client,
}

impl QrHandler {
    /// 根据配置创建处理器。
    ///
    /// HTTP 客户端只构建一次：整体超时、连接超时，且不跟随重定向。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use qr_generator::qr_image::{QrConfig, QrHandler};
    ///
    /// let handler = QrHandler::new(QrConfig::default())?;
    /// # Ok::<(), qr_generator::qr_image::FetchError>(())
    /// ```
    pub fn new(config: QrConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("qr-generator/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(format!("无法创建 HTTP 客户端：{}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &QrConfig {
        &self.config
    }

    /// 处理主入口：校验参数并生成最终 PNG。
    ///
    /// 只有参数错误（400）与二维码主体生成失败（500）会返回 `Err`，
    /// Logo 相关的任何失败都会降级为无 Logo 的结果。
    pub async fn process(&self, query: &QrQuery) -> Result<GeneratedImage, AppError> {
        let total_start = Instant::now();
        let request = validate(query)?;

        let encode_start = Instant::now();
        let base = {
            let request = request.clone();
            tokio::task::spawn_blocking(move || encode_symbol(&request))
                .await
                .map_err(|e| AppError::Internal(format!("二维码编码任务异常终止：{}", e)))??
        };
        let encode_elapsed = encode_start.elapsed();

        let logo_start = Instant::now();
        let (raster, logo_applied) = match request.logo_url.as_deref() {
            None => (base, false),
            Some(url) => {
                let geometry = OverlayGeometry::compute(request.size);
                if geometry.is_degenerate() {
                    log::info!("ℹ️ 画布过小，跳过 Logo 叠加 - size: {}", request.size);
                    (base, false)
                } else {
                    match self.overlay_logo(base.clone(), url, geometry).await {
                        Ok(composited) => (composited, true),
                        Err(err) => {
                            log::warn!(
                                "⚠️ Logo 处理失败，返回无 Logo 二维码 - URL: {}，原因：{}",
                                Self::redact_url_for_log(url),
                                err
                            );
                            (base, false)
                        }
                    }
                }
            }
        };
        let logo_elapsed = logo_start.elapsed();

        let png_start = Instant::now();
        let png = tokio::task::spawn_blocking(move || encode_png(raster))
            .await
            .map_err(|e| AppError::Internal(format!("PNG 编码任务异常终止：{}", e)))??;
        let png_elapsed = png_start.elapsed();

        log::info!(
            "✅ 二维码生成完成 - size={} logo={} bytes={} encode={}ms logo={}ms png={}ms total={}ms",
            request.size,
            logo_applied,
            png.len(),
            encode_elapsed.as_millis(),
            logo_elapsed.as_millis(),
            png_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(GeneratedImage {
            png,
            logo_applied,
            force_download: request.force_download,
        })
    }

    /// Logo 分支：下载 → 缩放 → 底板 → 合成。
    async fn overlay_logo(
        &self,
        base: RgbaImage,
        url: &str,
        geometry: OverlayGeometry,
    ) -> Result<RgbaImage, LogoError> {
        let remote = self.fetch_logo(url).await?;
        log::debug!(
            "📦 Logo 字节数: {}（声明长度: {:?}）",
            remote.bytes.len(),
            remote.declared_length
        );

        let max_pixels = self.config.max_logo_pixels;
        tokio::task::spawn_blocking(move || {
            let logo = resize_logo(&remote.bytes, geometry.logo_size, max_pixels)?;
            let plate = build_plate(&geometry)?;
            compose(base, plate, logo, &geometry)
        })
        .await
        .map_err(|e| LogoError::Compose(format!("合成任务异常终止：{}", e)))?
    }
}
