//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `QrConfig`：下载限制、超时、SSRF 开关与响应缓存策略。
//! 尺寸范围、默认颜色等属于接口契约，不进入配置，而是以常量形式固定在代码中。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的配置。
//! - `from_env` 在默认值基础上读取少量环境变量覆盖项，格式错误时保留默认值并告警。

use std::net::SocketAddr;
use std::str::FromStr;

/// 允许的最小二维码边长（像素）。
pub const MIN_SIZE: u32 = 100;
/// 允许的最大二维码边长（像素）。
pub const MAX_SIZE: u32 = 1200;
/// 未指定 `size` 时的默认边长。
pub const DEFAULT_SIZE: u32 = 400;
/// 默认前景色。
pub const DEFAULT_FOREGROUND: &str = "#000000";
/// 默认背景色。
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

/// 二维码服务配置。
///
/// 字段覆盖了监听地址、Logo 下载、Logo 解码与响应头四个方面。
#[derive(Debug, Clone)]
pub struct QrConfig {
    /// HTTP 服务监听地址。
    pub bind_addr: SocketAddr,
    /// Logo 下载允许的最大体积（字节），声明长度与实际长度都受此限制。
    pub max_logo_bytes: u64,
    /// Logo 下载整体超时时间（秒）。
    pub download_timeout_secs: u64,
    /// 建立连接（TCP/TLS）超时时间（秒）。
    pub connect_timeout_secs: u64,
    /// Logo 解码后的像素上限（`width * height`）。
    pub max_logo_pixels: u64,
    /// 是否只允许 HTTPS 协议的 Logo 地址。
    pub require_https: bool,
    /// 是否允许访问内网或本地地址（默认关闭，防 SSRF；仅用于本地调试与测试）。
    pub allow_private_network: bool,
    /// 成功响应的共享缓存时长（秒）。
    pub cache_max_age_secs: u64,
    /// `download=true` 时附件的文件名。
    pub download_filename: String,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_logo_bytes: 500 * 1024,
            download_timeout_secs: 8,
            connect_timeout_secs: 4,
            max_logo_pixels: 16_000_000,
            require_https: true,
            allow_private_network: false,
            cache_max_age_secs: 24 * 60 * 60,
            download_filename: "qrcode.png".to_string(),
        }
    }
}

impl QrConfig {
    /// 读取环境变量覆盖默认配置。
    ///
    /// 支持：`QR_BIND_ADDR`、`QR_MAX_LOGO_BYTES`、`QR_DOWNLOAD_TIMEOUT_SECS`、
    /// `QR_CONNECT_TIMEOUT_SECS`。
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        override_from(&lookup, "QR_BIND_ADDR", &mut config.bind_addr);
        override_from(&lookup, "QR_MAX_LOGO_BYTES", &mut config.max_logo_bytes);
        override_from(
            &lookup,
            "QR_DOWNLOAD_TIMEOUT_SECS",
            &mut config.download_timeout_secs,
        );
        override_from(
            &lookup,
            "QR_CONNECT_TIMEOUT_SECS",
            &mut config.connect_timeout_secs,
        );

        config
    }

    /// 成功响应使用的 `Cache-Control` 值。
    pub fn cache_control_value(&self) -> String {
        format!("public, max-age={}", self.cache_max_age_secs)
    }

    /// `download=true` 时使用的 `Content-Disposition` 值。
    pub fn content_disposition_value(&self) -> String {
        format!("attachment; filename=\"{}\"", self.download_filename)
    }
}

fn override_from<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else {
        return;
    };

    match raw.trim().parse::<T>() {
        Ok(value) => *target = value,
        Err(_) => log::warn!("⚠️ 环境变量 {} 格式无效，保留默认值：{}", key, raw),
    }
}
