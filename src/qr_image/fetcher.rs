//! # Logo 下载模块
//!
//! ## 设计思路
//!
//! Logo 地址来自不可信的用户输入，下载前必须先做 SSRF 校验，下载中必须限制体积。
//! 尽可能早地失败：地址不合规直接拒绝，声明长度超限不读取响应体。
//!
//! ## 实现思路
//!
//! - 地址：仅允许 HTTPS，拒绝 `localhost` / `127.0.0.1` / `10.` / `192.168.` / `172.16-31.` 主机。
//! - 请求：单次 GET，不跟随重定向（3xx 视为失败，避免被跳转到内网）。
//! - 体积：先看 `Content-Length`，再在流式读取中累计实际字节数，两者都不得超过上限。
//! - 内容：用文件签名（magic bytes）确认是图片。
//!
//! 主机黑名单只覆盖常见的私有 IPv4 段，不处理 IPv6、链路本地地址与 DNS 重绑定。

use once_cell::sync::Lazy;
use regex::Regex;

use super::config::QrConfig;
use super::error::FetchError;
use super::handler::QrHandler;
use super::source::RemoteImage;

const BUFFER_INITIAL_CAPACITY: usize = 16 * 1024;

/// RFC1918 的 172.16.0.0/12 段。
static PRIVATE_172: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^172\.(1[6-9]|2[0-9]|3[01])\.").expect("172 private range pattern is valid")
});

impl QrHandler {
    /// 下载 Logo 原始字节。
    pub(super) async fn fetch_logo(&self, url: &str) -> Result<RemoteImage, FetchError> {
        let parsed = Self::validate_url_safety(url, &self.config)?;
        log::info!("🌐 开始下载 Logo - URL: {}", Self::redact_url_for_log(url));

        let response = self
            .client
            .get(parsed)
            .header(reqwest::header::ACCEPT, "image/*")
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::DownloadFailed(format!("HTTP {}", status.as_u16())));
        }

        let declared_length = response
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|cl| cl.to_str().ok())
            .and_then(|cl| cl.trim().parse::<u64>().ok());

        let limit = self.config.max_logo_bytes;
        if let Some(declared) = declared_length {
            if declared > limit {
                return Err(FetchError::TooLarge {
                    actual: declared,
                    limit,
                });
            }
        }

        let initial_capacity = declared_length
            .map(|len| len.min(limit) as usize)
            .filter(|len| *len > 0)
            .unwrap_or(BUFFER_INITIAL_CAPACITY);
        let mut buffer = Vec::with_capacity(initial_capacity);
        let mut response = response;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.map_reqwest_error(e, url))?
        {
            let total = (buffer.len() + chunk.len()) as u64;
            if total > limit {
                return Err(FetchError::TooLarge {
                    actual: total,
                    limit,
                });
            }
            buffer.extend_from_slice(&chunk);
        }

        // 声明长度不可信，以实际读到的字节数为准再校验一次。
        let actual = buffer.len() as u64;
        if actual > limit {
            return Err(FetchError::TooLarge { actual, limit });
        }

        Self::validate_image_signature(&buffer)?;
        log::debug!("✅ Logo 下载完成 - {} bytes", actual);

        Ok(RemoteImage {
            bytes: buffer,
            declared_length,
        })
    }

    /// 校验 URL 安全性，返回解析后的地址。
    pub(crate) fn validate_url_safety(
        url: &str,
        config: &QrConfig,
    ) -> Result<reqwest::Url, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| FetchError::Rejected(format!("URL 格式错误：{}", e)))?;

        match parsed.scheme() {
            "https" => {}
            "http" if !config.require_https => {}
            other => {
                return Err(FetchError::Rejected(format!("仅支持 HTTPS，实际协议：{}", other)));
            }
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| FetchError::Rejected("URL 缺少主机地址".to_string()))?;

        if !config.allow_private_network && Self::is_private_host(host) {
            return Err(FetchError::Rejected(format!("禁止访问内网地址：{}", host)));
        }

        Ok(parsed)
    }

    /// 判断主机名是否命中本地/内网黑名单。
    fn is_private_host(host: &str) -> bool {
        let host = host.to_ascii_lowercase();

        host == "localhost"
            || host == "127.0.0.1"
            || host.starts_with("192.168.")
            || host.starts_with("10.")
            || PRIVATE_172.is_match(&host)
    }

    /// 去掉 query 与 fragment，避免把令牌写进日志。
    pub(crate) fn redact_url_for_log(url: &str) -> String {
        let Ok(parsed) = reqwest::Url::parse(url) else {
            return "<invalid-url>".to_string();
        };

        let host = parsed.host_str().unwrap_or("<unknown-host>");
        let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();

        format!("{}://{}{}{}", parsed.scheme(), host, port, parsed.path())
    }

    fn map_reqwest_error(&self, e: reqwest::Error, url: &str) -> FetchError {
        let redacted = Self::redact_url_for_log(url);
        let err_msg = e.to_string().replace(url, &redacted);

        if e.is_timeout() {
            FetchError::Timeout(format!("{}秒内未完成", self.config.download_timeout_secs))
        } else if e.is_connect() {
            FetchError::Network(format!("无法连接：{}", err_msg))
        } else {
            FetchError::Network(format!("请求失败：{}", err_msg))
        }
    }

    /// 通过文件签名（magic bytes）校验下载内容为图片。
    fn validate_image_signature(bytes: &[u8]) -> Result<(), FetchError> {
        if bytes.is_empty() {
            return Err(FetchError::NotAnImage("内容为空".to_string()));
        }

        let kind = infer::get(bytes)
            .ok_or_else(|| FetchError::NotAnImage("无法识别文件类型".to_string()))?;

        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(FetchError::NotAnImage(kind.mime_type().to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr_image::test_support::{local_config, png_bytes, serve_hung, serve_once};
    use proptest::prelude::*;

    fn rejected(url: &str) -> bool {
        matches!(
            QrHandler::validate_url_safety(url, &QrConfig::default()),
            Err(FetchError::Rejected(_))
        )
    }

    #[test]
    fn url_safety_accepts_public_https() {
        assert!(!rejected("https://example.com/logo.png"));
        assert!(!rejected("https://172.32.0.1/logo.png"));
        assert!(!rejected("https://172.15.0.1/logo.png"));
        assert!(!rejected("https://11.0.0.1/logo.png"));
    }

    #[test]
    fn url_safety_blocks_plain_http_and_other_schemes() {
        assert!(rejected("http://example.com/logo.png"));
        assert!(rejected("ftp://example.com/logo.png"));
        assert!(rejected("not a url"));
    }

    #[test]
    fn url_safety_blocks_loopback_and_private_hosts() {
        for url in [
            "https://localhost/logo.png",
            "https://LocalHost:8443/logo.png",
            "https://127.0.0.1/logo.png",
            "https://192.168.1.10/logo.png",
            "https://10.0.0.5/logo.png",
            "https://172.16.0.1/logo.png",
            "https://172.31.255.255:444/a/b.png",
        ] {
            assert!(rejected(url), "{url}");
        }
    }

    #[test]
    fn redact_url_for_log_removes_query_and_fragment() {
        let redacted =
            QrHandler::redact_url_for_log("https://example.com:8443/path/img.png?token=abc123#hash");

        assert_eq!(redacted, "https://example.com:8443/path/img.png");
    }

    proptest! {
        #[test]
        fn private_172_block_is_rejected_on_any_path_and_port(
            second in 16u8..=31,
            third in 0u8..=255,
            port in 1u16..,
            path in "[a-z0-9/]{0,16}",
        ) {
            let url = format!("https://172.{second}.{third}.1:{port}/{path}");
            prop_assert!(rejected(&url));
        }

        #[test]
        fn http_scheme_is_rejected_for_any_host(host in "[a-z]{1,12}\\.(com|org|net)") {
            let url = format!("http://{host}/logo.png");
            prop_assert!(rejected(&url));
        }
    }

    #[tokio::test]
    async fn fetch_returns_image_bytes_and_declared_length() {
        let body = png_bytes(8, 8);
        let (url, server) = serve_once(200, Some(body.len()), body.clone());
        let handler = QrHandler::new(local_config()).expect("handler init failed");

        let image = handler.fetch_logo(&url).await.expect("fetch should succeed");
        server.join().expect("server thread failed");

        assert_eq!(image.bytes, body);
        assert_eq!(image.declared_length, Some(body.len() as u64));
    }

    #[tokio::test]
    async fn fetch_maps_non_success_status_to_download_failed() {
        let (url, server) = serve_once(404, Some(0), Vec::new());
        let handler = QrHandler::new(local_config()).expect("handler init failed");

        let result = handler.fetch_logo(&url).await;
        server.join().expect("server thread failed");

        assert!(matches!(result, Err(FetchError::DownloadFailed(_))));
    }

    #[tokio::test]
    async fn fetch_does_not_follow_redirects() {
        let (url, server) = serve_once(302, Some(0), Vec::new());
        let handler = QrHandler::new(local_config()).expect("handler init failed");

        let result = handler.fetch_logo(&url).await;
        server.join().expect("server thread failed");

        assert!(matches!(result, Err(FetchError::DownloadFailed(_))));
    }

    #[tokio::test]
    async fn fetch_rejects_oversized_declared_length_before_body() {
        let body = vec![0u8; 600 * 1024];
        let (url, server) = serve_once(200, Some(body.len()), body);
        let handler = QrHandler::new(local_config()).expect("handler init failed");

        let result = handler.fetch_logo(&url).await;
        let _ = server.join();

        assert!(matches!(
            result,
            Err(FetchError::TooLarge { actual, limit }) if actual == 600 * 1024 && limit == 500 * 1024
        ));
    }

    #[tokio::test]
    async fn fetch_caps_actual_body_when_length_is_not_declared() {
        let mut body = png_bytes(8, 8);
        body.resize(600 * 1024, 0);
        let (url, server) = serve_once(200, None, body);
        let handler = QrHandler::new(local_config()).expect("handler init failed");

        let result = handler.fetch_logo(&url).await;
        let _ = server.join();

        assert!(matches!(result, Err(FetchError::TooLarge { .. })));
    }

    #[tokio::test]
    async fn fetch_rejects_non_image_body() {
        let body = b"<html><body>not an image</body></html>".to_vec();
        let (url, server) = serve_once(200, Some(body.len()), body);
        let handler = QrHandler::new(local_config()).expect("handler init failed");

        let result = handler.fetch_logo(&url).await;
        server.join().expect("server thread failed");

        assert!(matches!(result, Err(FetchError::NotAnImage(_))));
    }

    #[tokio::test]
    async fn fetch_times_out_when_server_never_answers() {
        let (url, _server) = serve_hung();
        let handler = QrHandler::new(QrConfig {
            download_timeout_secs: 1,
            connect_timeout_secs: 1,
            ..local_config()
        })
        .expect("handler init failed");

        let result = handler.fetch_logo(&url).await;

        assert!(
            matches!(result, Err(FetchError::Timeout(_))),
            "{:?}",
            result.as_ref().err()
        );
    }

    #[tokio::test]
    async fn fetch_rejects_private_host_before_any_request() {
        let handler = QrHandler::new(QrConfig::default()).expect("handler init failed");

        let result = handler.fetch_logo("http://10.0.0.5/logo.png").await;

        assert!(matches!(result, Err(FetchError::Rejected(_))));
    }
}
