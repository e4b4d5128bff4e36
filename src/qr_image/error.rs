//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 按“处理结果”而非“出错位置”划分错误类型：
//! - `ValidationError`：用户输入错误，直接返回 400。
//! - `FetchError` / `LogoError`：Logo 分支错误，只记录日志、降级为无 Logo 二维码。
//! - `EncodingError`：二维码主体生成失败，返回 500。
//!
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。

use std::fmt;

/// 颜色参数字段，用于生成精确到字段的错误信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorField {
    Foreground,
    Background,
}

impl ColorField {
    /// 对外暴露的查询参数名。
    pub fn param_name(self) -> &'static str {
        match self {
            Self::Foreground => "fgColor",
            Self::Background => "bgColor",
        }
    }
}

impl fmt::Display for ColorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param_name())
    }
}

/// 请求参数校验错误，消息会原样返回给客户端。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("data parameter is required")]
    MissingPayload,

    #[error("{0} must be a hex color like #000 or #000000")]
    InvalidColor(ColorField),

    #[error("size must be between 100 and 1200")]
    InvalidSize,
}

/// Logo 下载阶段错误。
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Logo 地址被拒绝：{0}")]
    Rejected(String),

    #[error("Logo 下载失败：{0}")]
    DownloadFailed(String),

    #[error("Logo 体积过大：{actual} 字节（限制：{limit} 字节）")]
    TooLarge { actual: u64, limit: u64 },

    #[error("Logo 下载超时：{0}")]
    Timeout(String),

    #[error("Logo 内容不是图片：{0}")]
    NotAnImage(String),

    #[error("网络错误：{0}")]
    Network(String),
}

/// Logo 分支（下载 → 解码 → 缩放 → 合成）的统一错误。
///
/// 该错误只会在 `QrHandler` 的降级点被吞掉并记录日志，不会返回给客户端。
#[derive(Debug, thiserror::Error)]
pub enum LogoError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Logo 解码失败：{0}")]
    Decode(String),

    #[error("Logo 资源限制：{0}")]
    ResourceLimit(String),

    #[error("Logo 缩放失败：{0}")]
    Resize(String),

    #[error("图层合成失败：{0}")]
    Compose(String),
}

/// 二维码主体生成错误。
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("二维码编码失败：{0}")]
    Symbol(String),

    #[error("PNG 编码失败：{0}")]
    Png(String),
}

impl From<qrcode::types::QrError> for EncodingError {
    fn from(error: qrcode::types::QrError) -> Self {
        Self::Symbol(error.to_string())
    }
}

impl From<image::ImageError> for EncodingError {
    fn from(error: image::ImageError) -> Self {
        Self::Png(error.to_string())
    }
}
