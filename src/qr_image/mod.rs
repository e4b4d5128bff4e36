//! # 二维码图片模块（qr_image）
//!
//! ## 设计思路
//!
//! 该模块将“参数校验 → 二维码生成 → Logo 下载 → 叠加几何 → 图层合成”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `validation`：查询参数校验，构造强类型请求
//! - `encoder`：生成二维码主体位图（最高纠错等级）
//! - `fetcher`：Logo 地址 SSRF 校验与限体积下载
//! - `overlay`：叠加几何、圆角底板、Logo contain 缩放
//! - `compositor`：按顺序叠加图层并编码 PNG
//! - `handler`：编排整条处理流水线
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! 可以按下面顺序理解调用链：
//!
//! ```text
//! GET /api/qr
//!    ↓
//! http.rs（查询参数提取 + 响应头）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ validation.rs（失败 → 400）
//!    ├─ encoder.rs（失败 → 500）
//!    └─ [有 logo 参数] fetcher.rs → overlay.rs → compositor.rs
//!          （任何失败 → 记录日志，返回无 Logo 二维码）
//!    ↓
//! PNG 字节
//! ```

mod compositor;
mod config;
mod encoder;
mod error;
mod fetcher;
mod handler;
mod overlay;
mod source;
mod validation;

#[cfg(test)]
mod test_support;

pub use config::{
    DEFAULT_BACKGROUND, DEFAULT_FOREGROUND, DEFAULT_SIZE, MAX_SIZE, MIN_SIZE, QrConfig,
};
pub use error::{ColorField, EncodingError, FetchError, LogoError, ValidationError};
pub use handler::QrHandler;
pub use overlay::MIN_LOGO_SIZE;
pub use source::{Color, GeneratedImage, GenerationRequest, OverlayGeometry};
pub use validation::{QrQuery, validate};
