//! # 数据模型与中间结果
//!
//! ## 设计思路
//!
//! 将“外部输入”与“流水线中间结果”解耦：
//! - `GenerationRequest` 表示已经通过校验的请求（只能由校验器构造）
//! - `RemoteImage` 表示已下载但未解码的 Logo 字节
//! - `OverlayGeometry` 表示由 `size` 推导出的叠加几何
//! - `CompositeLayer` 表示按顺序叠加的单个图层
//!
//! 所有类型都只在单次请求内存活，不做跨请求缓存。

use image::{Rgba, RgbaImage};

/// 已校验的十六进制颜色（`#rgb` 或 `#rrggbb`）。
///
/// 构造后不可变，只能经由校验器创建。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Color(String);

impl Color {
    /// 仅供校验器在正则匹配通过后调用。
    pub(super) fn from_validated(hex: &str) -> Self {
        Self(hex.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 转换为不透明 RGBA 像素。
    ///
    /// 三位简写按 CSS 规则展开（`#abc` → `#aabbcc`）。
    pub fn to_rgba(&self) -> Rgba<u8> {
        let digits: Vec<u8> = self
            .0
            .trim_start_matches('#')
            .chars()
            .filter_map(|c| c.to_digit(16))
            .map(|d| d as u8)
            .collect();

        match digits.as_slice() {
            [r, g, b] => Rgba([r * 17, g * 17, b * 17, 255]),
            [r1, r2, g1, g2, b1, b2] => Rgba([r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2, 255]),
            _ => Rgba([0, 0, 0, 255]),
        }
    }
}

/// 通过校验的生成请求。
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub payload: String,
    pub foreground: Color,
    pub background: Color,
    pub size: u32,
    pub logo_url: Option<String>,
    pub force_download: bool,
}

/// 下载阶段输出：Logo 原始字节与服务端声明的长度。
pub(crate) struct RemoteImage {
    pub(crate) bytes: Vec<u8>,
    pub(crate) declared_length: Option<u64>,
}

/// Logo 叠加几何，全部由画布边长推导。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayGeometry {
    pub logo_size: u32,
    pub logo_offset: u32,
    pub plate_size: u32,
    pub plate_offset: u32,
    pub corner_radius: u32,
}

/// 待合成的单个图层，按 `Vec` 顺序自底向上叠加。
pub(crate) struct CompositeLayer {
    pub(crate) raster: RgbaImage,
    pub(crate) top: u32,
    pub(crate) left: u32,
}

/// 处理结果：最终 PNG 字节及附带的响应元信息。
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub png: Vec<u8>,
    pub logo_applied: bool,
    pub force_download: bool,
}
