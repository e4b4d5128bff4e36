//! # 二维码主体生成
//!
//! 固定使用最高纠错等级（H）：Logo 会遮挡中心区域的模块，
//! 解码器需要依靠冗余信息恢复被遮挡的数据。

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use qrcode::{EcLevel, QrCode};

use super::error::EncodingError;
use super::source::GenerationRequest;

pub(crate) const ERROR_CORRECTION: EcLevel = EcLevel::H;

/// 按请求生成 `size × size` 的二维码位图。
///
/// 先以 1 像素/模块渲染（含静区），再用最近邻缩放到目标边长，保证模块边缘锐利。
pub(crate) fn encode_symbol(request: &GenerationRequest) -> Result<RgbaImage, EncodingError> {
    let code = QrCode::with_error_correction_level(request.payload.as_bytes(), ERROR_CORRECTION)?;

    let modules = code
        .render::<Rgba<u8>>()
        .dark_color(request.foreground.to_rgba())
        .light_color(request.background.to_rgba())
        .quiet_zone(true)
        .module_dimensions(1, 1)
        .build();

    log::debug!(
        "🔳 二维码编码完成 - 版本宽度: {} 模块, 输出: {}x{}",
        code.width(),
        request.size,
        request.size
    );

    Ok(imageops::resize(
        &modules,
        request.size,
        request.size,
        FilterType::Nearest,
    ))
}
