//! # Logo 叠加几何与图层准备
//!
//! ## 设计思路
//!
//! 所有尺寸都由画布边长 `size` 推导，整数运算，结果可复现：
//!
//! ```text
//! logo   = floor(size * 0.22)
//! plate  = floor(logo * 1.15)
//! radius = floor(plate * 0.15)
//! offset = floor((size - edge) / 2)   // plate 与 logo 各自居中
//! ```
//!
//! 圆角底板采用“先铺满白色，再用圆角矩形 alpha 蒙版求交”的两步做法，
//! 蒙版由 `tiny-skia` 以 1:1 比例抗锯齿渲染。
//!
//! Logo 按 contain 方式缩放：保持宽高比，不足部分以全透明填充，不裁剪不拉伸。

use fast_image_resize as fr;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, ImageReader, Rgba, RgbaImage};
use std::io::Cursor;
use tiny_skia::{FillRule, Mask, PathBuilder, Pixmap, Transform};

use super::error::LogoError;
use super::source::OverlayGeometry;

/// 低于该边长的 Logo 不再叠加，避免退化几何。
pub const MIN_LOGO_SIZE: u32 = 16;

/// 三次贝塞尔逼近四分之一圆弧的控制点系数。
const ARC_KAPPA: f32 = 0.552_284_8;

impl OverlayGeometry {
    /// 由画布边长计算叠加几何。
    pub fn compute(size: u32) -> Self {
        let logo_size = size * 22 / 100;
        let plate_size = logo_size * 115 / 100;
        let corner_radius = plate_size * 15 / 100;

        Self {
            logo_size,
            logo_offset: (size - logo_size) / 2,
            plate_size,
            plate_offset: (size - plate_size) / 2,
            corner_radius,
        }
    }

    /// Logo 过小时跳过叠加。
    pub fn is_degenerate(&self) -> bool {
        self.logo_size < MIN_LOGO_SIZE
    }
}

/// 生成带圆角 alpha 蒙版的白色底板。
pub(crate) fn build_plate(geometry: &OverlayGeometry) -> Result<RgbaImage, LogoError> {
    let edge = geometry.plate_size;
    let path = rounded_square(edge as f32, geometry.corner_radius as f32)
        .ok_or_else(|| LogoError::Compose(format!("无法构建圆角路径：边长 {}", edge)))?;

    let mut mask =
        Mask::new(edge, edge).ok_or_else(|| LogoError::Compose("无法创建底板蒙版".to_string()))?;
    mask.fill_path(&path, FillRule::Winding, true, Transform::identity());

    let mut pixmap =
        Pixmap::new(edge, edge).ok_or_else(|| LogoError::Compose("无法创建底板画布".to_string()))?;
    pixmap.fill(tiny_skia::Color::WHITE);
    pixmap.apply_mask(&mask);

    let raw: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    RgbaImage::from_raw(edge, edge, raw)
        .ok_or_else(|| LogoError::Compose("底板像素长度异常".to_string()))
}

fn rounded_square(edge: f32, radius: f32) -> Option<tiny_skia::Path> {
    let r = radius.min(edge / 2.0);
    let k = ARC_KAPPA * r;
    let mut pb = PathBuilder::new();

    pb.move_to(r, 0.0);
    pb.line_to(edge - r, 0.0);
    pb.cubic_to(edge - r + k, 0.0, edge, r - k, edge, r);
    pb.line_to(edge, edge - r);
    pb.cubic_to(edge, edge - r + k, edge - r + k, edge, edge - r, edge);
    pb.line_to(r, edge);
    pb.cubic_to(r - k, edge, 0.0, edge - r + k, 0.0, edge - r);
    pb.line_to(0.0, r);
    pb.cubic_to(0.0, r - k, r - k, 0.0, r, 0.0);
    pb.close();

    pb.finish()
}

/// 解码 Logo 并按 contain 方式缩放到 `logo_size × logo_size`。
pub(crate) fn resize_logo(
    bytes: &[u8],
    logo_size: u32,
    max_pixels: u64,
) -> Result<RgbaImage, LogoError> {
    if logo_size == 0 {
        return Err(LogoError::ResourceLimit("Logo 目标边长为 0".to_string()));
    }

    let (width, height) = inspect_dimensions(bytes)?;
    let pixels = u64::from(width) * u64::from(height);
    if pixels == 0 || pixels > max_pixels {
        return Err(LogoError::ResourceLimit(format!(
            "Logo 像素数 {}x{} 超出范围（上限：{} 像素）",
            width, height, max_pixels
        )));
    }

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| LogoError::Decode(e.to_string()))?
        .to_rgba8();

    let (target_width, target_height) = contain_dimensions(width, height, logo_size);
    let fitted = resize_with_fast_image_resize(&decoded, target_width, target_height)
        .unwrap_or_else(|err| {
            log::warn!("⚠️ fast_image_resize 缩放失败，回退 image::resize：{}", err);
            imageops::resize(&decoded, target_width, target_height, FilterType::Lanczos3)
        });

    let mut canvas = RgbaImage::new(logo_size, logo_size);
    imageops::overlay(
        &mut canvas,
        &fitted,
        i64::from((logo_size - target_width) / 2),
        i64::from((logo_size - target_height) / 2),
    );

    Ok(canvas)
}

/// 在 `edge × edge` 方框内保持宽高比的最大尺寸。
fn contain_dimensions(width: u32, height: u32, edge: u32) -> (u32, u32) {
    let (w, h, e) = (u64::from(width), u64::from(height), u64::from(edge));

    if w >= h {
        (edge, ((h * e + w / 2) / w).clamp(1, e) as u32)
    } else {
        (((w * e + h / 2) / h).clamp(1, e) as u32, edge)
    }
}

fn inspect_dimensions(bytes: &[u8]) -> Result<(u32, u32), LogoError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| LogoError::Decode(format!("无法识别图片格式：{}", e)))?
        .into_dimensions()
        .map_err(|e| LogoError::Decode(format!("无法读取图片尺寸：{}", e)))
}

fn resize_with_fast_image_resize(
    image: &RgbaImage,
    target_width: u32,
    target_height: u32,
) -> Result<RgbaImage, LogoError> {
    let (src_width, src_height) = image.dimensions();

    let src_image = fr::images::Image::from_vec_u8(
        src_width,
        src_height,
        image.as_raw().clone(),
        fr::PixelType::U8x4,
    )
    .map_err(|e| LogoError::Resize(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| LogoError::Resize(format!("fast_image_resize 执行失败：{}", e)))?;

    ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
        .ok_or_else(|| LogoError::Resize("fast_image_resize 输出缓冲长度异常".to_string()))
}
