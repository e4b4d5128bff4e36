//! # 图层合成与输出编码
//!
//! 图层严格按自底向上的顺序叠加：二维码 → 白色底板 → Logo。
//! 每一层都以标准 “over” 方式与下层做 alpha 混合，顺序颠倒会破坏结果。

use image::imageops;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;

use super::error::{EncodingError, LogoError};
use super::source::{CompositeLayer, OverlayGeometry};

/// 按几何位置将底板与 Logo 叠加到二维码上。
pub(crate) fn compose(
    base: RgbaImage,
    plate: RgbaImage,
    logo: RgbaImage,
    geometry: &OverlayGeometry,
) -> Result<RgbaImage, LogoError> {
    let layers = vec![
        CompositeLayer {
            raster: plate,
            top: geometry.plate_offset,
            left: geometry.plate_offset,
        },
        CompositeLayer {
            raster: logo,
            top: geometry.logo_offset,
            left: geometry.logo_offset,
        },
    ];

    apply_layers(base, &layers)
}

fn apply_layers(mut base: RgbaImage, layers: &[CompositeLayer]) -> Result<RgbaImage, LogoError> {
    let (width, height) = base.dimensions();

    for layer in layers {
        let (w, h) = layer.raster.dimensions();
        if layer.left + w > width || layer.top + h > height {
            return Err(LogoError::Compose(format!(
                "图层 {}x{}@({},{}) 超出画布 {}x{}",
                w, h, layer.left, layer.top, width, height
            )));
        }

        imageops::overlay(
            &mut base,
            &layer.raster,
            i64::from(layer.left),
            i64::from(layer.top),
        );
    }

    Ok(base)
}

/// 输出为带 alpha 通道的 PNG。
pub(crate) fn encode_png(raster: RgbaImage) -> Result<Vec<u8>, EncodingError> {
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(raster).write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner())
}
