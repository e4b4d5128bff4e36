//! # 参数校验模块
//!
//! ## 设计思路
//!
//! 查询参数在进入任何昂贵操作前统一校验，校验通过后才构造强类型的
//! `GenerationRequest`，下游不再重复判断。
//!
//! ## 实现思路
//!
//! - 颜色使用 `once_cell::sync::Lazy` 预编译正则，首次调用时编译。
//! - 空字符串与缺省等价：颜色、尺寸回落到默认值，Logo 视为未提供。
//! - Logo 地址在此处只做透传，安全校验由下载器负责，失败只会降级。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::config::{DEFAULT_BACKGROUND, DEFAULT_FOREGROUND, DEFAULT_SIZE, MAX_SIZE, MIN_SIZE};
use super::error::{ColorField, ValidationError};
use super::source::{Color, GenerationRequest};

/// `#rgb` 或 `#rrggbb`，大小写不敏感。
static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9A-Fa-f]{3}){1,2}$").expect("hex color pattern is valid"));

/// 未经校验的查询参数。
#[derive(Debug, Default, Clone, Deserialize)]
pub struct QrQuery {
    pub data: Option<String>,
    #[serde(rename = "fgColor")]
    pub fg_color: Option<String>,
    #[serde(rename = "bgColor")]
    pub bg_color: Option<String>,
    pub size: Option<String>,
    pub logo: Option<String>,
    pub download: Option<String>,
}

/// 校验原始参数并构造 `GenerationRequest`。
///
/// 纯函数，无副作用。
pub fn validate(query: &QrQuery) -> Result<GenerationRequest, ValidationError> {
    let payload = match non_empty(&query.data) {
        Some(data) => data.to_string(),
        None => return Err(ValidationError::MissingPayload),
    };

    let foreground = parse_color(
        non_empty(&query.fg_color).unwrap_or(DEFAULT_FOREGROUND),
        ColorField::Foreground,
    )?;
    let background = parse_color(
        non_empty(&query.bg_color).unwrap_or(DEFAULT_BACKGROUND),
        ColorField::Background,
    )?;
    let size = parse_size(non_empty(&query.size))?;

    Ok(GenerationRequest {
        payload,
        foreground,
        background,
        size,
        logo_url: non_empty(&query.logo).map(str::to_string),
        force_download: query.download.as_deref() == Some("true"),
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_color(raw: &str, field: ColorField) -> Result<Color, ValidationError> {
    if HEX_COLOR.is_match(raw) {
        Ok(Color::from_validated(raw))
    } else {
        Err(ValidationError::InvalidColor(field))
    }
}

fn parse_size(raw: Option<&str>) -> Result<u32, ValidationError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_SIZE);
    };

    let size = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidSize)?;

    if !(i64::from(MIN_SIZE)..=i64::from(MAX_SIZE)).contains(&size) {
        return Err(ValidationError::InvalidSize);
    }

    u32::try_from(size).map_err(|_| ValidationError::InvalidSize)
}
