//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义面向 HTTP 的 `AppError`，集中决定状态码与响应体：
//! - 参数校验失败 → 400，响应体携带具体字段信息
//! - 查询串无法解析（如重复的参数名）→ 400，同样返回 JSON 响应体
//! - 其余失败 → 500，响应体只给出通用文案，细节只写日志
//!
//! Logo 分支的错误在 `QrHandler` 内部就已降级处理，不会出现在这里。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ValidationError` / `EncodingError` 提供 `From` 转换，无需手动 map。
//! - 实现 actix-web 的 `ResponseError`，统一输出 `{"error": "..."}`。

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::qr_image::{EncodingError, ValidationError};

/// 500 响应对外展示的通用文案。
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate QR code";

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 请求参数不合法
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// 查询串无法反序列化
    #[error("invalid query string: {0}")]
    MalformedQuery(String),

    /// 二维码主体生成失败
    #[error("{0}")]
    Encoding(#[from] EncodingError),

    /// 运行时异常（任务中止等）
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误响应体。
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::MalformedQuery(_) => StatusCode::BAD_REQUEST,
            Self::Encoding(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            Self::Validation(err) => err.to_string(),
            Self::MalformedQuery(_) => self.to_string(),
            other => {
                log::error!("❌ 二维码生成失败: {other}");
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(ErrorBody { error: message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr_image::ColorField;
    use actix_web::body::to_bytes;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.expect("read body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[actix_web::test]
    async fn validation_errors_are_bad_requests_with_field_message() {
        let (status, body) =
            body_of(AppError::from(ValidationError::InvalidColor(ColorField::Background))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bgColor must be a hex color like #000 or #000000");
    }

    #[actix_web::test]
    async fn malformed_query_is_bad_request_with_json_body() {
        let (status, body) =
            body_of(AppError::MalformedQuery("duplicate field `size`".to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid query string: duplicate field `size`");
    }

    #[actix_web::test]
    async fn encoding_errors_do_not_leak_details() {
        let (status, body) =
            body_of(AppError::from(EncodingError::Symbol("data too long".to_string()))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], GENERIC_FAILURE_MESSAGE);
    }
}
