//! # HTTP 接入层
//!
//! 路由只做参数提取与响应头组装，不承载业务逻辑；
//! 实际处理交给注入的 `QrHandler`，保持处理函数薄、稳定、易测试。

use actix_web::error::QueryPayloadError;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, get, web};

use crate::error::AppError;
use crate::qr_image::{QrHandler, QrQuery};

/// 生成二维码 PNG。
///
/// 查询参数：`data`（必填）、`fgColor`、`bgColor`、`size`、`logo`、`download`。
#[get("/api/qr")]
pub async fn generate_qr(
    handler: web::Data<QrHandler>,
    query: web::Query<QrQuery>,
) -> Result<HttpResponse, AppError> {
    let image = handler.process(&query).await?;
    let config = handler.config();

    let mut response = HttpResponse::Ok();
    response
        .content_type("image/png")
        .insert_header((header::CACHE_CONTROL, config.cache_control_value()));

    if image.force_download {
        response.insert_header((
            header::CONTENT_DISPOSITION,
            config.content_disposition_value(),
        ));
    }

    Ok(response.body(image.png))
}

/// 存活探针。
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .body("ok")
}

/// 查询串反序列化失败时，沿用 `AppError` 的 JSON 错误体。
fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let detail = match err {
        QueryPayloadError::Deserialize(inner) => inner.to_string(),
        other => other.to_string(),
    };
    log::warn!("⚠️ 查询串解析失败: {}", detail);
    AppError::MalformedQuery(detail).into()
}

/// 注册所有路由，供 `main` 与集成测试共用。
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(generate_qr)
        .service(health);
}
