//! # 二维码生成服务 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 客户端 (浏览器 / curl)                     │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ GET /api/qr?data=...&size=...&logo=...
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            后端 (Rust / actix-web)               │
//! │                                                          │
//! │  ┌─ http ─────── 路由 + 响应头 (Cache-Control 等)         │
//! │  │                                                       │
//! │  ├─ error ────── AppError (400 / 500 JSON)               │
//! │  │                                                       │
//! │  └─ qr_image      二维码生成·Logo 下载·叠加合成            │
//! │      ├─ validation  参数校验                              │
//! │      ├─ encoder     二维码主体 (纠错等级 H)               │
//! │      ├─ fetcher     SSRF 校验 + 限体积下载                │
//! │      ├─ overlay     几何 / 圆角底板 / contain 缩放        │
//! │      └─ compositor  图层叠加 + PNG 编码                   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，决定 HTTP 状态码与错误响应体 |
//! | [`http`] | actix-web 路由注册、查询参数提取、响应头组装 |
//! | [`qr_image`] | 校验参数、生成二维码、下载并叠加 Logo、输出 PNG |
//!
//! 服务不保存任何跨请求状态：每个请求都是独立的纯流水线。

pub mod error;
pub mod http;
pub mod qr_image;
