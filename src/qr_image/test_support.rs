//! 单元测试共用的本地 HTTP 服务与测试图片。

use std::io::{Cursor, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};

use super::QrConfig;

/// 允许访问本机明文 HTTP 的配置，仅用于连接测试服务。
pub(crate) fn local_config() -> QrConfig {
    QrConfig {
        require_https: false,
        allow_private_network: true,
        ..QrConfig::default()
    }
}

pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    png_filled(width, height, Rgba([200, 30, 30, 255]))
}

pub(crate) fn png_filled(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
    let img = ImageBuffer::from_pixel(width, height, color);
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("failed to encode test image");
    cursor.into_inner()
}

/// 启动只响应一次的本地 HTTP 服务，返回请求地址与服务线程。
///
/// `content_length` 为 `None` 时不发送该头，响应体以关闭连接结束。
/// 客户端可能提前断开，因此写入错误被忽略。
pub(crate) fn serve_once(
    status: u16,
    content_length: Option<usize>,
    body: Vec<u8>,
) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server failed");
    let addr = listener.local_addr().expect("read local addr failed");

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept failed");

        let mut req_buf = [0u8; 1024];
        let _ = stream.read(&mut req_buf);

        let mut head = format!("HTTP/1.1 {} Test\r\nContent-Type: image/png\r\n", status);
        if let Some(len) = content_length {
            head.push_str(&format!("Content-Length: {}\r\n", len));
        }
        if (300..400).contains(&status) {
            head.push_str("Location: http://127.0.0.1:1/redirected.png\r\n");
        }
        head.push_str("Connection: close\r\n\r\n");

        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(&body);
        let _ = stream.flush();
    });

    (format!("http://127.0.0.1:{}/logo.png", addr.port()), server)
}

/// 启动接受连接但从不应答的本地服务，用于触发客户端超时。
///
/// 服务线程读到对端关闭（或 10 秒保护超时）后退出。
pub(crate) fn serve_hung() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server failed");
    let addr = listener.local_addr().expect("read local addr failed");

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept failed");
        let _ = stream.set_read_timeout(Some(Duration::from_secs(10)));

        let mut buf = [0u8; 1024];
        while let Ok(n) = stream.read(&mut buf) {
            if n == 0 {
                break;
            }
        }
    });

    (format!("http://127.0.0.1:{}/logo.png", addr.port()), server)
}
