use std::time::Instant;

use axum::{
    body::{Body, to_bytes},
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, error, info};
use uuid::Uuid;

/// 错误响应体最多读取的字节数
const ERROR_BODY_LIMIT: usize = 1024;

/// 记录每个请求的方法、路径、状态码和耗时；5xx 时额外记录响应体
pub async fn log_requests(req: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let span = tracing::info_span!("request", %request_id, %method, %path);

    async move {
        let started = Instant::now();
        let response = next.run(req).await;
        let status = response.status();
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if !status.is_server_error() {
            info!(status = status.as_u16(), elapsed_ms, "Request completed");
            return response;
        }

        let (mut parts, body) = response.into_parts();
        let bytes = match to_bytes(body, ERROR_BODY_LIMIT).await {
            Ok(b) => b,
            Err(e) => {
                error!("Failed to read error response body: {}", e);
                return Response::from_parts(parts, Body::empty());
            }
        };

        error!(
            status = status.as_u16(),
            elapsed_ms,
            "Server error occurred - Body: {}",
            String::from_utf8_lossy(&bytes)
        );

        // 重置body以便重新构建响应
        parts.headers.remove(axum::http::header::CONTENT_LENGTH);
        Response::from_parts(parts, Body::from(bytes))
    }
    .instrument(span)
    .await
}
