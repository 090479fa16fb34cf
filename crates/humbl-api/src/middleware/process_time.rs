//! 요청 처리 시간 middleware.
//!
//! 모든 응답에 `X-Process-Time` 헤더를 추가하고 HTTP 메트릭을 기록합니다.

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::info;

use crate::metrics::{record_http_duration, record_http_request, record_http_response};

/// 처리 시간 측정 미들웨어.
pub async fn process_time_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    record_http_request(&method, &path);

    let mut response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed_secs = start.elapsed().as_secs_f64();

    record_http_response(&method, &path, status);
    record_http_duration(&method, &path, elapsed_secs);

    let header_value = format!("{:.4}", elapsed_secs);
    if let Ok(value) = HeaderValue::from_str(&header_value) {
        response.headers_mut().insert("x-process-time", value);
    }

    info!("'{} {}' - execution time: {} s", method, path, header_value);

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "OK"
    }

    #[tokio::test]
    async fn test_process_time_header_is_set() {
        let app = Router::new()
            .route("/test", get(test_handler))
            .layer(middleware::from_fn(process_time_middleware));

        let request = axum::http::Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let header = response
            .headers()
            .get("x-process-time")
            .expect("x-process-time header missing")
            .to_str()
            .unwrap();
        assert!(header.parse::<f64>().unwrap() >= 0.0);
    }
}
