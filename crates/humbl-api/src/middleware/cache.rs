//! 응답 cache middleware.
//!
//! route별로 namespace와 TTL을 지정해 GET 응답 본문을 통째로
//! cache합니다. 히트 시 핸들러를 건너뛰고 저장된 JSON을 재생하며,
//! `X-Cache: HIT|MISS` 헤더로 결과를 표시합니다.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use humbl_cache::{query_pairs, request_key, CacheBackend};
use std::sync::Arc;
use tracing::{error, warn};

use crate::error::cache_error;
use crate::metrics::record_cache_lookup;
use crate::state::AppState;

/// route별 cache 설정.
#[derive(Clone)]
pub struct ResponseCacheState {
    cache: Option<Arc<dyn CacheBackend>>,
    key_prefix: String,
    namespace: &'static str,
    ttl_secs: u64,
}

impl ResponseCacheState {
    /// 애플리케이션 상태에서 route별 cache 설정을 만듭니다.
    pub fn new(app: &AppState, namespace: &'static str, ttl_secs: u64) -> Self {
        Self {
            cache: app.cache.clone(),
            key_prefix: app.cache_key_prefix.clone(),
            namespace,
            ttl_secs,
        }
    }
}

/// 응답 cache 미들웨어.
///
/// cache 미구성 시와 GET 이외의 메서드는 그대로 통과합니다.
/// 저장소 읽기 실패는 오래된 데이터 제공 대신 500으로 처리하고,
/// 쓰기 실패는 경고만 남기고 응답은 정상 반환합니다.
pub async fn response_cache_middleware(
    State(state): State<ResponseCacheState>,
    request: Request,
    next: Next,
) -> Response {
    let cache = match &state.cache {
        Some(cache) => Arc::clone(cache),
        None => return next.run(request).await,
    };

    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = request_key(
        &state.key_prefix,
        state.namespace,
        request.method().as_str(),
        request.uri().path(),
        &query_pairs(request.uri().query()),
    );

    match cache.get_raw(&key).await {
        Ok(Some(body)) => {
            record_cache_lookup(state.namespace, true);
            return replay_json(body, "HIT");
        }
        Ok(None) => {
            record_cache_lookup(state.namespace, false);
        }
        Err(e) => {
            error!(error = %e, namespace = state.namespace, "Cache read failed");
            return cache_error(e).into_response();
        }
    }

    let response = next.run(request).await;

    // 성공한 JSON 응답만 cache 대상
    if response.status() != StatusCode::OK || !is_json(&response) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, "Failed to buffer response body");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if let Err(e) = cache.set_raw(&key, &bytes, state.ttl_secs).await {
        warn!(error = %e, namespace = state.namespace, "Cache write failed, serving uncached");
    }

    let mut response = Response::from_parts(parts, Body::from(bytes));
    response
        .headers_mut()
        .insert("x-cache", HeaderValue::from_static("MISS"));
    response
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

fn replay_json(body: Vec<u8>, cache_status: &'static str) -> Response {
    let mut response = Response::new(Body::from(body));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
        .headers_mut()
        .insert("x-cache", HeaderValue::from_static(cache_status));
    response
}
