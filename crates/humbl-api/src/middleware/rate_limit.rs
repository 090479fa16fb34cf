//! Rate limiting middleware.
//!
//! IP별 token bucket으로 요청 빈도를 제한합니다.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::warn;

use crate::error::ApiErrorResponse;

/// Rate limiter 설정.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// IP당 분당 최대 요청 수
    pub requests_per_minute: u32,
    /// 순간적으로 추가 허용되는 요청 수
    pub burst_size: u32,
    /// 이 시간 동안 요청이 없는 버킷은 정리 대상
    pub idle_expiry: Duration,
}

impl RateLimitConfig {
    /// 버스트는 분당 한도의 10%.
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            requests_per_minute,
            burst_size: requests_per_minute / 10,
            idle_expiry: Duration::from_secs(60),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(600)
    }
}

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    capacity: f64,
    /// 초당 리필되는 토큰 수
    refill_per_sec: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(config: &RateLimitConfig) -> Self {
        let refill_per_sec = config.requests_per_minute as f64 / 60.0;
        let capacity = refill_per_sec + config.burst_size as f64;
        Self {
            tokens: capacity,
            capacity,
            refill_per_sec,
            last_refill: Instant::now(),
        }
    }

    /// 토큰 1개 소비를 시도하고, 실패 시 재시도까지의 대기 시간(초)을 반환합니다.
    fn try_acquire(&mut self) -> Option<u64> {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            None
        } else {
            Some(((1.0 - self.tokens) / self.refill_per_sec).ceil() as u64)
        }
    }
}

/// IP별 token bucket을 관리하는 rate limiter.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Arc<RwLock<HashMap<IpAddr, TokenBucket>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 요청 허용 여부 확인. 제한 시 재시도 대기 시간(초) 반환.
    pub async fn check(&self, ip: IpAddr) -> Option<u64> {
        let mut buckets = self.buckets.write().await;
        buckets
            .entry(ip)
            .or_insert_with(|| TokenBucket::new(&self.config))
            .try_acquire()
    }

    /// 유휴 버킷 정리.
    pub async fn cleanup(&self) {
        let threshold = Instant::now() - self.config.idle_expiry;
        let mut buckets = self.buckets.write().await;
        buckets.retain(|_, bucket| bucket.last_refill > threshold);
    }

    /// 현재 추적 중인 IP 수.
    pub async fn tracked_ips(&self) -> usize {
        self.buckets.read().await.len()
    }

    /// 유휴 버킷을 주기적으로 정리하는 백그라운드 태스크를 시작합니다.
    ///
    /// 정리가 없으면 IP별 버킷 맵이 무한히 자랍니다. 주기는
    /// `idle_expiry`와 같습니다.
    pub fn spawn_cleanup_task(&self) -> tokio::task::JoinHandle<()> {
        let limiter = self.clone();
        let period = self.config.idle_expiry;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // 첫 tick은 즉시 발생
            interval.tick().await;
            loop {
                interval.tick().await;
                limiter.cleanup().await;
            }
        })
    }
}

/// Rate limiting 미들웨어.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request);

    match limiter.check(ip).await {
        None => {
            counter!("rate_limit_requests_total", "status" => "allowed").increment(1);
            next.run(request).await
        }
        Some(retry_after) => {
            counter!("rate_limit_requests_total", "status" => "limited").increment(1);
            warn!(client_ip = %ip, retry_after, "Rate limit exceeded");

            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ApiErrorResponse::new(
                    "RATE_LIMITED",
                    "Rate limit exceeded. Please try again later.",
                )),
            )
                .into_response();

            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
    }
}

/// 클라이언트 IP 추출.
///
/// 프록시 뒤에 있을 경우를 위해 X-Forwarded-For, X-Real-IP를 우선
/// 확인하고, 없으면 loopback으로 간주합니다.
fn client_ip(request: &Request) -> IpAddr {
    if let Some(forwarded) = request.headers().get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first) = value.split(',').next() {
                if let Ok(ip) = first.trim().parse() {
                    return ip;
                }
            }
        }
    }

    if let Some(real_ip) = request.headers().get("x-real-ip") {
        if let Ok(value) = real_ip.to_str() {
            if let Ok(ip) = value.trim().parse() {
                return ip;
            }
        }
    }

    IpAddr::from([127, 0, 0, 1])
}
