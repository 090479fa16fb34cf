//! humblAPI 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다. toolbox 데이터 조회
//! 엔드포인트와 Redis 응답 cache, cache flush 관리 엔드포인트를
//! 제공합니다.

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use humbl_api::config::ApiConfig;
use humbl_api::metrics::setup_metrics_recorder;
use humbl_api::middleware::{
    process_time_middleware, rate_limit_middleware, RateLimitConfig, RateLimiter,
};
use humbl_api::openapi::swagger_ui_router;
use humbl_api::routes::create_api_router;
use humbl_api::state::AppState;
use humbl_api::toolbox::HttpToolbox;

/// AppState 초기화.
///
/// REDIS_URL이 설정되어 있으면 cache를 연결합니다. 연결 실패는
/// 경고만 남기고 cache 없이 계속합니다.
async fn create_app_state(config: &ApiConfig) -> AppState {
    let toolbox = Arc::new(HttpToolbox::new(&config.toolbox_base_url));
    let mut state = AppState::new(toolbox)
        .with_cache_key_prefix(&config.cache_key_prefix)
        .with_flush_token(config.flush_token.clone());

    if let Some(ref redis_url) = config.redis_url {
        state = state.with_redis(redis_url).await;
    } else {
        warn!("REDIS_URL not set, response caching will be disabled");
    }

    if config.flush_token.is_none() {
        warn!("FLUSH_API_TOKEN not set, /flush-redis will reject all requests");
    }

    state
}

/// CORS 미들웨어 구성.
///
/// CORS_ORIGINS가 설정되어 있으면 해당 origin만 허용합니다.
/// 설정되지 않으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let allow_origin = if config.cors_origins.is_empty() {
        // 개발: 모든 origin 허용
        warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
        AllowOrigin::any()
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();

        if origins.is_empty() {
            warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
            AllowOrigin::any()
        } else {
            info!("CORS configured with {} allowed origins", origins.len());
            AllowOrigin::list(origins)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(!config.cors_origins.is_empty())
        // preflight 요청 캐시 시간
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>, metrics_handle: PrometheusHandle, config: &ApiConfig) -> Router {
    // 메트릭 라우터 (별도 상태, Rate Limit 제외)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    // API 라우터 (Rate Limit 조건부 적용)
    let api_router = if config.rate_limit_disabled {
        info!("Rate limiting DISABLED (RATE_LIMIT_DISABLED=true)");
        create_api_router(&state).with_state(state)
    } else {
        let limiter = RateLimiter::new(RateLimitConfig::new(config.rate_limit_rpm));
        // 유휴 IP 버킷이 무한히 쌓이지 않도록 주기적으로 정리
        limiter.spawn_cleanup_task();
        info!(
            requests_per_minute = config.rate_limit_rpm,
            "Rate limiting configured"
        );
        create_api_router(&state)
            .with_state(state)
            .layer(middleware::from_fn_with_state(
                limiter,
                rate_limit_middleware,
            ))
    };

    Router::new()
        .merge(metrics_router)
        .merge(api_router)
        // OpenAPI 문서 및 Swagger UI
        .merge(swagger_ui_router())
        // 실행 시간 측정 + 메트릭 (모든 요청에 적용)
        .layer(middleware::from_fn(process_time_middleware))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초) - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer(config))
}

/// OpenAPI 스펙 내보내기 처리.
///
/// `--export-openapi` 플래그 또는 `EXPORT_OPENAPI` 환경변수가 설정된 경우
/// OpenAPI JSON 스펙을 stdout으로 출력하고 종료합니다.
fn handle_export_openapi() -> Result<(), Box<dyn std::error::Error>> {
    use humbl_api::openapi::ApiDoc;
    use utoipa::OpenApi as _;

    let export_flag = std::env::args().any(|arg| arg == "--export-openapi");
    let export_env = std::env::var("EXPORT_OPENAPI")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    if export_flag || export_env {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&spec)?;
        println!("{}", json);
        std::process::exit(0);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // OpenAPI 내보내기 처리 (서버 시작 전)
    handle_export_openapi()?;

    // tracing 초기화
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "humbl_api=info,tower_http=debug".into()),
        )
        .init();

    info!("Starting humblAPI server...");

    // Prometheus 메트릭 레코더 설정
    let metrics_handle = setup_metrics_recorder();
    info!("Prometheus metrics recorder initialized");

    // 설정 로드
    let config = ApiConfig::from_env();
    let addr = config.socket_addr().map_err(|e| {
        error!(
            host = %config.host,
            port = config.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다. API_HOST, API_PORT 환경변수를 확인하세요."
        );
        e
    })?;

    // AppState 생성 (Redis 연결 포함)
    let state = Arc::new(create_app_state(&config).await);

    info!(
        has_cache = state.has_cache(),
        cache_key_prefix = %state.cache_key_prefix,
        toolbox_base_url = %config.toolbox_base_url,
        "Application state initialized"
    );

    // 라우터 생성
    let app = create_router(state, metrics_handle, &config);

    // 서버 시작
    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
