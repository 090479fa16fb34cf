//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiErrorResponse;
use crate::response::HumblResponse;
use crate::routes::core::{FlushData, RedisHealthData};
use crate::routes::openbb::{LastCloseData, LastCloseResponse};

/// humblAPI 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "humblAPI",
        version = env!("CARGO_PKG_VERSION"),
        description = "REST API facade over the humbl analytics toolbox with response caching"
    ),
    paths(
        crate::routes::core::read_root,
        crate::routes::core::health_check,
        crate::routes::core::redis_health,
        crate::routes::core::flush_redis,
        crate::routes::openbb::latest_price,
        crate::routes::openbb::last_close,
        crate::routes::portfolio::user_table,
    ),
    components(schemas(
        ApiErrorResponse,
        FlushData,
        RedisHealthData,
        LastCloseData,
        LastCloseResponse,
        HumblResponse<FlushData>,
        HumblResponse<RedisHealthData>,
        HumblResponse<LastCloseResponse>,
    )),
    tags(
        (name = "core", description = "서버/cache 상태 및 관리"),
        (name = "openbb", description = "가격 데이터 조회"),
        (name = "portfolio", description = "워치리스트 데이터")
    )
)]
pub struct ApiDoc;

/// Swagger UI router 생성.
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_builds() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string(&spec).unwrap();

        assert!(json.contains("/flush-redis"));
        assert!(json.contains("/api/v1/last-close"));
        assert!(json.contains("ApiErrorResponse"));
    }

    #[test]
    fn test_swagger_ui_router_creates() {
        let _router: Router<()> = swagger_ui_router();
    }
}
