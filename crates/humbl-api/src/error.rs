//! 통합 API 에러 응답 타입.
//!
//! 모든 엔드포인트에서 일관된 에러 형식을 제공합니다. 에러 분류:
//! - 잘못된 입력 → 400 `VALIDATION_ERROR`
//! - 업스트림 toolbox 실패 → 502 `TOOLBOX_ERROR`
//! - cache 백엔드 연결 실패 → 500 `CACHE_ERROR`
//! - flush 토큰 불일치 → 403 `FORBIDDEN`

use axum::http::StatusCode;
use axum::Json;
use humbl_cache::CacheError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::toolbox::ToolboxError;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Symbols parameter cannot be empty"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "VALIDATION_ERROR", "TOOLBOX_ERROR")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 400 - 요청 파라미터 검증 실패.
pub fn validation_error(message: impl Into<String>) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiErrorResponse::new("VALIDATION_ERROR", message)),
    )
}

/// 502 - 업스트림 toolbox 호출 실패.
pub fn toolbox_error(err: ToolboxError) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::BAD_GATEWAY,
        Json(ApiErrorResponse::new("TOOLBOX_ERROR", err.to_string())),
    )
}

/// 500 - cache 백엔드 실패.
pub fn cache_error(err: CacheError) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiErrorResponse::new("CACHE_ERROR", err.to_string())),
    )
}

/// 500 - cache 백엔드 미구성 상태에서 cache 전용 작업 요청.
pub fn cache_unavailable() -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiErrorResponse::new(
            "CACHE_ERROR",
            "Redis cache is not configured",
        )),
    )
}

/// 403 - 인증 토큰 불일치.
pub fn forbidden(message: impl Into<String>) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::FORBIDDEN,
        Json(ApiErrorResponse::new("FORBIDDEN", message)),
    )
}
