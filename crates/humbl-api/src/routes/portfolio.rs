//! portfolio routes (user table).

use axum::{
    extract::{Query, State},
    middleware,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::error::{toolbox_error, ApiResult};
use crate::middleware::{response_cache_middleware, ResponseCacheState};
use crate::routes::parse_symbols;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserTableQuery {
    /// 쉼표로 구분된 워치리스트 심볼
    #[serde(default = "default_symbols")]
    symbols: String,
    /// 사용자 멤버십 등급
    #[serde(default = "default_membership")]
    membership: String,
}

fn default_symbols() -> String {
    "AAPL,NVDA,TSLA".to_string()
}

fn default_membership() -> String {
    "peon".to_string()
}

/// 워치리스트 테이블 조회.
#[utoipa::path(
    get,
    path = "/api/v1/user-table",
    tag = "portfolio",
    params(UserTableQuery),
    responses(
        (status = 200, description = "심볼별 워치리스트 데이터"),
        (status = 400, description = "symbols 파라미터 오류", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn user_table(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserTableQuery>,
) -> ApiResult<Json<Vec<serde_json::Value>>> {
    let symbols = parse_symbols(&query.symbols)?;

    let result = state
        .toolbox
        .user_table(&symbols, &query.membership)
        .await
        .map_err(toolbox_error)?;

    Ok(Json(result.rows))
}

/// portfolio router 구성 (86000초 cache).
pub fn portfolio_router(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new().route(
        "/user-table",
        get(user_table).layer(middleware::from_fn_with_state(
            ResponseCacheState::new(state, "user_table", 86000),
            response_cache_middleware,
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let state = Arc::new(create_test_state());
        portfolio_router(&state).with_state(state)
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_user_table_rows() {
        let (status, json) = get_json("/user-table?symbols=AAPL,NVDA&membership=peon").await;

        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0]["buy_price"].is_number());
        assert!(rows[0]["sell_price"].is_number());
    }

    #[tokio::test]
    async fn test_user_table_empty_symbols_rejected() {
        let (status, json) = get_json("/user-table?symbols=").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }
}
