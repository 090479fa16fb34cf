//! OpenBB 가격 데이터 routes.

use axum::{
    extract::{Query, State},
    middleware,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::error::{toolbox_error, ApiResult};
use crate::middleware::{response_cache_middleware, ResponseCacheState};
use crate::response::HumblResponse;
use crate::routes::parse_symbols;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct PriceQuery {
    /// 쉼표로 구분된 심볼 목록
    #[serde(default = "default_symbols")]
    symbols: String,
    /// 가격 데이터 공급자
    #[serde(default = "default_provider")]
    provider: String,
}

fn default_symbols() -> String {
    "AAPL,NVDA,TSLA".to_string()
}

fn default_provider() -> String {
    "yfinance".to_string()
}

/// 직전 종가 한 행.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LastCloseData {
    pub symbol: String,
    pub prev_close: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LastCloseResponse {
    pub data: Vec<LastCloseData>,
}

/// 최신 가격 조회 (실시간 데이터이므로 cache 없음).
#[utoipa::path(
    get,
    path = "/api/v1/latest-price",
    tag = "openbb",
    params(PriceQuery),
    responses(
        (status = 200, description = "심볼별 최신 가격"),
        (status = 400, description = "symbols 파라미터 오류", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn latest_price(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PriceQuery>,
) -> ApiResult<Json<Vec<serde_json::Value>>> {
    let symbols = parse_symbols(&query.symbols)?;

    let result = state
        .toolbox
        .latest_price(&symbols, &query.provider)
        .await
        .map_err(toolbox_error)?;

    Ok(Json(result.rows))
}

/// 직전 종가 조회.
#[utoipa::path(
    get,
    path = "/api/v1/last-close",
    tag = "openbb",
    params(PriceQuery),
    responses(
        (status = 200, description = "심볼별 직전 종가", body = HumblResponse<LastCloseResponse>),
        (status = 400, description = "symbols 파라미터 오류", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn last_close(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PriceQuery>,
) -> ApiResult<Json<HumblResponse<LastCloseResponse>>> {
    let symbols = parse_symbols(&query.symbols)?;

    let result = state
        .toolbox
        .last_close(&symbols, &query.provider)
        .await
        .map_err(toolbox_error)?;

    let data = super::toolbox::parse_rows::<LastCloseData>(result.rows)?;

    Ok(Json(
        HumblResponse::ok(LastCloseResponse { data }).with_warnings(result.warnings),
    ))
}

/// openbb router 구성. last-close만 cache됩니다 (86000초).
pub fn openbb_router(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/latest-price", get(latest_price))
        .route(
            "/last-close",
            get(last_close).layer(middleware::from_fn_with_state(
                ResponseCacheState::new(state, "last_close", 86000),
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
        openbb_router(&state).with_state(state)
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
    async fn test_latest_price_returns_raw_rows() {
        let (status, json) = get_json("/latest-price?symbols=AAPL,NVDA").await;

        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["symbol"], "AAPL");
        assert!(rows[0]["last_price"].is_number());
    }

    #[tokio::test]
    async fn test_latest_price_empty_symbols_rejected() {
        let (status, json) = get_json("/latest-price?symbols=").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Symbols parameter cannot be empty");
    }

    #[tokio::test]
    async fn test_last_close_typed_envelope() {
        let (status, json) = get_json("/last-close?symbols=TSLA").await;

        assert_eq!(status, StatusCode::OK);
        let data = json["response_data"]["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["symbol"], "TSLA");
        assert!(data[0]["prev_close"].is_number());
        assert_eq!(json["status_code"], 200);
    }

    #[tokio::test]
    async fn test_last_close_empty_symbols_rejected() {
        let (status, _) = get_json("/last-close?symbols=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
