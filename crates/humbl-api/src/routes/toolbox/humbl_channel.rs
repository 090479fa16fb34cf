//! humblCHANNEL route.
//!
//! Mandelbrot channel (가격 지지/저항 밴드) 데이터를 반환합니다.

use axum::{
    extract::{Query, State},
    middleware,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{
    default_start_date, default_symbols, default_true, parse_chart, parse_rows, today_ny,
    ChartPayload, ChartTemplate,
};
use crate::error::{toolbox_error, ApiResult};
use crate::middleware::{response_cache_middleware, ResponseCacheState};
use crate::response::HumblResponse;
use crate::routes::parse_symbols;
use crate::state::AppState;
use crate::toolbox::ChannelRequest;

/// 실현 변동성 계산 방법.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RvMethod {
    #[default]
    Std,
    Parkinson,
    GarmanKlass,
    Gk,
    HodgesTompkins,
    Ht,
    RogersSatchell,
    Rs,
    YangZhang,
    Yz,
    SquaredReturns,
    Sq,
}

impl RvMethod {
    fn as_str(self) -> &'static str {
        match self {
            RvMethod::Std => "std",
            RvMethod::Parkinson => "parkinson",
            RvMethod::GarmanKlass => "garman_klass",
            RvMethod::Gk => "gk",
            RvMethod::HodgesTompkins => "hodges_tompkins",
            RvMethod::Ht => "ht",
            RvMethod::RogersSatchell => "rogers_satchell",
            RvMethod::Rs => "rs",
            RvMethod::YangZhang => "yang_zhang",
            RvMethod::Yz => "yz",
            RvMethod::SquaredReturns => "squared_returns",
            RvMethod::Sq => "sq",
        }
    }
}

/// Range/STD 계산 방법.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub enum RsMethod {
    #[default]
    #[serde(rename = "RS")]
    Rs,
    #[serde(rename = "RS_min")]
    RsMin,
    #[serde(rename = "RS_max")]
    RsMax,
    #[serde(rename = "RS_mean")]
    RsMean,
}

impl RsMethod {
    fn as_str(self) -> &'static str {
        match self {
            RsMethod::Rs => "RS",
            RsMethod::RsMin => "RS_min",
            RsMethod::RsMax => "RS_max",
            RsMethod::RsMean => "RS_mean",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChannelQuery {
    #[serde(default = "default_symbols")]
    symbols: String,
    #[serde(default = "default_interval")]
    interval: String,
    #[serde(default = "default_start_date")]
    start_date: String,
    end_date: Option<String>,
    #[serde(default = "default_provider")]
    provider: String,
    #[serde(default = "default_window")]
    window: String,
    #[serde(default = "default_true")]
    rv_adjustment: bool,
    #[serde(default)]
    rv_method: RvMethod,
    #[serde(default)]
    rs_method: RsMethod,
    #[serde(default)]
    rv_grouped_mean: bool,
    #[serde(default)]
    live_price: bool,
    #[serde(default)]
    historical: bool,
    #[serde(default)]
    chart: bool,
    #[serde(default)]
    template: ChartTemplate,
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_provider() -> String {
    "yfinance".to_string()
}

fn default_window() -> String {
    "1mo".to_string()
}

/// channel 데이터 한 행.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumblChannelData {
    pub date: String,
    pub symbol: String,
    pub bottom_price: f64,
    pub recent_price: f64,
    pub top_price: f64,
}

#[derive(Debug, Serialize)]
pub struct HumblChannelTable {
    pub data: Vec<HumblChannelData>,
}

/// 데이터 또는 차트 응답.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HumblChannelResponse {
    Data(HumblChannelTable),
    Chart(ChartPayload),
}

async fn humbl_channel(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChannelQuery>,
) -> ApiResult<Json<HumblResponse<HumblChannelResponse>>> {
    let symbols = parse_symbols(&query.symbols)?;

    let request = ChannelRequest {
        symbols,
        interval: query.interval,
        start_date: query.start_date,
        end_date: query.end_date.unwrap_or_else(today_ny),
        provider: query.provider,
        window: query.window,
        rv_adjustment: query.rv_adjustment,
        rv_method: query.rv_method.as_str().to_string(),
        rs_method: query.rs_method.as_str().to_string(),
        rv_grouped_mean: query.rv_grouped_mean,
        live_price: query.live_price,
        historical: query.historical,
        chart: query.chart,
        template: query.template.as_str().to_string(),
    };

    let result = state
        .toolbox
        .mandelbrot_channel(&request)
        .await
        .map_err(toolbox_error)?;

    let response = if query.chart {
        HumblChannelResponse::Chart(parse_chart(result.chart)?)
    } else {
        HumblChannelResponse::Data(HumblChannelTable {
            data: parse_rows(result.rows)?,
        })
    };

    Ok(Json(
        HumblResponse::ok(response).with_warnings(result.warnings),
    ))
}

/// humblCHANNEL router (86000초 cache).
pub fn router(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new().route(
        "/humblCHANNEL",
        get(humbl_channel).layer(middleware::from_fn_with_state(
            ResponseCacheState::new(state, "humblCHANNEL", 86000),
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
        router(&state).with_state(state)
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
    async fn test_channel_returns_rows_per_symbol() {
        let (status, json) = get_json("/humblCHANNEL?symbols=AAPL,MSFT").await;

        assert_eq!(status, StatusCode::OK);
        let data = json["response_data"]["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["symbol"], "AAPL");
        assert!(data[0]["bottom_price"].is_number());
        assert!(data[0]["top_price"].is_number());
    }

    #[tokio::test]
    async fn test_channel_empty_symbols_rejected() {
        let (status, json) = get_json("/humblCHANNEL?symbols=").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert!(json["message"]
            .as_str()
            .unwrap()
            .contains("cannot be empty"));
    }

    #[tokio::test]
    async fn test_channel_invalid_rv_method_rejected() {
        let (status, _) = get_json("/humblCHANNEL?symbols=AAPL&rv_method=bogus").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_rv_method_aliases() {
        let method: RvMethod = serde_json::from_str(r#""gk""#).unwrap();
        assert_eq!(method.as_str(), "gk");
        let method: RvMethod = serde_json::from_str(r#""yang_zhang""#).unwrap();
        assert_eq!(method.as_str(), "yang_zhang");
    }

    #[test]
    fn test_rs_method_renames() {
        let method: RsMethod = serde_json::from_str(r#""RS_mean""#).unwrap();
        assert_eq!(method.as_str(), "RS_mean");
    }
}
