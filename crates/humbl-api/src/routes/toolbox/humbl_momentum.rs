//! humblMOMENTUM route.

use axum::{
    extract::{Query, State},
    middleware,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{
    default_start_date, default_symbols, parse_chart, parse_rows, today_ny, ChartPayload,
    ChartTemplate, Membership,
};
use crate::error::{toolbox_error, ApiResult};
use crate::middleware::{response_cache_middleware, ResponseCacheState};
use crate::response::HumblResponse;
use crate::routes::parse_symbols;
use crate::state::AppState;
use crate::toolbox::MomentumRequest;

/// 모멘텀 계산 방법.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentumMethod {
    #[default]
    Log,
    Simple,
    Shift,
}

impl MomentumMethod {
    fn as_str(self) -> &'static str {
        match self {
            MomentumMethod::Log => "log",
            MomentumMethod::Simple => "simple",
            MomentumMethod::Shift => "shift",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MomentumQuery {
    #[serde(default = "default_symbols")]
    symbols: String,
    #[serde(default)]
    method: MomentumMethod,
    #[serde(default = "default_window")]
    window: String,
    #[serde(default = "default_start_date")]
    start_date: String,
    end_date: Option<String>,
    #[serde(default)]
    chart: bool,
    #[serde(default)]
    template: ChartTemplate,
    #[serde(default)]
    membership: Membership,
}

fn default_window() -> String {
    "1d".to_string()
}

/// 모멘텀 데이터 한 행.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumblMomentumData {
    pub date: String,
    pub symbol: String,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub shifted: Option<f64>,
    #[serde(default)]
    pub momentum: Option<f64>,
    #[serde(default)]
    pub momentum_signal: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HumblMomentumTable {
    pub data: Vec<HumblMomentumData>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HumblMomentumResponse {
    Data(HumblMomentumTable),
    Chart(ChartPayload),
}

async fn humbl_momentum(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MomentumQuery>,
) -> ApiResult<Json<HumblResponse<HumblMomentumResponse>>> {
    let symbols = parse_symbols(&query.symbols)?;

    let request = MomentumRequest {
        symbols,
        method: query.method.as_str().to_string(),
        window: query.window,
        start_date: query.start_date,
        end_date: query.end_date.unwrap_or_else(today_ny),
        chart: query.chart,
        template: query.template.as_str().to_string(),
        membership: query.membership.as_str().to_string(),
    };

    let result = state
        .toolbox
        .momentum(&request)
        .await
        .map_err(toolbox_error)?;

    let response = if query.chart {
        HumblMomentumResponse::Chart(parse_chart(result.chart)?)
    } else {
        HumblMomentumResponse::Data(HumblMomentumTable {
            data: parse_rows(result.rows)?,
        })
    };

    Ok(Json(
        HumblResponse::ok(response).with_warnings(result.warnings),
    ))
}

/// humblMOMENTUM router (86400초 cache).
pub fn router(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new().route(
        "/humblMOMENTUM",
        get(humbl_momentum).layer(middleware::from_fn_with_state(
            ResponseCacheState::new(state, "humblMOMENTUM", 86400),
            response_cache_middleware,
        )),
    )
}
