//! humblCOMPASS routes.
//!
//! 국가별 매크로 regime 데이터와 regime 기반 backtest를 제공합니다.

use axum::{
    extract::{Query, State},
    middleware,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use super::{
    default_start_date, default_symbols, parse_chart, parse_rows, today_ny, ChartPayload,
    ChartTemplate, Membership, PlotlyLayout, PlotlyTrace,
};
use crate::error::{toolbox_error, ApiResult};
use crate::middleware::{response_cache_middleware, ResponseCacheState};
use crate::response::HumblResponse;
use crate::routes::parse_symbols;
use crate::state::AppState;
use crate::toolbox::{CompassBacktestRequest, CompassRequest, ToolboxError};

/// compass TTL: 약 1개월.
const COMPASS_TTL_SECS: u64 = 2_629_757;

/// 지원 국가 및 국가 그룹.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Country {
    G20,
    G7,
    Asia5,
    NorthAmerica,
    Europe4,
    Australia,
    Brazil,
    Canada,
    China,
    France,
    Germany,
    India,
    Indonesia,
    Italy,
    Japan,
    Mexico,
    SouthAfrica,
    SouthKorea,
    Spain,
    Turkey,
    UnitedKingdom,
    #[default]
    UnitedStates,
    All,
}

impl Country {
    fn as_str(self) -> &'static str {
        match self {
            Country::G20 => "g20",
            Country::G7 => "g7",
            Country::Asia5 => "asia5",
            Country::NorthAmerica => "north_america",
            Country::Europe4 => "europe4",
            Country::Australia => "australia",
            Country::Brazil => "brazil",
            Country::Canada => "canada",
            Country::China => "china",
            Country::France => "france",
            Country::Germany => "germany",
            Country::India => "india",
            Country::Indonesia => "indonesia",
            Country::Italy => "italy",
            Country::Japan => "japan",
            Country::Mexico => "mexico",
            Country::SouthAfrica => "south_africa",
            Country::SouthKorea => "south_korea",
            Country::Spain => "spain",
            Country::Turkey => "turkey",
            Country::UnitedKingdom => "united_kingdom",
            Country::UnitedStates => "united_states",
            Country::All => "all",
        }
    }
}

/// backtest 가격 데이터 공급자.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompassProvider {
    Fmp,
    #[default]
    Yfinance,
}

impl CompassProvider {
    fn as_str(self) -> &'static str {
        match self {
            CompassProvider::Fmp => "fmp",
            CompassProvider::Yfinance => "yfinance",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CompassQuery {
    #[serde(default)]
    country: Country,
    #[serde(default = "default_start_date")]
    start_date: String,
    end_date: Option<String>,
    z_score: Option<String>,
    #[serde(default)]
    chart: bool,
    #[serde(default)]
    template: ChartTemplate,
    #[serde(default)]
    membership: Membership,
    #[serde(default)]
    recommendations: bool,
}

#[derive(Debug, Deserialize)]
pub struct CompassBacktestQuery {
    #[serde(default)]
    country: Country,
    #[serde(default = "default_symbols")]
    symbols: String,
    #[serde(default = "default_start_date")]
    start_date: String,
    end_date: Option<String>,
    #[serde(default)]
    provider: CompassProvider,
    #[serde(default)]
    chart: bool,
    #[serde(default)]
    template: ChartTemplate,
    #[serde(default)]
    membership: Membership,
}

/// compass 데이터 한 행.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumblCompassData {
    pub date_month_start: String,
    pub country: String,
    pub cpi: f64,
    pub cpi_3m_delta: f64,
    #[serde(default)]
    pub cpi_zscore: Option<f64>,
    pub cli: f64,
    pub cli_3m_delta: f64,
    #[serde(default)]
    pub cli_zscore: Option<f64>,
}

/// 가장 최근 regime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestHumblRegime {
    pub date: String,
    pub humbl_regime: String,
}

#[derive(Debug, Serialize)]
pub struct HumblCompassTable {
    pub data: Vec<HumblCompassData>,
    pub latest_humbl_regime: LatestHumblRegime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct HumblCompassChart {
    pub data: Vec<PlotlyTrace>,
    pub layout: PlotlyLayout,
    pub latest_humbl_regime: LatestHumblRegime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HumblCompassResponse {
    Data(HumblCompassTable),
    Chart(HumblCompassChart),
}

/// backtest 데이터 한 행 (regime별 통계).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumblCompassBacktestData {
    pub symbol: String,
    pub humbl_regime: String,
    pub avg_total_return_pct: f64,
    pub avg_ann_return_pct: f64,
    pub avg_win_rate_pct: f64,
    pub avg_volatility: f64,
    pub avg_sharpe_ratio: f64,
    pub avg_days_in_regime: f64,
    pub instance_count: i64,
    pub cumulative_investment_growth: f64,
    pub investment_growth_pct: f64,
    pub total_ending_investment_value: f64,
    pub total_win_count: i64,
    pub total_loss_count: i64,
    pub avg_win_count_per_instance: f64,
    pub avg_loss_count_per_instance: f64,
    pub min_return_pct: f64,
    pub max_return_pct: f64,
    pub max_win_days: i64,
    pub min_win_days: i64,
    pub max_loss_days: i64,
    pub min_loss_days: i64,
    pub max_drawdown_pct: f64,
    pub avg_drawdown_pct: f64,
    pub avg_recovery_days: f64,
    pub max_recovery_days: i64,
}

#[derive(Debug, Serialize)]
pub struct HumblCompassBacktestTable {
    pub data: Vec<HumblCompassBacktestData>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HumblCompassBacktestResponse {
    Data(HumblCompassBacktestTable),
    Chart(ChartPayload),
}

/// 마지막 행에서 최신 regime을 추출합니다.
fn latest_regime(
    rows: &[serde_json::Value],
) -> Result<LatestHumblRegime, (axum::http::StatusCode, Json<crate::error::ApiErrorResponse>)> {
    let last = rows.last().ok_or_else(|| {
        toolbox_error(ToolboxError::InvalidPayload(
            "compass result contains no rows".to_string(),
        ))
    })?;

    let date = last
        .get("date_month_start")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| {
            toolbox_error(ToolboxError::InvalidPayload(
                "compass row missing date_month_start".to_string(),
            ))
        })?;
    let regime = last
        .get("humbl_regime")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| {
            toolbox_error(ToolboxError::InvalidPayload(
                "compass row missing humbl_regime".to_string(),
            ))
        })?;

    Ok(LatestHumblRegime {
        date: date.to_string(),
        humbl_regime: regime.to_string(),
    })
}

async fn humbl_compass(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CompassQuery>,
) -> ApiResult<Json<HumblResponse<HumblCompassResponse>>> {
    let request = CompassRequest {
        country: query.country.as_str().to_string(),
        start_date: query.start_date,
        end_date: query.end_date.unwrap_or_else(today_ny),
        z_score: query.z_score,
        chart: query.chart,
        template: query.template.as_str().to_string(),
        membership: query.membership.as_str().to_string(),
        recommendations: query.recommendations,
    };

    let result = state
        .toolbox
        .compass(&request)
        .await
        .map_err(toolbox_error)?;

    let mut warnings = result.warnings;

    // 추천 정보는 부가 데이터: 없거나 파싱 불가여도 본 응답은 유지하고 경고만 추가
    let recommendations = result
        .extra
        .as_ref()
        .and_then(|extra| extra.get("humbl_regime_recommendations"))
        .cloned();
    if query.recommendations && recommendations.is_none() {
        warn!(country = query.country.as_str(), "Regime recommendations unavailable");
        warnings.push("Regime recommendations are unavailable for this request".to_string());
    }

    let latest_humbl_regime = latest_regime(&result.rows)?;

    let response = if query.chart {
        let chart = parse_chart(result.chart)?;
        HumblCompassResponse::Chart(HumblCompassChart {
            data: chart.data,
            layout: chart.layout,
            latest_humbl_regime,
            recommendations,
        })
    } else {
        HumblCompassResponse::Data(HumblCompassTable {
            data: parse_rows(result.rows)?,
            latest_humbl_regime,
            recommendations,
        })
    };

    Ok(Json(HumblResponse::ok(response).with_warnings(warnings)))
}

async fn humbl_compass_backtest(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CompassBacktestQuery>,
) -> ApiResult<Json<HumblResponse<HumblCompassBacktestResponse>>> {
    let symbols = parse_symbols(&query.symbols)?;

    let request = CompassBacktestRequest {
        symbols,
        country: query.country.as_str().to_string(),
        start_date: query.start_date,
        end_date: query.end_date.unwrap_or_else(today_ny),
        provider: query.provider.as_str().to_string(),
        chart: query.chart,
        template: query.template.as_str().to_string(),
        membership: query.membership.as_str().to_string(),
    };

    let result = state
        .toolbox
        .compass_backtest(&request)
        .await
        .map_err(toolbox_error)?;

    let response = if query.chart {
        HumblCompassBacktestResponse::Chart(parse_chart(result.chart)?)
    } else {
        HumblCompassBacktestResponse::Data(HumblCompassBacktestTable {
            data: parse_rows(result.rows)?,
        })
    };

    Ok(Json(
        HumblResponse::ok(response).with_warnings(result.warnings),
    ))
}

/// humblCOMPASS router (약 1개월 cache).
pub fn router(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/humblCOMPASS",
            get(humbl_compass).layer(middleware::from_fn_with_state(
                ResponseCacheState::new(state, "humblCOMPASS", COMPASS_TTL_SECS),
                response_cache_middleware,
            )),
        )
        .route(
            "/humblCOMPASS/backtest",
            get(humbl_compass_backtest).layer(middleware::from_fn_with_state(
                ResponseCacheState::new(state, "humblCOMPASS_backtest", COMPASS_TTL_SECS),
                response_cache_middleware,
            )),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{create_test_state, AppState};
    use crate::toolbox::MockToolbox;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app_with(state: AppState) -> Router {
        let state = Arc::new(state);
        router(&state).with_state(state)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_compass_latest_regime_from_last_row() {
        let app = app_with(create_test_state());
        let (status, json) = get_json(app, "/humblCOMPASS?country=united_states").await;

        assert_eq!(status, StatusCode::OK);
        let latest = &json["response_data"]["latest_humbl_regime"];
        assert_eq!(latest["humbl_regime"], "humblBLOAT");
        assert_eq!(latest["date"], "2024-02-01");
    }

    #[tokio::test]
    async fn test_compass_recommendations_included() {
        let app = app_with(create_test_state());
        let (status, json) = get_json(app, "/humblCOMPASS?recommendations=true").await;

        assert_eq!(status, StatusCode::OK);
        let recs = &json["response_data"]["recommendations"];
        assert!(recs["asset_classes"].is_array());
        assert!(json["warnings"].is_null());
    }

    #[tokio::test]
    async fn test_compass_invalid_country_rejected() {
        let app = app_with(create_test_state());
        let (status, _) = get_json(app, "/humblCOMPASS?country=atlantis").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_compass_upstream_failure_is_bad_gateway() {
        let state = AppState::new(Arc::new(MockToolbox::failing()));
        let app = app_with(state);
        let (status, json) = get_json(app, "/humblCOMPASS").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["code"], "TOOLBOX_ERROR");
    }

    #[tokio::test]
    async fn test_backtest_returns_regime_stats() {
        let app = app_with(create_test_state());
        let (status, json) = get_json(app, "/humblCOMPASS/backtest?symbols=AAPL,MSFT").await;

        assert_eq!(status, StatusCode::OK);
        let data = json["response_data"]["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["humbl_regime"], "humblBOOM");
        assert!(data[0]["avg_sharpe_ratio"].is_number());
    }

    #[tokio::test]
    async fn test_backtest_empty_symbols_rejected() {
        let app = app_with(create_test_state());
        let (status, json) = get_json(app, "/humblCOMPASS/backtest?symbols=").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }
}
