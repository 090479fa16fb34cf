//! 분석 toolbox routes (humblCHANNEL, humblMOMENTUM, humblCOMPASS).

use axum::{http::StatusCode, Json, Router};
use chrono_tz::America::New_York;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{toolbox_error, ApiErrorResponse};
use crate::state::AppState;
use crate::toolbox::ToolboxError;

pub mod humbl_channel;
pub mod humbl_compass;
pub mod humbl_momentum;

/// toolbox router 구성.
pub fn toolbox_router(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .merge(humbl_channel::router(state))
        .merge(humbl_momentum::router(state))
        .merge(humbl_compass::router(state))
}

// =============================================================================
// 공통 쿼리 enum
// =============================================================================

/// Plotly 차트 템플릿.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartTemplate {
    #[default]
    HumblDark,
    HumblLight,
    Ggplot2,
    Seaborn,
    SimpleWhite,
    Plotly,
    PlotlyWhite,
    PlotlyDark,
    Presentation,
    Xgridoff,
    Ygridoff,
    Gridon,
    None,
}

impl ChartTemplate {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartTemplate::HumblDark => "humbl_dark",
            ChartTemplate::HumblLight => "humbl_light",
            ChartTemplate::Ggplot2 => "ggplot2",
            ChartTemplate::Seaborn => "seaborn",
            ChartTemplate::SimpleWhite => "simple_white",
            ChartTemplate::Plotly => "plotly",
            ChartTemplate::PlotlyWhite => "plotly_white",
            ChartTemplate::PlotlyDark => "plotly_dark",
            ChartTemplate::Presentation => "presentation",
            ChartTemplate::Xgridoff => "xgridoff",
            ChartTemplate::Ygridoff => "ygridoff",
            ChartTemplate::Gridon => "gridon",
            ChartTemplate::None => "none",
        }
    }
}

/// 사용자 멤버십 등급.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub enum Membership {
    #[default]
    #[serde(rename = "anonymous")]
    Anonymous,
    #[serde(rename = "humblPEON")]
    HumblPeon,
    #[serde(rename = "humblPREMIUM")]
    HumblPremium,
    #[serde(rename = "humblPOWER")]
    HumblPower,
    #[serde(rename = "humblPERMANENT")]
    HumblPermanent,
    #[serde(rename = "admin")]
    Admin,
}

impl Membership {
    pub fn as_str(self) -> &'static str {
        match self {
            Membership::Anonymous => "anonymous",
            Membership::HumblPeon => "humblPEON",
            Membership::HumblPremium => "humblPREMIUM",
            Membership::HumblPower => "humblPOWER",
            Membership::HumblPermanent => "humblPERMANENT",
            Membership::Admin => "admin",
        }
    }
}

// =============================================================================
// Plotly 전달 타입 (렌더링 없이 그대로 전달)
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotlyTrace {
    #[serde(rename = "type")]
    pub trace_type: String,
    pub x: Vec<serde_json::Value>,
    pub y: Vec<serde_json::Value>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub line: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotlyLayout {
    #[serde(default)]
    pub title: serde_json::Value,
    #[serde(default)]
    pub xaxis: serde_json::Value,
    #[serde(default)]
    pub yaxis: serde_json::Value,
    #[serde(default)]
    pub template: serde_json::Value,
    #[serde(default)]
    pub shapes: Vec<serde_json::Value>,
}

/// toolbox가 반환하는 차트 페이로드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPayload {
    pub data: Vec<PlotlyTrace>,
    pub layout: PlotlyLayout,
}

// =============================================================================
// 공통 헬퍼
// =============================================================================

pub(crate) fn default_symbols() -> String {
    "AAPL,NVDA,TSLA".to_string()
}

pub(crate) fn default_start_date() -> String {
    "2000-01-01".to_string()
}

/// 뉴욕 기준 오늘 날짜 (시장 날짜 경계).
pub(crate) fn today_ny() -> String {
    chrono::Utc::now()
        .with_timezone(&New_York)
        .date_naive()
        .to_string()
}

pub(crate) fn default_true() -> bool {
    true
}

/// toolbox 결과 행을 타입 있는 모델로 역직렬화합니다.
pub(crate) fn parse_rows<T: DeserializeOwned>(
    rows: Vec<serde_json::Value>,
) -> Result<Vec<T>, (StatusCode, Json<ApiErrorResponse>)> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row)
                .map_err(|e| toolbox_error(ToolboxError::InvalidPayload(e.to_string())))
        })
        .collect()
}

/// 차트 요청에 대한 toolbox 차트 페이로드를 파싱합니다.
pub(crate) fn parse_chart(
    chart: Option<serde_json::Value>,
) -> Result<ChartPayload, (StatusCode, Json<ApiErrorResponse>)> {
    let value = chart.ok_or_else(|| {
        toolbox_error(ToolboxError::InvalidPayload(
            "chart requested but missing from toolbox result".to_string(),
        ))
    })?;
    serde_json::from_value(value)
        .map_err(|e| toolbox_error(ToolboxError::InvalidPayload(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_template_round_trip() {
        let template: ChartTemplate = serde_json::from_str(r#""humbl_dark""#).unwrap();
        assert_eq!(template.as_str(), "humbl_dark");

        let template: ChartTemplate = serde_json::from_str(r#""simple_white""#).unwrap();
        assert_eq!(template.as_str(), "simple_white");
    }

    #[test]
    fn test_invalid_template_rejected() {
        let result = serde_json::from_str::<ChartTemplate>(r#""neon""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_membership_renames() {
        let membership: Membership = serde_json::from_str(r#""humblPOWER""#).unwrap();
        assert_eq!(membership.as_str(), "humblPOWER");
    }

    #[test]
    fn test_today_ny_is_iso_date() {
        let today = today_ny();
        assert_eq!(today.len(), 10);
        assert!(today.contains('-'));
    }
}
