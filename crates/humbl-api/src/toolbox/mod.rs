//! 분석 toolbox 경계.
//!
//! 모든 수치 계산은 외부 toolbox 서비스에 위임되며, 이 모듈은
//! 그 경계의 trait과 전송 타입만 정의합니다. 결과 행은 의도적으로
//! 느슨한 `serde_json::Value`로 유지되고, 각 route가 필요한 형태로
//! 역직렬화합니다.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod http;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use http::HttpToolbox;
#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockToolbox;

/// toolbox 호출 오류.
#[derive(Error, Debug)]
pub enum ToolboxError {
    /// 전송 실패 또는 업스트림 오류 상태
    #[error("Toolbox request failed: {0}")]
    Request(String),

    /// 응답 본문이 기대한 형태가 아님
    #[error("Toolbox returned an invalid payload: {0}")]
    InvalidPayload(String),
}

/// toolbox 작업의 공통 결과.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolboxResult {
    /// 테이블 형태의 결과 행
    #[serde(default)]
    pub rows: Vec<serde_json::Value>,
    /// 차트 요청 시의 Plotly 페이로드 (그대로 전달)
    #[serde(default)]
    pub chart: Option<serde_json::Value>,
    /// 비치명적 경고
    #[serde(default)]
    pub warnings: Vec<String>,
    /// 작업별 부가 데이터 (예: regime 추천)
    #[serde(default)]
    pub extra: Option<serde_json::Value>,
}

/// Mandelbrot channel 계산 요청.
#[derive(Debug, Clone)]
pub struct ChannelRequest {
    pub symbols: Vec<String>,
    pub interval: String,
    pub start_date: String,
    pub end_date: String,
    pub provider: String,
    pub window: String,
    pub rv_adjustment: bool,
    pub rv_method: String,
    pub rs_method: String,
    pub rv_grouped_mean: bool,
    pub live_price: bool,
    pub historical: bool,
    pub chart: bool,
    pub template: String,
}

/// Momentum 계산 요청.
#[derive(Debug, Clone)]
pub struct MomentumRequest {
    pub symbols: Vec<String>,
    pub method: String,
    pub window: String,
    pub start_date: String,
    pub end_date: String,
    pub chart: bool,
    pub template: String,
    pub membership: String,
}

/// 매크로 regime (compass) 계산 요청.
#[derive(Debug, Clone)]
pub struct CompassRequest {
    pub country: String,
    pub start_date: String,
    pub end_date: String,
    pub z_score: Option<String>,
    pub chart: bool,
    pub template: String,
    pub membership: String,
    pub recommendations: bool,
}

/// compass regime backtest 요청.
#[derive(Debug, Clone)]
pub struct CompassBacktestRequest {
    pub symbols: Vec<String>,
    pub country: String,
    pub start_date: String,
    pub end_date: String,
    pub provider: String,
    pub chart: bool,
    pub template: String,
    pub membership: String,
}

/// 분석 toolbox 공급자.
///
/// 프로덕션 구현은 [`HttpToolbox`], 테스트는 [`MockToolbox`]를 사용합니다.
#[async_trait]
pub trait ToolboxProvider: Send + Sync {
    /// Mandelbrot channel (지지/저항 밴드) 계산.
    async fn mandelbrot_channel(&self, req: &ChannelRequest)
        -> Result<ToolboxResult, ToolboxError>;

    /// 모멘텀 시계열 계산.
    async fn momentum(&self, req: &MomentumRequest) -> Result<ToolboxResult, ToolboxError>;

    /// 매크로 regime 시계열 계산.
    async fn compass(&self, req: &CompassRequest) -> Result<ToolboxResult, ToolboxError>;

    /// regime 기반 backtest 실행.
    async fn compass_backtest(
        &self,
        req: &CompassBacktestRequest,
    ) -> Result<ToolboxResult, ToolboxError>;

    /// 실시간 최신 가격 조회.
    async fn latest_price(
        &self,
        symbols: &[String],
        provider: &str,
    ) -> Result<ToolboxResult, ToolboxError>;

    /// 직전 종가 조회.
    async fn last_close(
        &self,
        symbols: &[String],
        provider: &str,
    ) -> Result<ToolboxResult, ToolboxError>;

    /// 사용자 워치리스트 테이블 구성.
    async fn user_table(
        &self,
        symbols: &[String],
        membership: &str,
    ) -> Result<ToolboxResult, ToolboxError>;
}
