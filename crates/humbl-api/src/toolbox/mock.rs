//! 테스트용 mock toolbox.

use async_trait::async_trait;
use serde_json::json;

use super::{
    ChannelRequest, CompassBacktestRequest, CompassRequest, MomentumRequest, ToolboxError,
    ToolboxProvider, ToolboxResult,
};

/// 고정된 결과를 반환하는 toolbox 구현.
#[derive(Default)]
pub struct MockToolbox {
    /// true면 모든 호출이 Request 오류로 실패
    fail: bool,
}

impl MockToolbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// 모든 작업이 실패하는 toolbox (연결 오류 시나리오).
    pub fn failing() -> Self {
        Self { fail: true }
    }

    fn guard(&self) -> Result<(), ToolboxError> {
        if self.fail {
            Err(ToolboxError::Request("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ToolboxProvider for MockToolbox {
    async fn mandelbrot_channel(
        &self,
        req: &ChannelRequest,
    ) -> Result<ToolboxResult, ToolboxError> {
        self.guard()?;
        let rows = req
            .symbols
            .iter()
            .map(|symbol| {
                json!({
                    "date": req.end_date,
                    "symbol": symbol,
                    "bottom_price": 90.0,
                    "recent_price": 100.0,
                    "top_price": 110.0,
                })
            })
            .collect();
        Ok(ToolboxResult {
            rows,
            ..Default::default()
        })
    }

    async fn momentum(&self, req: &MomentumRequest) -> Result<ToolboxResult, ToolboxError> {
        self.guard()?;
        let rows = req
            .symbols
            .iter()
            .map(|symbol| {
                json!({
                    "date": req.end_date,
                    "symbol": symbol,
                    "close": 100.0,
                    "shifted": 98.0,
                    "momentum": 0.0204,
                    "momentum_signal": 1,
                })
            })
            .collect();
        Ok(ToolboxResult {
            rows,
            warnings: vec!["momentum data may be delayed".to_string()],
            ..Default::default()
        })
    }

    async fn compass(&self, req: &CompassRequest) -> Result<ToolboxResult, ToolboxError> {
        self.guard()?;
        let rows = vec![
            json!({
                "date_month_start": "2024-01-01",
                "country": req.country,
                "cpi": 3.1,
                "cpi_3m_delta": -0.1,
                "cli": 100.2,
                "cli_3m_delta": 0.2,
                "humbl_regime": "humblBOOM",
            }),
            json!({
                "date_month_start": "2024-02-01",
                "country": req.country,
                "cpi": 3.4,
                "cpi_3m_delta": 0.3,
                "cli": 100.3,
                "cli_3m_delta": 0.1,
                "humbl_regime": "humblBLOAT",
            }),
        ];
        let extra = if req.recommendations {
            Some(json!({
                "humbl_regime_recommendations": {
                    "asset_classes": ["commodities", "gold"],
                    "equity_sectors": ["energy", "materials"],
                }
            }))
        } else {
            None
        };
        Ok(ToolboxResult {
            rows,
            extra,
            ..Default::default()
        })
    }

    async fn compass_backtest(
        &self,
        req: &CompassBacktestRequest,
    ) -> Result<ToolboxResult, ToolboxError> {
        self.guard()?;
        let rows = req
            .symbols
            .iter()
            .map(|symbol| {
                json!({
                    "symbol": symbol,
                    "humbl_regime": "humblBOOM",
                    "avg_total_return_pct": 12.5,
                    "avg_ann_return_pct": 9.8,
                    "avg_win_rate_pct": 62.0,
                    "avg_volatility": 18.4,
                    "avg_sharpe_ratio": 0.53,
                    "avg_days_in_regime": 211.0,
                    "instance_count": 4,
                    "cumulative_investment_growth": 4_820.0,
                    "investment_growth_pct": 48.2,
                    "total_ending_investment_value": 14_820.0,
                    "total_win_count": 460,
                    "total_loss_count": 384,
                    "avg_win_count_per_instance": 115.0,
                    "avg_loss_count_per_instance": 96.0,
                    "min_return_pct": -8.1,
                    "max_return_pct": 24.6,
                    "max_win_days": 9,
                    "min_win_days": 1,
                    "max_loss_days": 7,
                    "min_loss_days": 1,
                    "max_drawdown_pct": -14.2,
                    "avg_drawdown_pct": -6.3,
                    "avg_recovery_days": 34.0,
                    "max_recovery_days": 88,
                })
            })
            .collect();
        Ok(ToolboxResult {
            rows,
            ..Default::default()
        })
    }

    async fn latest_price(
        &self,
        symbols: &[String],
        _provider: &str,
    ) -> Result<ToolboxResult, ToolboxError> {
        self.guard()?;
        let rows = symbols
            .iter()
            .map(|symbol| json!({"symbol": symbol, "last_price": 101.25}))
            .collect();
        Ok(ToolboxResult {
            rows,
            ..Default::default()
        })
    }

    async fn last_close(
        &self,
        symbols: &[String],
        _provider: &str,
    ) -> Result<ToolboxResult, ToolboxError> {
        self.guard()?;
        let rows = symbols
            .iter()
            .map(|symbol| json!({"symbol": symbol, "prev_close": 99.5}))
            .collect();
        Ok(ToolboxResult {
            rows,
            ..Default::default()
        })
    }

    async fn user_table(
        &self,
        symbols: &[String],
        _membership: &str,
    ) -> Result<ToolboxResult, ToolboxError> {
        self.guard()?;
        let rows = symbols
            .iter()
            .map(|symbol| {
                json!({
                    "symbol": symbol,
                    "last_price": 101.25,
                    "buy_price": 90.0,
                    "sell_price": 110.0,
                    "ud_pct": "+8.6% / -11.1%",
                    "ud_ratio": 0.78,
                    "sector": "Technology",
                    "asset_class": "equity",
                })
            })
            .collect();
        Ok(ToolboxResult {
            rows,
            ..Default::default()
        })
    }
}
