//! HTTP toolbox 클라이언트.

use async_trait::async_trait;
use tracing::debug;

use super::{
    ChannelRequest, CompassBacktestRequest, CompassRequest, MomentumRequest, ToolboxError,
    ToolboxProvider, ToolboxResult,
};

/// reqwest 기반 toolbox 클라이언트.
#[derive(Clone)]
pub struct HttpToolbox {
    client: reqwest::Client,
    base_url: String,
}

impl HttpToolbox {
    /// 새 클라이언트를 생성합니다. `base_url`의 후행 슬래시는 제거됩니다.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ToolboxResult, ToolboxError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Calling toolbox");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ToolboxError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolboxError::Request(format!(
                "toolbox returned status {}",
                status
            )));
        }

        response
            .json::<ToolboxResult>()
            .await
            .map_err(|e| ToolboxError::InvalidPayload(e.to_string()))
    }
}

fn join_symbols(symbols: &[String]) -> String {
    symbols.join(",")
}

#[async_trait]
impl ToolboxProvider for HttpToolbox {
    async fn mandelbrot_channel(
        &self,
        req: &ChannelRequest,
    ) -> Result<ToolboxResult, ToolboxError> {
        self.fetch(
            "/technical/mandelbrot-channel",
            &[
                ("symbols", join_symbols(&req.symbols)),
                ("interval", req.interval.clone()),
                ("start_date", req.start_date.clone()),
                ("end_date", req.end_date.clone()),
                ("provider", req.provider.clone()),
                ("window", req.window.clone()),
                ("rv_adjustment", req.rv_adjustment.to_string()),
                ("rv_method", req.rv_method.clone()),
                ("rs_method", req.rs_method.clone()),
                ("rv_grouped_mean", req.rv_grouped_mean.to_string()),
                ("live_price", req.live_price.to_string()),
                ("historical", req.historical.to_string()),
                ("chart", req.chart.to_string()),
                ("template", req.template.clone()),
            ],
        )
        .await
    }

    async fn momentum(&self, req: &MomentumRequest) -> Result<ToolboxResult, ToolboxError> {
        self.fetch(
            "/technical/momentum",
            &[
                ("symbols", join_symbols(&req.symbols)),
                ("method", req.method.clone()),
                ("window", req.window.clone()),
                ("start_date", req.start_date.clone()),
                ("end_date", req.end_date.clone()),
                ("chart", req.chart.to_string()),
                ("template", req.template.clone()),
                ("membership", req.membership.clone()),
            ],
        )
        .await
    }

    async fn compass(&self, req: &CompassRequest) -> Result<ToolboxResult, ToolboxError> {
        let mut query = vec![
            ("country", req.country.clone()),
            ("start_date", req.start_date.clone()),
            ("end_date", req.end_date.clone()),
            ("chart", req.chart.to_string()),
            ("template", req.template.clone()),
            ("membership", req.membership.clone()),
            ("recommendations", req.recommendations.to_string()),
        ];
        if let Some(z_score) = &req.z_score {
            query.push(("z_score", z_score.clone()));
        }
        self.fetch("/fundamental/humbl-compass", &query).await
    }

    async fn compass_backtest(
        &self,
        req: &CompassBacktestRequest,
    ) -> Result<ToolboxResult, ToolboxError> {
        self.fetch(
            "/fundamental/humbl-compass-backtest",
            &[
                ("symbols", join_symbols(&req.symbols)),
                ("country", req.country.clone()),
                ("start_date", req.start_date.clone()),
                ("end_date", req.end_date.clone()),
                ("provider", req.provider.clone()),
                ("chart", req.chart.to_string()),
                ("template", req.template.clone()),
                ("membership", req.membership.clone()),
            ],
        )
        .await
    }

    async fn latest_price(
        &self,
        symbols: &[String],
        provider: &str,
    ) -> Result<ToolboxResult, ToolboxError> {
        self.fetch(
            "/equity/price/latest",
            &[
                ("symbols", join_symbols(symbols)),
                ("provider", provider.to_string()),
            ],
        )
        .await
    }

    async fn last_close(
        &self,
        symbols: &[String],
        provider: &str,
    ) -> Result<ToolboxResult, ToolboxError> {
        self.fetch(
            "/equity/price/last-close",
            &[
                ("symbols", join_symbols(symbols)),
                ("provider", provider.to_string()),
            ],
        )
        .await
    }

    async fn user_table(
        &self,
        symbols: &[String],
        membership: &str,
    ) -> Result<ToolboxResult, ToolboxError> {
        self.fetch(
            "/portfolio/user-table",
            &[
                ("symbols", join_symbols(symbols)),
                ("membership", membership.to_string()),
            ],
        )
        .await
    }
}
