//! Yahoo Finance chart endpoint adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::quotes::{QuoteError, QuoteProvider};
use crate::types::holding::Price;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

// Yahoo rejects requests without a browser-ish user agent.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; paper_trader/0.1)";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

pub struct YahooQuotes {
    client: Client,
    base_url: String,
}

impl YahooQuotes {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}?range=1d&interval=1d",
            self.base_url, symbol
        )
    }
}

/// Latest non-null close in the chart payload.
fn latest_close(symbol: &str, body: ChartResponse) -> Result<Price, QuoteError> {
    if let Some(err) = body.chart.error {
        debug!(symbol, code = ?err.code, description = ?err.description, "chart error");
        return Err(QuoteError::NotFound(symbol.to_string()));
    }
    let close = body
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .flat_map(|r| r.indicators.quote)
        .flat_map(|q| q.close)
        .flatten()
        .last()
        .ok_or_else(|| QuoteError::NotFound(symbol.to_string()))?;
    Decimal::from_f64(close)
        .map(|p| p.round_dp(4))
        .filter(|p| *p > Decimal::ZERO)
        .ok_or_else(|| QuoteError::NotFound(symbol.to_string()))
}

#[async_trait]
impl QuoteProvider for YahooQuotes {
    async fn get_price(&self, symbol: &str) -> Result<Price, QuoteError> {
        if symbol.is_empty() {
            return Err(QuoteError::NotFound(String::new()));
        }
        let response = self
            .client
            .get(self.chart_url(symbol))
            .send()
            .await
            .map_err(|e| {
                warn!(symbol, error = %e, "quote request failed");
                QuoteError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(QuoteError::NotFound(symbol.to_string()));
        }
        if !status.is_success() {
            warn!(symbol, %status, "quote provider returned an error status");
            return Err(QuoteError::Unavailable(format!("HTTP {status}")));
        }

        let body = response.json::<ChartResponse>().await.map_err(|e| {
            warn!(symbol, error = %e, "undecodable quote payload");
            QuoteError::Unavailable(e.to_string())
        })?;
        latest_close(symbol, body)
    }
}
