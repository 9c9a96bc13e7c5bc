use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{QuoteProvider, decode, fetch_body};
use crate::{ProviderError, Quote, Symbol};

const ID: &str = "YAHOO";
const BASE_API: &str = "https://query1.finance.yahoo.com";

/// Global provider: Yahoo Finance chart metadata for foreign tickers.
/// Everything else goes to `primary`.
#[derive(Clone)]
pub struct YahooProvider {
    client: Client,
    base_api: String,
    primary: Arc<dyn QuoteProvider>,
}

impl YahooProvider {
    pub fn new(client: Client, primary: Arc<dyn QuoteProvider>) -> Self {
        Self::with_base_url(client, BASE_API, primary)
    }

    pub fn with_base_url(
        client: Client,
        base_api: impl Into<String>,
        primary: Arc<dyn QuoteProvider>,
    ) -> Self {
        Self {
            client,
            base_api: base_api.into(),
            primary,
        }
    }
}

//
// Match Yahoo chart JSON
// https://query1.finance.yahoo.com/v8/finance/chart/{symbol}
//
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    symbol: String,

    #[serde(rename = "regularMarketPrice")]
    regular_market_price: f64,

    #[serde(rename = "chartPreviousClose")]
    chart_previous_close: f64,
}

pub(crate) fn parse_quote(symbol: &Symbol, body: &str) -> Result<Quote, ProviderError> {
    let res: ChartResponse = decode(ID, body)?;

    let meta = res
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .map(|r| r.meta)
        .ok_or_else(|| ProviderError::NotFound {
            provider: ID,
            symbol: symbol.to_string(),
        })?;

    Ok(Quote {
        code: meta.symbol.clone(),
        name: meta.symbol,
        price: meta.regular_market_price,
        delta: meta.regular_market_price - meta.chart_previous_close,
        fractional: true,
    })
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    fn id(&self) -> &'static str {
        ID
    }

    #[instrument(name = "yahoo_fetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, ProviderError> {
        if !symbol.is_foreign() {
            debug!(primary = self.primary.id(), "delegating non-foreign symbol");
            return self.primary.fetch_quote(symbol).await;
        }

        let url = format!(
            "{}/v8/finance/chart/{}",
            self.base_api.trim_end_matches('/'),
            symbol.as_str()
        );

        let body = fetch_body(ID, self.client.get(url).query(&[("interval", "3mo")])).await?;
        parse_quote(symbol, &body)
    }
}

#[cfg(test)]
mod tests {
    use crate::provider::{
        NaverProvider,
        stub::{Stub, UNREACHABLE},
    };

    use super::*;

    #[test]
    fn parses_chart_meta() {
        let body = r#"{"chart":{"result":[{"meta":{"currency":"USD","symbol":"QQQ","regularMarketPrice":440.5,"chartPreviousClose":430.0},"timestamp":[1]}],"error":null}}"#;

        let quote = parse_quote(&Symbol::parse("qqq"), body).unwrap();
        assert_eq!(quote.name, "QQQ");
        assert_eq!(quote.price, 440.5);
        assert_eq!(quote.delta, 10.5);
        assert!(quote.fractional);
    }

    #[test]
    fn empty_result_is_not_found() {
        let symbol = Symbol::parse("ZZZZ");

        let err = parse_quote(&symbol, r#"{"chart":{"result":[],"error":null}}"#).unwrap_err();
        assert!(matches!(err, ProviderError::NotFound { provider: "YAHOO", .. }));

        let err = parse_quote(
            &symbol,
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ProviderError::NotFound { .. }));
    }

    #[test]
    fn missing_meta_fields_is_parse_error() {
        let err = parse_quote(
            &Symbol::parse("QQQ"),
            r#"{"chart":{"result":[{"meta":{"symbol":"QQQ"}}]}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ProviderError::Parse { .. }));
    }

    fn offline_primary() -> Arc<dyn QuoteProvider> {
        Arc::new(NaverProvider::with_base_url(Client::new(), UNREACHABLE, UNREACHABLE))
    }

    #[tokio::test]
    async fn fetches_chart_with_interval() {
        let stub = Stub::serve(
            r#"{"chart":{"result":[{"meta":{"symbol":"QQQ","regularMarketPrice":440.5,"chartPreviousClose":430.0}}],"error":null}}"#,
        )
        .await;
        let p = YahooProvider::with_base_url(Client::new(), &stub.base, offline_primary());

        let quote = p.fetch_quote(&Symbol::parse("qqq")).await.unwrap();
        assert_eq!(quote.price, 440.5);
        assert_eq!(stub.requests(), ["/v8/finance/chart/QQQ?interval=3mo"]);
    }

    #[tokio::test]
    async fn unreachable_upstream_is_transport_error() {
        let p = YahooProvider::with_base_url(Client::new(), UNREACHABLE, offline_primary());

        let err = p.fetch_quote(&Symbol::parse("QQQ")).await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport { provider: "YAHOO", .. }));
    }
}
