use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{QuoteProvider, decode, fetch_body};
use crate::{ProviderError, Quote, Symbol, quote::parse_number};

const ID: &str = "INVESTING";
const BASE_API: &str = "https://www.investing.com";

const SYMBOL_ID: &str = "chart-info-symbol";
const LAST_ID: &str = "chart-info-last";
const CHANGE_ID: &str = "chart-info-change";

/// Instruments served by the chart-info page, keyed to vendor pair ids.
const PAIRS: &[(&str, u32)] = &[("BOTZ", 1_055_234), ("QSI", 1_175_704), ("PUMP", 1_167_447)];

/// Legacy provider that scrapes the vendor's chart widget.
/// Only symbols in [`PAIRS`] are fetched here.
#[derive(Clone)]
pub struct InvestingProvider {
    client: Client,
    base_api: String,
    primary: Arc<dyn QuoteProvider>,
}

impl InvestingProvider {
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

    fn pair_id(symbol: &Symbol) -> Option<u32> {
        PAIRS
            .iter()
            .find(|(s, _)| *s == symbol.as_str())
            .map(|(_, id)| *id)
    }
}

#[derive(Debug, Deserialize)]
struct ChartInfoResponse {
    html: ChartInfoHtml,
}

#[derive(Debug, Deserialize)]
struct ChartInfoHtml {
    #[serde(default)]
    chart_info: String,
}

/// First non-blank text under the first element, in document order, whose
/// `id` attribute equals `id`.
fn text_by_id(doc: &Html, id: &str) -> Option<String> {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().id() == Some(id))
        .and_then(|el| el.text().map(str::trim).find(|t| !t.is_empty()))
        .map(str::to_string)
}

pub(crate) fn parse_quote(symbol: &Symbol, body: &str) -> Result<Quote, ProviderError> {
    let res: ChartInfoResponse = decode(ID, body)?;
    let doc = Html::parse_fragment(&res.html.chart_info);

    let not_found = || ProviderError::NotFound {
        provider: ID,
        symbol: symbol.to_string(),
    };

    let name = text_by_id(&doc, SYMBOL_ID).ok_or_else(not_found)?;
    let last = text_by_id(&doc, LAST_ID).ok_or_else(not_found)?;
    let change = text_by_id(&doc, CHANGE_ID).ok_or_else(not_found)?;

    Ok(Quote {
        code: symbol.to_string(),
        name,
        price: parse_number(&last),
        delta: parse_number(&change),
        fractional: true,
    })
}

#[async_trait]
impl QuoteProvider for InvestingProvider {
    fn id(&self) -> &'static str {
        ID
    }

    #[instrument(name = "investing_fetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, ProviderError> {
        let Some(pair_id) = Self::pair_id(symbol) else {
            debug!(primary = self.primary.id(), "delegating symbol outside allow-list");
            return self.primary.fetch_quote(symbol).await;
        };

        let url = format!(
            "{}/common/modules/js_instrument_chart/api/data.php",
            self.base_api.trim_end_matches('/')
        );
        let pair_id = pair_id.to_string();
        let request = self
            .client
            .get(url)
            .header("X-Requested-With", "XMLHttpRequest")
            .query(&[
                ("pair_id", pair_id.as_str()),
                ("pair_id_for_news", pair_id.as_str()),
                ("chart_type", "area"),
                ("pair_interval", "86400"),
                ("candle_count", "120"),
            ]);

        let body = fetch_body(ID, request).await?;
        parse_quote(symbol, &body)
    }
}
