use async_trait::async_trait;
use reqwest::Client;
use tracing::instrument;

use super::{QuoteProvider, decode, fetch_body};
use crate::{
    ProviderError, Quote, Symbol, SymbolKind,
    quote::{Basic, Majors},
};

const ID: &str = "NAVER";
const MOBILE_API: &str = "https://m.stock.naver.com/api";
const GLOBAL_API: &str = "https://api.stock.naver.com";

/// Code of the majors entry that answers for [`SymbolKind::Index`].
pub const INDEX_CODE: &str = "KOSPI";

/// Primary provider: Naver's domestic stock, ETF and majors endpoints.
#[derive(Clone)]
pub struct NaverProvider {
    client: Client,
    mobile_api: String,
    global_api: String,
}

impl NaverProvider {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, MOBILE_API, GLOBAL_API)
    }

    pub fn with_base_url(
        client: Client,
        mobile_api: impl Into<String>,
        global_api: impl Into<String>,
    ) -> Self {
        Self {
            client,
            mobile_api: mobile_api.into(),
            global_api: global_api.into(),
        }
    }

    /// Endpoint and display precision for `symbol`.
    fn endpoint(&self, symbol: &Symbol) -> (String, bool) {
        let mobile = self.mobile_api.trim_end_matches('/');
        match symbol.kind() {
            SymbolKind::Index => (format!("{mobile}/home/majors"), false),
            _ if symbol.as_str() == "SPY" => (
                format!("{}/etf/SPY/basic", self.global_api.trim_end_matches('/')),
                true,
            ),
            _ => (format!("{mobile}/stock/{}/basic", symbol.as_str()), false),
        }
    }
}

/// Try the single-instrument shape first, then the majors shape.
pub(crate) fn parse_quote(
    symbol: &Symbol,
    body: &str,
    fractional: bool,
) -> Result<Quote, ProviderError> {
    let not_found = || ProviderError::NotFound {
        provider: ID,
        symbol: symbol.to_string(),
    };

    if let Ok(basic) = serde_json::from_str::<Basic>(body)
        && !basic.close_price.trim().is_empty()
    {
        return Ok(Quote::from_item(&basic, fractional));
    }

    let majors: Majors = decode(ID, body)?;
    if majors.home_majors.is_empty() {
        return Err(not_found());
    }

    majors
        .find(INDEX_CODE)
        .map(|major| Quote::from_item(major, fractional))
        .ok_or_else(not_found)
}

#[async_trait]
impl QuoteProvider for NaverProvider {
    fn id(&self) -> &'static str {
        ID
    }

    #[instrument(name = "naver_fetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, ProviderError> {
        if symbol.kind() == SymbolKind::Invalid {
            return Err(ProviderError::NotFound {
                provider: ID,
                symbol: symbol.to_string(),
            });
        }

        let (url, fractional) = self.endpoint(symbol);
        let body = fetch_body(ID, self.client.get(url)).await?;
        parse_quote(symbol, &body, fractional)
    }
}
