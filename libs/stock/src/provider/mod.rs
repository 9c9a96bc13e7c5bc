mod investing;
mod kis;
mod naver;
mod yahoo;

#[cfg(test)]
pub(crate) mod stub;

pub use investing::InvestingProvider;
pub use kis::{DEFAULT_PROXY_URL, Exchange, KisProvider};
pub use naver::NaverProvider;
pub use yahoo::YahooProvider;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{ProviderError, Quote, Symbol};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One upstream market data source.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Short constant id used in logs, e.g. `"YAHOO"`.
    fn id(&self) -> &'static str;

    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, ProviderError>;
}

/// Shared HTTP client for every provider.
pub fn http_client() -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

    Client::builder()
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .build()
}

/// Send `request` and return the body, mapping every network failure to
/// [`ProviderError::Transport`].
pub(crate) async fn fetch_body(
    provider: &'static str,
    request: RequestBuilder,
) -> Result<String, ProviderError> {
    let transport = |source| ProviderError::Transport { provider, source };

    let body = request
        .send()
        .await
        .map_err(transport)?
        .error_for_status()
        .map_err(transport)?
        .text()
        .await
        .map_err(transport)?;

    debug!(provider, body = %body, "upstream response");
    Ok(body)
}

pub(crate) fn decode<T: DeserializeOwned>(
    provider: &'static str,
    body: &str,
) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::Parse {
        provider,
        message: e.to_string(),
    })
}
