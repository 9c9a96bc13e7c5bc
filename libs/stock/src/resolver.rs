use std::sync::Arc;

use reqwest::Client;
use tracing::{info, instrument, warn};

use crate::{
    ProviderError, Quote, ResolveError, Symbol,
    provider::{Exchange, KisProvider, NaverProvider, QuoteProvider, YahooProvider},
    render::FAILURE_TEXT,
};

/// Ordered fallback chain of quote providers.
#[derive(Clone)]
pub struct Resolver {
    chain: Vec<Arc<dyn QuoteProvider>>,
}

impl Resolver {
    pub fn new(chain: Vec<Arc<dyn QuoteProvider>>) -> Self {
        Self { chain }
    }

    /// Yahoo, then the KIS proxy on AMEX, then on NASDAQ. Each of them hands
    /// domestic symbols to `primary`.
    pub fn default_chain(
        client: Client,
        primary: Arc<NaverProvider>,
        kis_base: impl Into<String>,
    ) -> Self {
        let kis_base = kis_base.into();

        Self::new(vec![
            Arc::new(YahooProvider::new(client.clone(), primary.clone())) as Arc<dyn QuoteProvider>,
            Arc::new(KisProvider::new(
                client.clone(),
                kis_base.clone(),
                Exchange::Amex,
                primary.clone(),
            )),
            Arc::new(KisProvider::new(client, kis_base, Exchange::Nasdaq, primary)),
        ])
    }

    /// First successful quote along the chain.
    ///
    /// Non-foreign symbols only go to the head of the chain: every provider
    /// would delegate them to the same primary source.
    #[instrument(name = "resolve", skip(self))]
    pub async fn resolve(&self, raw: &str) -> Result<Quote, ResolveError> {
        let symbol = Symbol::parse(raw);

        let chain = if symbol.is_foreign() {
            &self.chain[..]
        } else {
            &self.chain[..self.chain.len().min(1)]
        };

        let mut attempts: Vec<ProviderError> = Vec::with_capacity(chain.len());

        for provider in chain {
            match provider.fetch_quote(&symbol).await {
                Ok(quote) => {
                    info!(provider = provider.id(), symbol = %symbol, "quote resolved");
                    return Ok(quote);
                }
                Err(e) => {
                    warn!(provider = provider.id(), symbol = %symbol, error = %e, "provider failed");
                    attempts.push(e);
                }
            }
        }

        Err(ResolveError::Exhausted {
            symbol: symbol.to_string(),
            attempts,
        })
    }

    /// Rendered quote, or the fixed failure text.
    pub async fn resolve_text(&self, raw: &str) -> String {
        match self.resolve(raw).await {
            Ok(quote) => quote.render(),
            Err(e) => {
                warn!(error = %e, "quote unavailable");
                FAILURE_TEXT.to_string()
            }
        }
    }
}
