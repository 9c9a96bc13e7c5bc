use thiserror::Error;

/// Failure of a single provider for a single request.
///
/// Every variant is recoverable: the resolver moves on to the next provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// DNS, connect, timeout or non-success HTTP status.
    #[error("Transport error: {provider} - {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The body was not the JSON shape this provider expects.
    #[error("Parse error: {provider} - {message}")]
    Parse {
        provider: &'static str,
        message: String,
    },

    /// Shape was valid but the required fields were missing or empty.
    #[error("Symbol not found: {provider} - {symbol}")]
    NotFound {
        provider: &'static str,
        symbol: String,
    },

    /// The local proxy answered but had no last price.
    #[error("No data: {provider} - {symbol}")]
    NoData {
        provider: &'static str,
        symbol: String,
    },
}

impl ProviderError {
    pub fn provider(&self) -> &'static str {
        match self {
            ProviderError::Transport { provider, .. }
            | ProviderError::Parse { provider, .. }
            | ProviderError::NotFound { provider, .. }
            | ProviderError::NoData { provider, .. } => provider,
        }
    }
}

/// Terminal failure of the whole fallback chain.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("All providers failed for {symbol}")]
    Exhausted {
        symbol: String,
        attempts: Vec<ProviderError>,
    },
}
