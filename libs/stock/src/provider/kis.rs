use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{QuoteProvider, decode, fetch_body};
use crate::{ProviderError, Quote, Symbol, quote::parse_number};

pub const DEFAULT_PROXY_URL: &str = "http://localhost:26704";

/// Overseas exchange code understood by the local KIS proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    /// NYSE Arca / AMEX.
    Amex,
    Nasdaq,
}

impl Exchange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Amex => "AMS",
            Exchange::Nasdaq => "NAS",
        }
    }

    fn provider_id(&self) -> &'static str {
        match self {
            Exchange::Amex => "KIS_AMS",
            Exchange::Nasdaq => "KIS_NAS",
        }
    }
}

/// Local proxy in front of the Korea Investment overseas price API.
#[derive(Clone)]
pub struct KisProvider {
    client: Client,
    base_api: String,
    exchange: Exchange,
    primary: Arc<dyn QuoteProvider>,
}

impl KisProvider {
    pub fn new(
        client: Client,
        base_api: impl Into<String>,
        exchange: Exchange,
        primary: Arc<dyn QuoteProvider>,
    ) -> Self {
        Self {
            client,
            base_api: base_api.into(),
            exchange,
            primary,
        }
    }
}

//
// Match KIS overseas price JSON as relayed by the proxy
//
#[derive(Debug, Deserialize)]
struct KisResult {
    #[serde(default)]
    output: Option<KisOutput>,

    #[serde(default)]
    rt_cd: String,

    #[serde(rename = "msg1", default)]
    msg: String,
}

#[derive(Debug, Deserialize, Default)]
struct KisOutput {
    /// Market-prefixed symbol, e.g. `DNASQQQ`.
    #[serde(default)]
    rsym: String,

    /// Previous close.
    #[serde(default)]
    base: String,

    #[serde(default)]
    last: String,
}

/// `DNASQQQ` -> `QQQ`.
fn strip_market_prefix(rsym: &str) -> &str {
    rsym.get(4..).filter(|s| !s.is_empty()).unwrap_or(rsym)
}

pub(crate) fn parse_quote(
    provider: &'static str,
    symbol: &Symbol,
    body: &str,
) -> Result<Quote, ProviderError> {
    let res: KisResult = decode(provider, body)?;
    debug!(rt_cd = %res.rt_cd, msg = %res.msg, "proxy result");

    let output = res.output.unwrap_or_default();
    if output.last.trim().is_empty() {
        return Err(ProviderError::NoData {
            provider,
            symbol: symbol.to_string(),
        });
    }

    let last = parse_number(&output.last);
    let base = parse_number(&output.base);
    let name = if output.rsym.is_empty() {
        symbol.as_str()
    } else {
        strip_market_prefix(&output.rsym)
    };

    Ok(Quote {
        code: symbol.to_string(),
        name: name.to_string(),
        price: last,
        delta: last - base,
        fractional: true,
    })
}

#[async_trait]
impl QuoteProvider for KisProvider {
    fn id(&self) -> &'static str {
        self.exchange.provider_id()
    }

    #[instrument(name = "kis_fetch", skip(self), fields(symbol = %symbol, excd = self.exchange.as_str()))]
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, ProviderError> {
        if !symbol.is_foreign() {
            debug!(primary = self.primary.id(), "delegating non-foreign symbol");
            return self.primary.fetch_quote(symbol).await;
        }

        let url = format!("{}/query", self.base_api.trim_end_matches('/'));
        let request = self
            .client
            .get(url)
            .query(&[("excd", self.exchange.as_str()), ("symb", symbol.as_str())]);

        let body = fetch_body(self.id(), request).await?;
        parse_quote(self.id(), symbol, &body)
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
    fn parses_proxy_output() {
        let body = r#"{"output":{"rsym":"DAMSBOTZ","zdiv":"4","base":"30.1000","pvol":"1","last":"31.3500","sign":"2","diff":"1.25","rate":"+4.15","tvol":"1","tamt":"1","ordy":"매도불가"},"rt_cd":"0","msg_cd":"MCA00000","msg1":"정상처리 되었습니다."}"#;

        let quote = parse_quote("KIS_AMS", &Symbol::parse("botz"), body).unwrap();
        assert_eq!(quote.name, "BOTZ");
        assert_eq!(quote.code, "BOTZ");
        assert_eq!(quote.price, 31.35);
        assert!((quote.delta - 1.25).abs() < 1e-9);
        assert!(quote.fractional);
    }

    #[test]
    fn empty_last_is_no_data() {
        let body = r#"{"output":{"rsym":"","base":"","last":""},"rt_cd":"0","msg_cd":"MCA00000","msg1":"정상처리 되었습니다."}"#;

        let err = parse_quote("KIS_NAS", &Symbol::parse("BOTZ"), body).unwrap_err();
        assert!(matches!(err, ProviderError::NoData { provider: "KIS_NAS", .. }));
    }

    #[test]
    fn missing_output_is_no_data() {
        let body = r#"{"rt_cd":"1","msg_cd":"EGW00123","msg1":"기간이 만료된 token 입니다."}"#;

        let err = parse_quote("KIS_AMS", &Symbol::parse("QQQ"), body).unwrap_err();
        assert!(matches!(err, ProviderError::NoData { .. }));
    }

    #[test]
    fn non_json_is_parse_error() {
        let err = parse_quote("KIS_AMS", &Symbol::parse("QQQ"), "Bad Gateway").unwrap_err();
        assert!(matches!(err, ProviderError::Parse { .. }));
    }

    #[test]
    fn short_rsym_is_kept() {
        assert_eq!(strip_market_prefix("DNASQQQ"), "QQQ");
        assert_eq!(strip_market_prefix("QQQ"), "QQQ");
        assert_eq!(strip_market_prefix("DNAS"), "DNAS");
    }

    fn offline_primary() -> Arc<dyn QuoteProvider> {
        Arc::new(NaverProvider::with_base_url(Client::new(), UNREACHABLE, UNREACHABLE))
    }

    #[tokio::test]
    async fn queries_exchange_and_symbol() {
        let stub = Stub::serve(
            r#"{"output":{"rsym":"DAMSBOTZ","base":"30.10","last":"31.35"},"rt_cd":"0","msg_cd":"MCA00000","msg1":"ok"}"#,
        )
        .await;
        let p = KisProvider::new(Client::new(), format!("{}/", stub.base), Exchange::Amex, offline_primary());

        let quote = p.fetch_quote(&Symbol::parse("botz")).await.unwrap();
        assert_eq!(quote.name, "BOTZ");
        assert_eq!(stub.requests(), ["/query?excd=AMS&symb=BOTZ"]);
    }

    #[tokio::test]
    async fn unreachable_proxy_is_transport_error() {
        let p = KisProvider::new(Client::new(), UNREACHABLE, Exchange::Nasdaq, offline_primary());

        let err = p.fetch_quote(&Symbol::parse("QQQ")).await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport { provider: "KIS_NAS", .. }));
    }
}
