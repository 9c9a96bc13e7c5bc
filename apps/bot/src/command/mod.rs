mod quote;

pub use quote::quote;

use stock::{Basic, Symbol, provider::QuoteProvider, render};
use tracing::{info, warn};

use crate::Data;

/// Parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Resolve each symbol through the fallback chain.
    Quotes(Vec<String>),
    /// Resolve through the scraped chart page.
    Scraped(String),
    /// Fixed sample quote, no network.
    Dream,
    Unknown,
}

const TABLE: &[(&str, &[&str])] = &[
    ("/k", &["259960"]),
    ("/n", &["036570"]),
    ("/a", &["027360"]),
    ("/skh", &["000660"]),
    ("/energy", &["385510"]),
    ("/kg", &["293490"]),
    ("/lgd", &["034220"]),
    ("/p", &["263750"]),
    ("/c", &["078340"]),
    ("/N", &["036570", "251270", "095660"]),
    ("/kospi", &["kospi"]),
    ("/spy", &["SPY"]),
    ("/qqq", &["QQQ"]),
    ("/botz", &["BOTZ"]),
    ("/qsi", &["QSI"]),
    ("/pump", &["PUMP"]),
];

impl Command {
    /// `None` for text that is not addressed to the bot.
    pub fn parse(text: &str) -> Option<Self> {
        let mut words = text.split_whitespace();
        let head = words.next()?;
        if !head.starts_with('/') {
            return None;
        }

        let arg = words.next();
        let command = match (head, arg) {
            ("/kdream", _) => Command::Dream,
            ("/s", Some(id)) => Command::Quotes(vec![id.to_string()]),
            ("/inv", Some(id)) => Command::Scraped(id.to_string()),
            _ => TABLE
                .iter()
                .find(|(name, _)| *name == head)
                .map(|(_, ids)| Command::Quotes(ids.iter().map(|s| s.to_string()).collect()))
                .unwrap_or(Command::Unknown),
        };

        Some(command)
    }
}

/// Text reply for `command`. Failures become the fixed failure text.
pub async fn respond(data: &Data, command: Command) -> String {
    match command {
        Command::Dream => {
            let dream = Basic {
                item_code: "259960".into(),
                stock_name: "크래프톤".into(),
                close_price: "1000000".into(),
                compare_to_previous_close_price: "230000".into(),
            };
            render::render(&dream, false)
        }
        Command::Quotes(symbols) => {
            let mut text = String::new();
            for symbol in &symbols {
                text.push_str(&data.resolver.resolve_text(symbol).await);
                text.push('\n');
            }
            text
        }
        Command::Scraped(id) => match data.investing.fetch_quote(&Symbol::parse(&id)).await {
            Ok(quote) => quote.render(),
            Err(e) => {
                warn!(symbol = %id, error = %e, "scraped quote failed");
                render::FAILURE_TEXT.to_string()
            }
        },
        Command::Unknown => {
            info!("unknown command");
            render::FAILURE_TEXT.to_string()
        }
    }
}
