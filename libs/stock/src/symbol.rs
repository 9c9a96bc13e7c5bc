use std::fmt;

/// Sentinel identifier for the domestic headline index.
pub const INDEX_KEYWORD: &str = "kospi";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// The `kospi` keyword.
    Index,
    /// Ticker starting with an ASCII letter, e.g. `QQQ`.
    Foreign,
    /// Numeric-looking code, e.g. `259960`.
    Domestic,
    /// Empty, or carries characters that could alter an upstream URL.
    Invalid,
}

/// Punctuation allowed in foreign tickers besides ASCII alphanumerics,
/// e.g. `BRK-B`, `BRK.B`, `EURUSD=X`.
const TICKER_PUNCTUATION: &[char] = &['.', '-', '='];

/// A user supplied instrument identifier, classified once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    raw: String,
    kind: SymbolKind,
}

impl Symbol {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        let kind = if raw.eq_ignore_ascii_case(INDEX_KEYWORD) {
            SymbolKind::Index
        } else if raw.starts_with(|c: char| c.is_ascii_alphabetic())
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || TICKER_PUNCTUATION.contains(&c))
        {
            SymbolKind::Foreign
        } else if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            SymbolKind::Domestic
        } else {
            SymbolKind::Invalid
        };

        let raw = match kind {
            SymbolKind::Index => INDEX_KEYWORD.to_string(),
            SymbolKind::Foreign => raw.to_uppercase(),
            SymbolKind::Domestic | SymbolKind::Invalid => raw.to_string(),
        };

        Self { raw, kind }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn is_foreign(&self) -> bool {
        self.kind == SymbolKind::Foreign
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_symbols() {
        assert_eq!(Symbol::parse("259960").kind(), SymbolKind::Domestic);
        assert_eq!(Symbol::parse("KOSPI").kind(), SymbolKind::Index);
        assert_eq!(Symbol::parse("kospi").as_str(), "kospi");
        assert_eq!(Symbol::parse("0000J0").kind(), SymbolKind::Domestic);

        let qqq = Symbol::parse(" qqq ");
        assert!(qqq.is_foreign());
        assert_eq!(qqq.as_str(), "QQQ");
        assert_eq!(Symbol::parse("brk-b").as_str(), "BRK-B");
        assert_eq!(Symbol::parse("eurusd=x").as_str(), "EURUSD=X");
    }

    #[test]
    fn rejects_url_altering_input() {
        for raw in ["", "1?x=y", "0/../../home/majors", "12%2F34", "QQQ/../x", "A#b", "^GSPC", "삼성전자"] {
            assert_eq!(Symbol::parse(raw).kind(), SymbolKind::Invalid, "{raw}");
        }
    }
}
