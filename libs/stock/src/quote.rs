use serde::Deserialize;

/// Common view over every upstream quote shape.
pub trait StockItem {
    fn code(&self) -> &str;
    fn name(&self) -> &str;
    fn price(&self) -> f64;
    fn delta(&self) -> f64;
}

/// Parse a provider-native numeric string such as `"1,000,000"`.
///
/// Grouping separators are stripped. Anything that does not parse to a finite
/// number counts as zero.
pub fn parse_number(raw: &str) -> f64 {
    raw.trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

//
// Naver single-instrument payload
// https://m.stock.naver.com/api/stock/{code}/basic
//
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Basic {
    #[serde(rename = "itemCode", default)]
    pub item_code: String,

    #[serde(rename = "stockName", default)]
    pub stock_name: String,

    #[serde(rename = "closePrice", default)]
    pub close_price: String,

    #[serde(rename = "compareToPreviousClosePrice", alias = "CompareToPreviousClosePrice", default)]
    pub compare_to_previous_close_price: String,
}

impl StockItem for Basic {
    fn code(&self) -> &str {
        &self.item_code
    }

    fn name(&self) -> &str {
        &self.stock_name
    }

    fn price(&self) -> f64 {
        parse_number(&self.close_price)
    }

    fn delta(&self) -> f64 {
        parse_number(&self.compare_to_previous_close_price)
    }
}

//
// Naver market majors payload
// https://m.stock.naver.com/api/home/majors
//
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Majors {
    #[serde(rename = "homeMajors", default)]
    pub home_majors: Vec<HomeMajor>,
}

impl Majors {
    /// Entry whose code matches `code`. `None` means the index is absent,
    /// never an entry with zero values.
    pub fn find(&self, code: &str) -> Option<&HomeMajor> {
        self.home_majors.iter().find(|m| m.item_code == code)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct HomeMajor {
    #[serde(rename = "itemCode", default)]
    pub item_code: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "closePrice", default)]
    pub close_price: String,

    #[serde(rename = "compareToPreviousClosePrice", alias = "CompareToPreviousClosePrice", default)]
    pub compare_to_previous_close_price: String,

    #[serde(rename = "fluctuationRatio", default)]
    pub fluctuation_ratio: String,
}

impl StockItem for HomeMajor {
    fn code(&self) -> &str {
        &self.item_code
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn price(&self) -> f64 {
        parse_number(&self.close_price)
    }

    fn delta(&self) -> f64 {
        parse_number(&self.compare_to_previous_close_price)
    }
}

/// Normalized quote handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub code: String,
    pub name: String,
    pub price: f64,
    pub delta: f64,
    /// Render with two decimals instead of whole numbers.
    pub fractional: bool,
}

impl Quote {
    pub fn from_item(item: &impl StockItem, fractional: bool) -> Self {
        Self {
            code: item.code().to_string(),
            name: item.name().to_string(),
            price: item.price(),
            delta: item.delta(),
            fractional,
        }
    }
}

impl StockItem for Quote {
    fn code(&self) -> &str {
        &self.code
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn price(&self) -> f64 {
        self.price
    }

    fn delta(&self) -> f64 {
        self.delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_strips_grouping() {
        assert_eq!(parse_number("1,000,000"), 1_000_000.0);
        assert_eq!(parse_number("-230,000"), -230_000.0);
        assert_eq!(parse_number(" 12.5 "), 12.5);
    }

    #[test]
    fn parse_number_defaults_to_zero() {
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("N/A"), 0.0);
        assert_eq!(parse_number("inf"), 0.0);
    }

    #[test]
    fn basic_deserializes_both_delta_spellings() {
        let a: Basic = serde_json::from_str(
            r#"{"itemCode":"259960","stockName":"X","closePrice":"1,000,000","CompareToPreviousClosePrice":"230,000"}"#,
        )
        .unwrap();
        let b: Basic = serde_json::from_str(
            r#"{"itemCode":"259960","stockName":"X","closePrice":"1,000,000","compareToPreviousClosePrice":"230,000"}"#,
        )
        .unwrap();

        assert_eq!(a.delta(), 230_000.0);
        assert_eq!(b.delta(), 230_000.0);
        assert_eq!(a.price(), 1_000_000.0);
    }

    #[test]
    fn bad_field_does_not_fail_quote() {
        let basic = Basic {
            item_code: "005930".into(),
            stock_name: "삼성전자".into(),
            close_price: "71,200".into(),
            compare_to_previous_close_price: "--".into(),
        };

        let quote = Quote::from_item(&basic, false);
        assert_eq!(quote.price, 71_200.0);
        assert_eq!(quote.delta, 0.0);
        assert_eq!(quote.name, "삼성전자");
    }

    #[test]
    fn majors_find_returns_none_when_absent() {
        let majors: Majors = serde_json::from_str(
            r#"{"homeMajors":[{"itemCode":"KOSDAQ","name":"코스닥","closePrice":"850.12","compareToPreviousClosePrice":"-3.10"}]}"#,
        )
        .unwrap();

        assert!(majors.find("KOSPI").is_none());
        let kosdaq = majors.find("KOSDAQ").unwrap();
        assert_eq!(kosdaq.price(), 850.12);
        assert_eq!(kosdaq.delta(), -3.10);
    }
}
