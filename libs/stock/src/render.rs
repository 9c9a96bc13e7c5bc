//! Text rendering for a resolved [`Quote`].
//!
//! Numbers always use `,` grouping and `.` as decimal point regardless of the
//! process locale. Free text is escaped for the chat markdown dialect.

use crate::quote::{Quote, StockItem};

/// Shown to the user when a quote could not be resolved.
pub const FAILURE_TEXT: &str = "오류";

const PRICE_LABEL: &str = "현재가";
const CHANGE_LABEL: &str = "전일비";

const RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn icon(&self) -> &'static str {
        match self {
            Direction::Up => "🔺",
            Direction::Down => "🦋",
            Direction::Flat => "",
        }
    }

    fn of(value: f64) -> Self {
        if value > 0.0 {
            Direction::Up
        } else if value < 0.0 {
            Direction::Down
        } else {
            Direction::Flat
        }
    }
}

/// Movement against the previous close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Change {
    pub previous_close: f64,
    /// Signed percentage. `0.0` when the previous close is zero.
    pub percent: f64,
    pub direction: Direction,
}

impl Change {
    pub fn of(price: f64, delta: f64) -> Self {
        let previous_close = price - delta;
        let ratio = delta / previous_close * 100.0;

        if previous_close == 0.0 || !ratio.is_finite() {
            return Self {
                previous_close,
                percent: 0.0,
                direction: Direction::of(delta),
            };
        }

        Self {
            previous_close,
            percent: ratio,
            direction: Direction::of(ratio),
        }
    }
}

/// Prefix each markdown-reserved character with `\`.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if RESERVED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Format `value` with `decimals` digits and `,` thousands grouping.
pub fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value);
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    // "-0" after rounding
    let sign = if grouped.bytes().all(|b| b == b'0' || b == b',')
        && frac_part.is_none_or(|f| f.bytes().all(|b| b == b'0'))
    {
        ""
    } else {
        sign
    };

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Render `item` as the three-line quote message.
pub fn render(item: &impl StockItem, fractional: bool) -> String {
    let price = item.price();
    let delta = item.delta();
    let change = Change::of(price, delta);
    let decimals = if fractional { 2 } else { 0 };

    format!(
        "**{}**\n{}: {}\n{}: {}{} ({:.2}%)",
        escape_markdown(item.name()),
        PRICE_LABEL,
        group_thousands(price, decimals),
        CHANGE_LABEL,
        change.direction.icon(),
        group_thousands(delta.abs(), decimals),
        change.percent.abs(),
    )
}

impl Quote {
    pub fn render(&self) -> String {
        render(self, self.fractional)
    }
}
