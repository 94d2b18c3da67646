//! Line-scanning helpers shared by the custodian parsers.
//!
//! PDF-to-text output loses column alignment, so everything here works on
//! bare tokens: currency-like numbers, date shapes, leading ticker tokens,
//! percentages. Regexes are compiled once; all helpers are total.

use chrono::NaiveDate;
use ledgerlens_core::split_quantity_value;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

static MONEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?\d[\d,]*(?:\.\d+)?").unwrap());

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,4}[/-]\d{1,2}[/-]\d{1,4})\b").unwrap());

static PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").unwrap());

static CUSIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bcusip:?\s*([0-9A-Z]{9})\b").unwrap());

/// Keywords that mark a line as carrying the statement's headline value.
const TOTAL_KEYWORDS: &[&str] = &[
    "total account value",
    "total value",
    "account value",
    "contract value",
    "accumulated value",
    "ending value",
    "ending balance",
    "total balance",
    "portfolio value",
    "total",
    "balance",
];

/// Keywords that mark a line as carrying the statement/as-of date.
const DATE_KEYWORDS: &[&str] = &["statement", "as of", "period ending", "valuation date"];

/// Parses a currency-like token ("$1,234.50", "1234.5") into a `Decimal`.
pub fn parse_money(token: &str) -> Option<Decimal> {
    let cleaned = token.trim().trim_start_matches('$').replace(',', "");
    Decimal::from_str(&cleaned).ok()
}

/// Parses one date token in `M/D/YYYY`, `M-D-YYYY`, `M/D/YY`, `M-D-YY`, or
/// `YYYY-MM-DD` shape. Two-digit years belong to the 2000s.
pub fn parse_date_token(token: &str) -> Option<NaiveDate> {
    let token = token.trim();
    let sep = if token.contains('/') { '/' } else { '-' };
    let parts: Vec<&str> = token.split(sep).collect();
    if parts.len() != 3 {
        return None;
    }

    if parts[0].len() == 4 {
        // YYYY-MM-DD
        let y: i32 = parts[0].parse().ok()?;
        let m: u32 = parts[1].parse().ok()?;
        let d: u32 = parts[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }

    let m: u32 = parts[0].parse().ok()?;
    let d: u32 = parts[1].parse().ok()?;
    let mut y: i32 = parts[2].parse().ok()?;
    if y < 100 {
        y += 2000;
    }
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Statement/as-of date on a line, keyed by [`DATE_KEYWORDS`].
pub fn find_statement_date(line: &str) -> Option<NaiveDate> {
    let lower = line.to_lowercase();
    if !DATE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return None;
    }
    DATE_RE
        .find_iter(line)
        .find_map(|m| parse_date_token(m.as_str()))
}

/// Headline total on a line, keyed by [`TOTAL_KEYWORDS`].
///
/// Tokens that are part of a date shape ("Ending Balance 6/30/2025 ...")
/// are not totals and are skipped. A keyword line whose candidate token
/// fails decimal parsing is logged and skipped rather than aborting the
/// parse.
pub fn find_labeled_total(line: &str) -> Option<Decimal> {
    let lower = line.to_lowercase();
    if !TOTAL_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return None;
    }
    let date_spans: Vec<(usize, usize)> =
        DATE_RE.find_iter(line).map(|m| (m.start(), m.end())).collect();
    for m in MONEY_RE.find_iter(line) {
        if date_spans.iter().any(|&(s, e)| m.start() >= s && m.end() <= e) {
            continue;
        }
        match parse_money(m.as_str()) {
            Some(v) if !v.is_zero() => return Some(v),
            Some(_) => {}
            None => {
                log::warn!("unparseable total candidate {:?} in line {:?}", m.as_str(), line);
            }
        }
    }
    None
}

/// All currency-like tokens on a line, in order.
pub fn numeric_tokens(line: &str) -> Vec<Decimal> {
    MONEY_RE
        .find_iter(line)
        .filter_map(|m| parse_money(m.as_str()))
        .collect()
}

/// Leading 1–5 character uppercase token, the usual ticker shape.
pub fn ticker_token(line: &str) -> Option<&str> {
    let first = line.split_whitespace().next()?;
    let ok_len = (1..=5).contains(&first.len());
    let ok_chars = first.chars().all(|c| c.is_ascii_uppercase());
    if ok_len && ok_chars { Some(first) } else { None }
}

/// "CUSIP 665279AB1 Fund Name qty value" row, the marker shape used by
/// products without conventional tickers. Returns the identifier, the
/// descriptive text between it and the first number, and the
/// quantity/value split.
pub fn cusip_row(line: &str) -> Option<(&str, &str, Decimal, Decimal)> {
    let caps = CUSIP_RE.captures(line)?;
    let cusip = caps.get(1)?.as_str();
    let rest = &line[caps.get(0)?.end()..];
    let name_end = rest
        .find(|c: char| c.is_ascii_digit() || c == '$')
        .unwrap_or(rest.len());
    let name = rest[..name_end].trim();
    let tokens = numeric_tokens(&rest[name_end..]);
    if tokens.is_empty() {
        return None;
    }
    let (qty, value) = split_quantity_value(&tokens);
    Some((cusip, name, qty, value))
}

/// Percentage values on a line ("1.25%" -> 1.25), in order.
pub fn percent_tokens(line: &str) -> Vec<Decimal> {
    PERCENT_RE
        .captures_iter(line)
        .filter_map(|c| parse_money(&c[1]))
        .collect()
}

/// "TICKER qty value" position row, quantity/value split by the shared
/// magnitude policy. Returns `(ticker, quantity, market_value)`.
pub fn ticker_position(line: &str) -> Option<(&str, Decimal, Decimal)> {
    let ticker = ticker_token(line)?;
    let rest = line.trim_start().strip_prefix(ticker)?;
    let tokens = numeric_tokens(rest);
    if tokens.is_empty() {
        return None;
    }
    let (qty, value) = split_quantity_value(&tokens);
    Some((ticker, qty, value))
}
