//! Robinhood statement parser.
//!
//! Robinhood statements carry the Menlo Park footer, a plain digit-run
//! account number, and flat "SYMBOL qty value" rows for both equities and
//! crypto. Stock-lending and crypto mentions become provenance flags.

use ledgerlens_core::{ParsedPosition, ParsedStatement, meta};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::contract::StatementParser;
use crate::scan;

static ACCOUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{8,10})\b").unwrap());

const CRYPTO_SYMBOLS: &[&str] = &["BTC", "ETH", "DOGE", "SOL", "ADA"];

pub struct RobinhoodParser;

impl StatementParser for RobinhoodParser {
    fn custodian_name(&self) -> &'static str {
        "Robinhood"
    }

    fn can_handle(&self, text: &str) -> bool {
        let t = text.to_lowercase();
        t.contains("robinhood")
            && (t.contains("menlo park") || t.contains("securities") || t.contains("financial"))
    }

    fn parse(&self, text: &str) -> ParsedStatement {
        let mut stmt = ParsedStatement::new(self.custodian_name());
        stmt.account_type = "brokerage".to_string();

        let lower = text.to_lowercase();
        if lower.contains("crypto") {
            stmt.set_flag(meta::CRYPTO);
        }
        if lower.contains("stock lending") || lower.contains("securities lending") {
            stmt.set_flag(meta::STOCK_LENDING);
        }

        for line in text.lines() {
            if stmt.account_number.is_empty() {
                let l = line.to_lowercase();
                if l.contains("account") {
                    if let Some(c) = ACCOUNT_RE.captures(line) {
                        stmt.account_number = c[1].to_string();
                    }
                }
            }
            if stmt.statement_date.is_none() {
                if let Some(d) = scan::find_statement_date(line) {
                    stmt.statement_date = Some(d);
                    continue;
                }
            }
            if stmt.total_value.is_zero() {
                if let Some(total) = scan::find_labeled_total(line) {
                    stmt.total_value = total;
                    continue;
                }
            }
            if let Some((ticker, quantity, market_value)) = scan::ticker_position(line) {
                let is_crypto = CRYPTO_SYMBOLS.contains(&ticker);
                if is_crypto {
                    stmt.set_flag(meta::CRYPTO);
                }
                stmt.positions.push(ParsedPosition {
                    ticker: Some(ticker.to_string()),
                    security_name: ticker.to_string(),
                    quantity,
                    market_value,
                    asset_class: if is_crypto { "crypto" } else { "equity" }.to_string(),
                    ..Default::default()
                });
            }
        }

        stmt.reconcile_total();
        stmt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const FIXTURE: &str = r#"
Robinhood Securities, LLC
85 Willow Road, Menlo Park, CA 94025
Account: 784512963
Statement Period Ending 5/31/25

AAPL 10.5 1,234.50
BTC 0.25 15,750.00

Total Portfolio Value $16,984.50
Your shares may be loaned through the Stock Lending program.
"#;

    #[test]
    fn test_detector() {
        let p = RobinhoodParser;
        assert!(p.can_handle(FIXTURE));
        assert!(!p.can_handle("E*TRADE from Morgan Stanley"));
    }

    #[test]
    fn test_extraction() {
        let stmt = RobinhoodParser.parse(FIXTURE);
        assert_eq!(stmt.custodian, "Robinhood");
        assert_eq!(stmt.account_number, "784512963");
        assert_eq!(stmt.total_value, dec!(16984.50));
        assert_eq!(stmt.positions.len(), 2);
        assert_eq!(stmt.positions[0].ticker.as_deref(), Some("AAPL"));
        assert_eq!(stmt.positions[0].quantity, dec!(10.5));
        assert_eq!(stmt.positions[1].asset_class, "crypto");
        assert_eq!(stmt.metadata.get(meta::CRYPTO).map(String::as_str), Some("true"));
        assert_eq!(stmt.metadata.get(meta::STOCK_LENDING).map(String::as_str), Some("true"));
    }
}
