//! Charles Schwab brokerage statement parser.
//!
//! Expected extracted-text shape:
//!   Charles Schwab & Co., Inc.  Schwab One Account of JANE DOE
//!   Account Number: 4412-9987
//!   Statement Period Ending 6/30/2025
//!   AAPL    10.5    1,234.50
//!   Total Account Value: $12,345.67

use ledgerlens_core::{ParsedPosition, ParsedStatement, meta};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::contract::StatementParser;
use crate::scan;

// Schwab account numbers print as a dashed pair of four-digit runs.
static ACCOUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4}-\d{4})\b").unwrap());

pub struct SchwabParser;

impl StatementParser for SchwabParser {
    fn custodian_name(&self) -> &'static str {
        "Charles Schwab"
    }

    fn can_handle(&self, text: &str) -> bool {
        let t = text.to_lowercase();
        t.contains("schwab")
            && (t.contains("schwab one") || t.contains("brokerage") || t.contains("account of"))
    }

    fn parse(&self, text: &str) -> ParsedStatement {
        let mut stmt = ParsedStatement::new(self.custodian_name());
        stmt.account_type = "brokerage".to_string();

        let lower = text.to_lowercase();
        if lower.contains("bank sweep") {
            stmt.set_flag(meta::FDIC_SWEEP);
        }
        if lower.contains("securities lending") || lower.contains("stock lending") {
            stmt.set_flag(meta::STOCK_LENDING);
        }

        for line in text.lines() {
            if stmt.account_number.is_empty() {
                if let Some(c) = ACCOUNT_RE.captures(line) {
                    stmt.account_number = c[1].to_string();
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
                stmt.positions.push(ParsedPosition {
                    ticker: Some(ticker.to_string()),
                    security_name: ticker.to_string(),
                    quantity,
                    market_value,
                    asset_class: "equity".to_string(),
                    ..Default::default()
                });
            }
        }

        stmt.reconcile_total();
        stmt
    }
}
