//! E*TRADE (Morgan Stanley) statement parser.
//!
//! Account numbers print masked in an SSN-like dashed shape. The cash sweep
//! shows up as an "Extended Insurance Sweep Deposit" row with no ticker.

use ledgerlens_core::{ParsedPosition, ParsedStatement, meta};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::contract::StatementParser;
use crate::scan;

static ACCOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b((?:\d{3}|X{3})-(?:\d{2}|X{2})-\d{4})\b").unwrap());

pub struct EtradeParser;

impl StatementParser for EtradeParser {
    fn custodian_name(&self) -> &'static str {
        "E*TRADE"
    }

    fn can_handle(&self, text: &str) -> bool {
        let t = text.to_lowercase();
        t.contains("e*trade") || (t.contains("etrade") && t.contains("morgan stanley"))
    }

    fn parse(&self, text: &str) -> ParsedStatement {
        let mut stmt = ParsedStatement::new(self.custodian_name());
        stmt.account_type = "brokerage".to_string();

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

            let lower = line.to_lowercase();
            if lower.contains("sweep deposit") {
                stmt.set_flag(meta::FDIC_SWEEP);
                if let Some(&value) = scan::numeric_tokens(line).last() {
                    stmt.positions.push(ParsedPosition {
                        security_name: "Extended Insurance Sweep Deposit Account".to_string(),
                        market_value: value,
                        asset_class: "cash".to_string(),
                        ..Default::default()
                    });
                }
                continue;
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
