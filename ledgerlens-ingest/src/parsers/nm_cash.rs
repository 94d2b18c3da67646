//! Northwestern Mutual cash-management product parser.
//!
//! These statements describe a single FDIC-insured sweep vehicle rather than
//! ticker positions: a TE1-prefixed account number, an advertised APY, and a
//! swept cash balance.

use ledgerlens_core::{ParsedPosition, ParsedStatement, meta};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::contract::StatementParser;
use crate::scan;

static ACCOUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(TE1-\d{6,10})\b").unwrap());

pub struct NorthwesternCashParser;

impl StatementParser for NorthwesternCashParser {
    fn custodian_name(&self) -> &'static str {
        "Northwestern Mutual Cash Management"
    }

    fn can_handle(&self, text: &str) -> bool {
        let t = text.to_lowercase();
        t.contains("northwestern")
            && (t.contains("cash management") || t.contains("fdic-insured sweep"))
    }

    fn parse(&self, text: &str) -> ParsedStatement {
        let mut stmt = ParsedStatement::new(self.custodian_name());
        stmt.account_type = "cash_management".to_string();

        for line in text.lines() {
            if stmt.account_number.is_empty() {
                if let Some(c) = ACCOUNT_RE.captures(line) {
                    stmt.account_number = c[1].to_string();
                    continue;
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
            if lower.contains("apy") && !stmt.metadata.contains_key(meta::APY) {
                if let Some(&apy) = scan::percent_tokens(line).first() {
                    stmt.metadata.insert(meta::APY.to_string(), apy.to_string());
                }
            }
            if lower.contains("fdic") {
                stmt.set_flag(meta::FDIC_SWEEP);
                if let Some(&value) = scan::numeric_tokens(line).last() {
                    if !value.is_zero() {
                        stmt.positions.push(ParsedPosition {
                            security_name: "FDIC-Insured Deposit Sweep".to_string(),
                            market_value: value,
                            asset_class: "cash".to_string(),
                            ..Default::default()
                        });
                    }
                }
            }
        }

        stmt.reconcile_total();
        stmt
    }
}
