//! Fidelity brokerage / workplace-plan statement parser.
//!
//! Handles both retail brokerage statements and NetBenefits employer plan
//! statements (401(k)/403(b)), including BrokerageLink sub-account mentions.
//! Mutual-fund rows use Fidelity's five-letter X-suffixed symbols.

use ledgerlens_core::{ParsedPosition, ParsedStatement, meta};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::contract::StatementParser;
use crate::scan;

// Retail accounts print as a letter-prefixed run, e.g. Z12-345678.
static ACCOUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([A-Z]\d{2}-\d{6})\b").unwrap());

pub struct FidelityParser;

impl StatementParser for FidelityParser {
    fn custodian_name(&self) -> &'static str {
        "Fidelity"
    }

    fn can_handle(&self, text: &str) -> bool {
        let t = text.to_lowercase();
        t.contains("fidelity")
            && (t.contains("investments") || t.contains("brokerage") || t.contains("netbenefits"))
    }

    fn parse(&self, text: &str) -> ParsedStatement {
        let mut stmt = ParsedStatement::new(self.custodian_name());
        stmt.account_type = "brokerage".to_string();

        let lower = text.to_lowercase();
        if lower.contains("401(k)") || lower.contains("401k") {
            stmt.set_flag(meta::EMPLOYER_PLAN);
            stmt.metadata.insert(meta::PLAN_TYPE.to_string(), "401k".to_string());
            stmt.account_type = "retirement".to_string();
        } else if lower.contains("403(b)") || lower.contains("403b") {
            stmt.set_flag(meta::EMPLOYER_PLAN);
            stmt.metadata.insert(meta::PLAN_TYPE.to_string(), "403b".to_string());
            stmt.account_type = "retirement".to_string();
        }
        if lower.contains("brokeragelink") {
            stmt.set_flag(meta::BROKERAGE_LINK);
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
                // Five-letter X-suffixed symbols are Fidelity mutual funds.
                let is_fund = ticker.len() == 5 && ticker.ends_with('X');
                stmt.positions.push(ParsedPosition {
                    ticker: Some(ticker.to_string()),
                    security_name: ticker.to_string(),
                    quantity,
                    market_value,
                    asset_class: if is_fund { "mutual_fund" } else { "equity" }.to_string(),
                    fund_name: if is_fund { ticker.to_string() } else { String::new() },
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
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    const FIXTURE: &str = r#"
Fidelity Investments
NetBenefits 401(k) Savings Plan statement as of 12/31/24
Account Z12-345678 includes a BrokerageLink sub-account

FXAIX   12.345   2,456.78
AAPL    3        567.00

Ending Balance: $3,023.78
"#;

    #[test]
    fn test_detector() {
        let p = FidelityParser;
        assert!(p.can_handle(FIXTURE));
        assert!(!p.can_handle("Charles Schwab brokerage account"));
    }

    #[test]
    fn test_extraction() {
        let stmt = FidelityParser.parse(FIXTURE);
        assert_eq!(stmt.custodian, "Fidelity");
        assert_eq!(stmt.account_number, "Z12-345678");
        assert_eq!(
            stmt.statement_date,
            Some(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())
        );
        assert_eq!(stmt.total_value, dec!(3023.78));
        assert_eq!(stmt.positions.len(), 2);
        assert_eq!(stmt.positions[0].asset_class, "mutual_fund");
        assert_eq!(stmt.positions[0].fund_name, "FXAIX");
        assert_eq!(stmt.positions[1].asset_class, "equity");
    }

    #[test]
    fn test_plan_flags() {
        let stmt = FidelityParser.parse(FIXTURE);
        assert_eq!(stmt.account_type, "retirement");
        assert_eq!(stmt.metadata.get(meta::EMPLOYER_PLAN).map(String::as_str), Some("true"));
        assert_eq!(stmt.metadata.get(meta::PLAN_TYPE).map(String::as_str), Some("401k"));
        assert_eq!(stmt.metadata.get(meta::BROKERAGE_LINK).map(String::as_str), Some("true"));
    }
}
