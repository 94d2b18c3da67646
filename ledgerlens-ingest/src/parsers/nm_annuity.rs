//! Northwestern Mutual variable annuity statement parser.
//!
//! Annuity contracts have no tickers: holdings are sub-accounts with target
//! and actual allocation percentages, and the contract-level charges
//! (mortality & expense risk, average expense ratio) print as percentage
//! lines. The headline value is the contract / accumulated value.

use ledgerlens_core::{
    FeeKind, ParsedAllocation, ParsedFee, ParsedPosition, ParsedStatement,
};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::contract::StatementParser;
use crate::scan;

static CONTRACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)contract\s*(?:number|#)\s*:?\s*(\w+)").unwrap());

// "Sub-Account: Equity Growth   50.0%   48.5%   $21,032.65"
static SUB_ACCOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)sub-account:?\s+([A-Za-z][A-Za-z &/\-]*)").unwrap());

pub struct NorthwesternAnnuityParser;

impl StatementParser for NorthwesternAnnuityParser {
    fn custodian_name(&self) -> &'static str {
        "Northwestern Mutual"
    }

    fn can_handle(&self, text: &str) -> bool {
        let t = text.to_lowercase();
        t.contains("northwestern") && t.contains("variable annuity")
    }

    fn parse(&self, text: &str) -> ParsedStatement {
        let mut stmt = ParsedStatement::new(self.custodian_name());
        stmt.account_type = "variable_annuity".to_string();

        for line in text.lines() {
            if stmt.account_number.is_empty() {
                if let Some(c) = CONTRACT_RE.captures(line) {
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

            if let Some(c) = SUB_ACCOUNT_RE.captures(line) {
                let fund_name = c[1].trim().to_string();
                let percents = scan::percent_tokens(line);
                let target = percents.first().copied();
                let actual = percents.get(1).copied();
                // Sub-account value is the largest token on the line; the
                // allocation percentages never reach contract-value scale.
                let market_value = scan::numeric_tokens(line)
                    .into_iter()
                    .max()
                    .unwrap_or_default();
                if let (Some(t), Some(a)) = (target, actual) {
                    stmt.allocations.push(ParsedAllocation::new(&fund_name, t, a));
                }
                stmt.positions.push(ParsedPosition {
                    security_name: fund_name.clone(),
                    fund_name,
                    market_value,
                    asset_class: "sub_account".to_string(),
                    target_allocation_pct: target,
                    actual_allocation_pct: actual,
                    ..Default::default()
                });
                continue;
            }

            // Fixed/guaranteed options print a CUSIP instead of a ticker.
            if let Some((cusip, name, quantity, market_value)) = scan::cusip_row(line) {
                let name = if name.is_empty() { cusip } else { name };
                stmt.positions.push(ParsedPosition {
                    cusip: Some(cusip.to_string()),
                    security_name: name.to_string(),
                    fund_name: name.to_string(),
                    quantity,
                    market_value,
                    asset_class: "sub_account".to_string(),
                    ..Default::default()
                });
                continue;
            }

            let lower = line.to_lowercase();
            if lower.contains("mortality") {
                let rate = scan::percent_tokens(line).first().copied();
                stmt.fees_detected.push(ParsedFee {
                    fee_type: FeeKind::MortalityAndExpense,
                    rate,
                    description: line.trim().to_string(),
                    ..Default::default()
                });
            } else if lower.contains("expense ratio") {
                let rate = scan::percent_tokens(line).first().copied();
                stmt.fees_detected.push(ParsedFee {
                    fee_type: FeeKind::ExpenseRatio,
                    rate,
                    description: line.trim().to_string(),
                    ..Default::default()
                });
            }
        }

        // Contract-level charges apply to every sub-account.
        let m_and_e = stmt
            .fees_detected
            .iter()
            .find(|f| f.fee_type == FeeKind::MortalityAndExpense)
            .and_then(|f| f.rate);
        let expense_ratio = stmt
            .fees_detected
            .iter()
            .find(|f| f.fee_type == FeeKind::ExpenseRatio)
            .and_then(|f| f.rate);
        for p in &mut stmt.positions {
            p.m_and_e_fee = m_and_e;
            p.expense_ratio = expense_ratio;
        }

        stmt.reconcile_total();
        stmt
    }
}
