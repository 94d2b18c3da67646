//! Canonical output of the extraction pipeline (custodian-agnostic).
//!
//! Every parser, including the fallback, maps into these types. All money
//! and quantity fields are `Decimal`; a statement is well-formed even when
//! extraction found nothing, so downstream code never sees a partial object.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known metadata keys stamped by parsers.
pub mod meta {
    /// Identifier of the parser (or fallback tier) that produced the record.
    pub const PARSER: &str = "parser";
    /// Extraction confidence as a formatted decimal string, e.g. "0.85".
    pub const CONFIDENCE: &str = "confidence";
    /// "true" when the text looks like an employer retirement plan statement.
    pub const EMPLOYER_PLAN: &str = "employer_plan";
    /// Detected plan type ("401k", "403b") when [`EMPLOYER_PLAN`] is set.
    pub const PLAN_TYPE: &str = "plan_type";
    /// "true" when a BrokerageLink sub-account is referenced.
    pub const BROKERAGE_LINK: &str = "brokerage_link";
    /// "true" when an FDIC-insured sweep vehicle is referenced.
    pub const FDIC_SWEEP: &str = "fdic_sweep";
    /// "true" when crypto holdings are referenced.
    pub const CRYPTO: &str = "crypto";
    /// "true" when a stock-lending program is referenced.
    pub const STOCK_LENDING: &str = "stock_lending";
    /// Advertised APY on cash-management statements, e.g. "4.25".
    pub const APY: &str = "apy";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedStatement {
    pub custodian: String,
    pub account_number: String,
    pub account_type: String,
    pub statement_date: Option<NaiveDate>,
    pub total_value: Decimal,
    pub positions: Vec<ParsedPosition>,
    pub fees_detected: Vec<ParsedFee>,
    pub allocations: Vec<ParsedAllocation>,
    pub metadata: BTreeMap<String, String>,
}

impl ParsedStatement {
    /// Empty-but-valid statement attributed to `custodian`.
    pub fn new(custodian: &str) -> Self {
        Self {
            custodian: custodian.to_string(),
            ..Self::default()
        }
    }

    /// If no explicit total line was matched, fall back to the sum of
    /// extracted position market values. Every parser calls this last.
    pub fn reconcile_total(&mut self) {
        if self.total_value.is_zero() && !self.positions.is_empty() {
            self.total_value = self.positions.iter().map(|p| p.market_value).sum();
        }
    }

    pub fn set_flag(&mut self, key: &str) {
        self.metadata.insert(key.to_string(), "true".to_string());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedPosition {
    pub ticker: Option<String>,
    pub cusip: Option<String>,
    pub security_name: String,
    pub quantity: Decimal,
    pub market_value: Decimal,
    pub cost_basis: Option<Decimal>,
    pub asset_class: String,
    pub sector: String,
    pub expense_ratio: Option<Decimal>,
    pub m_and_e_fee: Option<Decimal>,
    pub target_allocation_pct: Option<Decimal>,
    pub actual_allocation_pct: Option<Decimal>,
    pub fund_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeKind {
    MortalityAndExpense,
    ExpenseRatio,
    Advisory,
    Other,
}

impl Default for FeeKind {
    fn default() -> Self {
        FeeKind::Other
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedFee {
    pub fee_type: FeeKind,
    /// Annual rate as a percentage, e.g. 1.25 for "1.25%".
    pub rate: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedAllocation {
    pub category: String,
    pub target_pct: Decimal,
    pub actual_pct: Decimal,
    /// target − actual, fixed at construction.
    pub drift: Decimal,
}

impl ParsedAllocation {
    pub fn new(category: &str, target_pct: Decimal, actual_pct: Decimal) -> Self {
        Self {
            category: category.to_string(),
            target_pct,
            actual_pct,
            drift: target_pct - actual_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_statement_is_well_formed() {
        let s = ParsedStatement::new("Charles Schwab");
        assert_eq!(s.custodian, "Charles Schwab");
        assert_eq!(s.total_value, Decimal::ZERO);
        assert!(s.positions.is_empty());
        assert!(s.statement_date.is_none());
        assert!(s.metadata.is_empty());
    }

    #[test]
    fn test_reconcile_total_sums_positions_when_missing() {
        let mut s = ParsedStatement::new("Test");
        s.positions.push(ParsedPosition {
            market_value: dec!(1234.50),
            ..Default::default()
        });
        s.positions.push(ParsedPosition {
            market_value: dec!(765.50),
            ..Default::default()
        });
        s.reconcile_total();
        assert_eq!(s.total_value, dec!(2000.00));
    }

    #[test]
    fn test_reconcile_total_keeps_explicit_total() {
        let mut s = ParsedStatement::new("Test");
        s.total_value = dec!(5000);
        s.positions.push(ParsedPosition {
            market_value: dec!(100),
            ..Default::default()
        });
        s.reconcile_total();
        assert_eq!(s.total_value, dec!(5000));
    }

    #[test]
    fn test_allocation_drift() {
        let a = ParsedAllocation::new("Equities", dec!(60), dec!(55.5));
        assert_eq!(a.drift, dec!(4.5));
    }

    #[test]
    fn test_statement_round_trips_through_json() {
        let mut s = ParsedStatement::new("Fidelity");
        s.total_value = dec!(42065.30);
        s.set_flag(meta::EMPLOYER_PLAN);
        let json = serde_json::to_string(&s).unwrap();
        let back: ParsedStatement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
