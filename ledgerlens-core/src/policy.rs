//! Quantity-vs-market-value disambiguation for position rows.
//!
//! Statement lines frequently carry two bare numbers with no column labels
//! left after PDF text extraction. The rule used across every custodian
//! parser: a token strictly above 100 is a market value, anything else is a
//! share quantity. Exactly 100 classifies as quantity.
//!
//! Known limitation: low-priced instruments held in large share counts
//! (e.g. 5000 shares of a $0.40 stock) get their quantity read as the
//! market value. Kept as-is; see the boundary tests below.

use rust_decimal::Decimal;

/// Classification threshold. Strictly-greater comparisons only.
pub const VALUE_THRESHOLD: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountRole {
    Quantity,
    MarketValue,
}

pub fn classify_amount(amount: Decimal) -> AmountRole {
    if amount > VALUE_THRESHOLD {
        AmountRole::MarketValue
    } else {
        AmountRole::Quantity
    }
}

/// Splits a line's numeric tokens into `(quantity, market_value)`.
///
/// The first token above the threshold becomes the market value and the
/// first token at-or-below it becomes the quantity; a role with no matching
/// token stays at zero.
pub fn split_quantity_value(tokens: &[Decimal]) -> (Decimal, Decimal) {
    let mut quantity = Decimal::ZERO;
    let mut market_value = Decimal::ZERO;

    for &t in tokens {
        match classify_amount(t) {
            AmountRole::MarketValue if market_value.is_zero() => market_value = t,
            AmountRole::Quantity if quantity.is_zero() => quantity = t,
            _ => {}
        }
    }

    (quantity, market_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(classify_amount(dec!(100)), AmountRole::Quantity);
        assert_eq!(classify_amount(dec!(100.01)), AmountRole::MarketValue);
        assert_eq!(classify_amount(dec!(99.99)), AmountRole::Quantity);
    }

    #[test]
    fn test_split_typical_position_row() {
        // "AAPL 10.5 1,234.50" -> 10.5 shares worth 1234.50
        let (qty, value) = split_quantity_value(&[dec!(10.5), dec!(1234.50)]);
        assert_eq!(qty, dec!(10.5));
        assert_eq!(value, dec!(1234.50));
    }

    #[test]
    fn test_split_order_independent() {
        let (qty, value) = split_quantity_value(&[dec!(1234.50), dec!(10.5)]);
        assert_eq!(qty, dec!(10.5));
        assert_eq!(value, dec!(1234.50));
    }

    #[test]
    fn test_split_single_token() {
        let (qty, value) = split_quantity_value(&[dec!(500.00)]);
        assert_eq!(qty, Decimal::ZERO);
        assert_eq!(value, dec!(500.00));
    }

    #[test]
    fn test_penny_stock_misclassification_is_the_documented_behavior() {
        // 5000 shares at $0.40: the share count wins the value slot.
        let (qty, value) = split_quantity_value(&[dec!(5000), dec!(0.40)]);
        assert_eq!(value, dec!(5000));
        assert_eq!(qty, dec!(0.40));
    }
}
