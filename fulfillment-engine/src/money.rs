//! Money and quantity arithmetic helpers.
//!
//! All monetary values are `Decimal` rounded half-up to 2 places; stock
//! quantities use 3 places. Inputs are validated here before any action
//! touches a snapshot.

use rust_decimal::prelude::*;

use crate::orders::traits::OrderError;
use shared::order::{LineInput, PaymentInput};

/// Rounding for monetary values (2 decimal places, half-up)
pub const MONEY_DP: u32 = 2;

/// Rounding for stock quantities (3 decimal places, half-up)
pub const QUANTITY_DP: u32 = 3;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed unit price (1,000,000)
const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
/// Maximum allowed quantity per line
const MAX_QUANTITY: Decimal = Decimal::from_parts(9_999, 0, 0, false, 0);
/// Maximum allowed payment amount (1,000,000)
const MAX_PAYMENT_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Round to 2 decimal places, half away from zero
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to 3 decimal places, half away from zero
#[inline]
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QUANTITY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Validate a LineInput before processing
pub fn validate_line(line: &LineInput) -> Result<(), OrderError> {
    if line.quantity <= Decimal::ZERO {
        return Err(OrderError::Validation(format!(
            "quantity must be positive, got {}",
            line.quantity
        )));
    }
    if line.quantity > MAX_QUANTITY {
        return Err(OrderError::Validation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, line.quantity
        )));
    }

    if line.unit_price < Decimal::ZERO {
        return Err(OrderError::Validation(format!(
            "unit_price must be non-negative, got {}",
            line.unit_price
        )));
    }
    if line.unit_price > MAX_PRICE {
        return Err(OrderError::Validation(format!(
            "unit_price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, line.unit_price
        )));
    }

    if line.tax < Decimal::ZERO {
        return Err(OrderError::Validation(format!(
            "tax must be non-negative, got {}",
            line.tax
        )));
    }
    if line.discount < Decimal::ZERO {
        return Err(OrderError::Validation(format!(
            "discount must be non-negative, got {}",
            line.discount
        )));
    }

    Ok(())
}

/// Validate a PaymentInput before processing
pub fn validate_payment(payment: &PaymentInput) -> Result<(), OrderError> {
    if payment.amount <= Decimal::ZERO {
        return Err(OrderError::InvalidAmount);
    }
    if payment.amount > MAX_PAYMENT_AMOUNT {
        return Err(OrderError::Validation(format!(
            "payment amount exceeds maximum allowed ({}), got {}",
            MAX_PAYMENT_AMOUNT, payment.amount
        )));
    }
    Ok(())
}

/// Check if payment covers the required amount (with tolerance)
///
/// Returns true if paid >= required - 0.01
pub fn is_payment_sufficient(paid: Decimal, required: Decimal) -> bool {
    paid >= required - MONEY_TOLERANCE
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < MONEY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::PaymentMethod;

    fn test_line(quantity: Decimal, unit_price: Decimal) -> LineInput {
        LineInput {
            product_id: Some("prod-1".to_string()),
            menu_item_id: None,
            name: "Test".to_string(),
            quantity,
            unit_price,
            tax: Decimal::ZERO,
            discount: Decimal::ZERO,
            note: None,
        }
    }

    #[test]
    fn test_round_money_half_up() {
        // 0.005 rounds up to 0.01
        assert_eq!(round_money(Decimal::new(5, 3)), Decimal::new(1, 2));
        // 0.004 rounds down to 0.00
        assert_eq!(round_money(Decimal::new(4, 3)), Decimal::ZERO);
    }

    #[test]
    fn test_round_quantity_three_places() {
        // 0.0005 rounds up to 0.001
        assert_eq!(round_quantity(Decimal::new(5, 4)), Decimal::new(1, 3));
        assert_eq!(round_quantity(Decimal::new(12345, 4)), Decimal::new(1235, 3));
    }

    #[test]
    fn test_validate_line_accepts_fractional_quantity() {
        let line = test_line(Decimal::new(1500, 3), Decimal::new(999, 2));
        assert!(validate_line(&line).is_ok());
    }

    #[test]
    fn test_validate_line_rejects_zero_quantity() {
        let line = test_line(Decimal::ZERO, Decimal::ONE);
        assert!(validate_line(&line).is_err());
    }

    #[test]
    fn test_validate_line_rejects_negative_quantity() {
        let line = test_line(Decimal::new(-1, 0), Decimal::ONE);
        assert!(validate_line(&line).is_err());
    }

    #[test]
    fn test_validate_line_rejects_negative_price() {
        let line = test_line(Decimal::ONE, Decimal::new(-100, 2));
        assert!(validate_line(&line).is_err());
    }

    #[test]
    fn test_validate_line_rejects_negative_discount() {
        let mut line = test_line(Decimal::ONE, Decimal::ONE);
        line.discount = Decimal::new(-1, 2);
        assert!(validate_line(&line).is_err());
    }

    #[test]
    fn test_validate_line_rejects_excessive_price() {
        let line = test_line(Decimal::ONE, MAX_PRICE + Decimal::ONE);
        assert!(validate_line(&line).is_err());
    }

    #[test]
    fn test_validate_payment_rejects_zero_and_negative() {
        let mut payment = PaymentInput {
            method: PaymentMethod::Cash,
            amount: Decimal::ZERO,
            reference: None,
            note: None,
        };
        assert!(matches!(
            validate_payment(&payment),
            Err(OrderError::InvalidAmount)
        ));
        payment.amount = Decimal::new(-500, 2);
        assert!(validate_payment(&payment).is_err());
    }

    #[test]
    fn test_is_payment_sufficient() {
        let hundred = Decimal::new(10000, 2);
        assert!(is_payment_sufficient(hundred, hundred));
        assert!(is_payment_sufficient(Decimal::new(10001, 2), hundred));
        // Within tolerance
        assert!(is_payment_sufficient(Decimal::new(99995, 3), hundred));
        // Outside tolerance
        assert!(!is_payment_sufficient(Decimal::new(9998, 2), hundred));
    }

    #[test]
    fn test_money_eq() {
        assert!(money_eq(Decimal::new(10000, 2), Decimal::new(10000, 2)));
        assert!(!money_eq(Decimal::new(10000, 2), Decimal::new(10002, 2)));
    }
}
