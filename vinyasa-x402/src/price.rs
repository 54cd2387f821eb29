//! Human price string to atomic-unit conversion.
//!
//! Prices arrive as display strings (`"$1.00"` or `"1.00"`). Amounts are
//! converted to the asset's smallest unit with decimal arithmetic so no
//! floating-point error can creep into a payment amount.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::X402Error;

/// Converts a price string to an atomic-unit amount for an asset with
/// the given number of decimals.
///
/// # Errors
///
/// Returns [`X402Error::UnsupportedPrice`] if the string does not parse,
/// is not strictly positive, or carries more precision than the asset's
/// atomic unit can represent.
pub fn price_to_atomic_units(price: &str, decimals: u32) -> Result<String, X402Error> {
    let trimmed = price.trim().trim_start_matches('$');
    let amount: Decimal = trimmed
        .parse()
        .map_err(|_| X402Error::UnsupportedPrice(format!("cannot parse price {price:?}")))?;

    if amount <= Decimal::ZERO {
        return Err(X402Error::UnsupportedPrice(format!(
            "price must be positive, got {price:?}"
        )));
    }

    let scale = Decimal::from(10u64.pow(decimals));
    let scaled = amount
        .checked_mul(scale)
        .ok_or_else(|| X402Error::UnsupportedPrice(format!("price {price:?} overflows")))?;

    if !scaled.fract().is_zero() {
        return Err(X402Error::UnsupportedPrice(format!(
            "price {price:?} has more than {decimals} decimal places"
        )));
    }

    let units = scaled
        .to_u128()
        .ok_or_else(|| X402Error::UnsupportedPrice(format!("price {price:?} overflows")))?;
    Ok(units.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dollar_prices() {
        assert_eq!(price_to_atomic_units("$1.00", 6).unwrap(), "1000000");
        assert_eq!(price_to_atomic_units("$29.99", 6).unwrap(), "29990000");
        assert_eq!(price_to_atomic_units("2", 6).unwrap(), "2000000");
    }

    #[test]
    fn test_smallest_unit() {
        assert_eq!(price_to_atomic_units("0.000001", 6).unwrap(), "1");
    }

    #[test]
    fn test_too_much_precision() {
        assert!(matches!(
            price_to_atomic_units("0.0000001", 6),
            Err(X402Error::UnsupportedPrice(_))
        ));
    }

    #[test]
    fn test_rejects_garbage_and_non_positive() {
        assert!(price_to_atomic_units("free", 6).is_err());
        assert!(price_to_atomic_units("0", 6).is_err());
        assert!(price_to_atomic_units("-1.00", 6).is_err());
        assert!(price_to_atomic_units("", 6).is_err());
    }
}
