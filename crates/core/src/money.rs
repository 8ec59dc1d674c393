//! Money
//!
//! The storefront API reports every amount as a JSON number of rupees. Amounts are converted to
//! minor units (paise) exactly once, when they enter the client, and all arithmetic after that
//! point is integer arithmetic on [`Money`].

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

/// Currency used for every amount in the storefront.
pub const CURRENCY: &Currency = iso::INR;

/// A storefront amount.
pub type Amount = Money<'static, Currency>;

// INR has two minor digits.
const MINOR_PER_MAJOR: Decimal = Decimal::ONE_HUNDRED;

/// Errors raised while converting wire amounts into [`Amount`]s.
#[derive(Debug, Error, PartialEq)]
pub enum MoneyConversionError {
    /// The amount does not fit in `i64` minor units.
    #[error("amount {0} cannot be represented in minor units")]
    OutOfRange(Decimal),

    /// A negative amount was supplied where only non-negative amounts make sense.
    #[error("amount {0} must not be negative")]
    Negative(Decimal),
}

/// Zero in the storefront currency.
pub fn zero() -> Amount {
    Money::from_minor(0, CURRENCY)
}

/// Convert a major-unit (rupee) amount into an [`Amount`].
///
/// Fractions of a paisa are rounded midpoint away from zero.
///
/// # Errors
///
/// - [`MoneyConversionError::Negative`]: the amount is below zero.
/// - [`MoneyConversionError::OutOfRange`]: the amount overflows `i64` minor units.
pub fn from_major(amount: Decimal) -> Result<Amount, MoneyConversionError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyConversionError::Negative(amount));
    }

    let minor = amount
        .checked_mul(MINOR_PER_MAJOR)
        .ok_or(MoneyConversionError::OutOfRange(amount))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(MoneyConversionError::OutOfRange(amount))?;

    Ok(Money::from_minor(minor, CURRENCY))
}

/// Returns the larger of two amounts.
pub(crate) fn max(a: Amount, b: Amount) -> Amount {
    if a.to_minor_units() >= b.to_minor_units() {
        a
    } else {
        b
    }
}

/// Returns the smaller of two amounts.
pub(crate) fn min(a: Amount, b: Amount) -> Amount {
    if a.to_minor_units() <= b.to_minor_units() {
        a
    } else {
        b
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn whole_rupees_convert_to_paise() -> TestResult {
        assert_eq!(from_major(Decimal::from(499))?.to_minor_units(), 49_900);

        Ok(())
    }

    #[test]
    fn fractional_paise_round_away_from_zero() -> TestResult {
        let amount = Decimal::new(12_345, 3); // 12.345

        assert_eq!(from_major(amount)?.to_minor_units(), 1_235);

        Ok(())
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let amount = Decimal::from(-1);

        assert_eq!(from_major(amount), Err(MoneyConversionError::Negative(amount)));
    }

    #[test]
    fn zero_converts_to_zero() -> TestResult {
        assert_eq!(from_major(Decimal::ZERO)?, zero());

        Ok(())
    }

    #[test]
    fn overflowing_amounts_are_rejected() {
        let amount = Decimal::MAX;

        assert_eq!(
            from_major(amount),
            Err(MoneyConversionError::OutOfRange(amount))
        );
    }

    #[test]
    fn max_and_min_pick_by_minor_units() {
        let small = Money::from_minor(100, CURRENCY);
        let large = Money::from_minor(200, CURRENCY);

        assert_eq!(max(small, large), large);
        assert_eq!(min(small, large), small);
    }
}
