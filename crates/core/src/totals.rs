//! Totals

use rusty_money::{Money, MoneyError};
use thiserror::Error;

use crate::{
    cart::CartItem,
    discounts::DiscountState,
    money::{self, Amount, CURRENCY, zero},
};

/// Errors that can occur while calculating cart totals.
#[derive(Debug, Error, PartialEq)]
pub enum TotalsError {
    /// A line total does not fit in minor units.
    #[error("line total for {0} overflowed")]
    Overflow(String),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Totals shown to the shopper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals {
    /// Sum of line totals
    pub items_price: Amount,

    /// Shipping charge
    pub shipping_price: Amount,

    /// The single active discount
    pub discount: Amount,

    /// `items_price + shipping_price - discount`, never below zero
    pub total: Amount,
}

impl CartTotals {
    /// Compute totals with only the active discount taken off.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalsError`] if money arithmetic fails.
    pub fn compute(
        items_price: Amount,
        shipping_price: Amount,
        discount: &DiscountState,
    ) -> Result<Self, TotalsError> {
        let discount = discount.amount();
        let gross = items_price.add(shipping_price)?;
        let total = money::max(gross.sub(discount)?, zero());

        Ok(Self {
            items_price,
            shipping_price,
            discount,
            total,
        })
    }
}

/// Sum of `unit price × quantity` over every line.
///
/// # Errors
///
/// Returns a [`TotalsError`] if a line total overflows or money arithmetic fails.
pub fn items_subtotal(items: &[CartItem]) -> Result<Amount, TotalsError> {
    items
        .iter()
        .try_fold(zero(), |acc, item| Ok(acc.add(item.line_total()?)?))
}

/// `unit × quantity`, checked.
pub(crate) fn line_total(unit: Amount, quantity: u32, label: &str) -> Result<Amount, TotalsError> {
    unit.to_minor_units()
        .checked_mul(i64::from(quantity))
        .map(|minor| Money::from_minor(minor, CURRENCY))
        .ok_or_else(|| TotalsError::Overflow(label.to_string()))
}
