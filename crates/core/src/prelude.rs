//! Bazaar prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartItem, CartPricing},
    discounts::{
        DiscountConflict, DiscountError, DiscountFields, DiscountKind, DiscountState,
        flash::FlashOffer,
    },
    money::{Amount, CURRENCY, MoneyConversionError, from_major, zero},
    products::{ProductId, ProductSnapshot},
    quantity::{
        ClampWarning, MAX_PER_PRODUCT, MIN_QUANTITY, QuantityDecision, QuantityLimit,
        clamp_quantity,
    },
    totals::{CartTotals, TotalsError},
};
