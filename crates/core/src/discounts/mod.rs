//! Discounts
//!
//! A cart carries at most one active discount: a coupon, a referral code, or the storefront's
//! flash offer. [`DiscountState`] makes "two discounts at once" unrepresentable, and
//! [`DiscountState::check_apply`] rejects a conflicting application before any request is made.

use std::fmt;

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::MoneyError;
use thiserror::Error;

use crate::money::{Amount, zero};

pub mod flash;

/// Errors specific to discount calculations.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// The kinds of discount a cart can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscountKind {
    /// A coupon code entered by the shopper.
    Coupon,

    /// An influencer referral code entered by the shopper.
    Referral,

    /// The storefront-wide flash offer, applied by the server.
    FlashOffer,
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiscountKind::Coupon => "coupon",
            DiscountKind::Referral => "referral code",
            DiscountKind::FlashOffer => "flash offer",
        })
    }
}

/// A discount transition refused on the client.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DiscountConflict {
    /// Another kind of discount is already active.
    #[error("Cannot apply a {requested} while a {active} is active")]
    Exclusive {
        /// The discount currently driving the total.
        active: DiscountKind,

        /// The discount the shopper tried to apply.
        requested: DiscountKind,
    },

    /// The same kind of discount is already applied.
    #[error("A {0} is already applied; remove it first")]
    AlreadyApplied(DiscountKind),

    /// Nothing of this kind is applied, so there is nothing to remove.
    #[error("No {0} is applied")]
    NotApplied(DiscountKind),

    /// Flash offers are applied and removed by the server only.
    #[error("The flash offer is applied automatically")]
    Automatic,
}

/// The single discount currently driving the cart total.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DiscountState {
    /// No discount.
    #[default]
    NoDiscount,

    /// A coupon validated by the server.
    Coupon {
        /// Code as entered
        code: String,

        /// Amount taken off the cart
        amount: Amount,
    },

    /// A referral code validated by the server.
    Referral {
        /// Code as entered
        code: String,

        /// Amount taken off the cart
        amount: Amount,
    },

    /// The flash offer, computed by the server.
    FlashOffer {
        /// Percentage off the items price
        percent: Percentage,

        /// Amount taken off the cart
        amount: Amount,

        /// When the offer ends, if known
        expires_at: Option<Timestamp>,
    },
}

impl DiscountState {
    /// Build the active discount from the raw cart fields.
    ///
    /// The server should never report more than one discount, but if it does, the
    /// highest-precedence one wins: coupon, then referral, then flash offer. Amounts are never
    /// summed.
    pub fn reconcile(fields: DiscountFields) -> Self {
        let DiscountFields {
            coupon_code,
            coupon_discount,
            referral_code,
            referral_discount,
            flash_discount,
            flash_percent,
            flash_expires_at,
        } = fields;

        if let Some(code) = applied_code(coupon_code, coupon_discount) {
            return DiscountState::Coupon {
                code,
                amount: coupon_discount,
            };
        }

        if let Some(code) = applied_code(referral_code, referral_discount) {
            return DiscountState::Referral {
                code,
                amount: referral_discount,
            };
        }

        if flash_discount.to_minor_units() > 0 {
            return DiscountState::FlashOffer {
                percent: flash_percent,
                amount: flash_discount,
                expires_at: flash_expires_at,
            };
        }

        DiscountState::NoDiscount
    }

    /// Kind of the active discount.
    pub fn kind(&self) -> Option<DiscountKind> {
        match self {
            DiscountState::NoDiscount => None,
            DiscountState::Coupon { .. } => Some(DiscountKind::Coupon),
            DiscountState::Referral { .. } => Some(DiscountKind::Referral),
            DiscountState::FlashOffer { .. } => Some(DiscountKind::FlashOffer),
        }
    }

    /// Amount taken off the cart, zero when there is no discount.
    pub fn amount(&self) -> Amount {
        match self {
            DiscountState::NoDiscount => zero(),
            DiscountState::Coupon { amount, .. }
            | DiscountState::Referral { amount, .. }
            | DiscountState::FlashOffer { amount, .. } => *amount,
        }
    }

    /// Code entered by the shopper, for coupons and referrals.
    pub fn code(&self) -> Option<&str> {
        match self {
            DiscountState::Coupon { code, .. } | DiscountState::Referral { code, .. } => {
                Some(code)
            }
            DiscountState::NoDiscount | DiscountState::FlashOffer { .. } => None,
        }
    }

    /// Coupon amount, zero unless a coupon is active.
    pub fn coupon_discount(&self) -> Amount {
        self.amount_if(DiscountKind::Coupon)
    }

    /// Referral amount, zero unless a referral code is active.
    pub fn referral_discount(&self) -> Amount {
        self.amount_if(DiscountKind::Referral)
    }

    /// Flash offer amount, zero unless the flash offer is active.
    pub fn flash_discount(&self) -> Amount {
        self.amount_if(DiscountKind::FlashOffer)
    }

    /// Whether this discount still blocks others at `now`.
    ///
    /// A flash offer past its end time stops blocking, though its amount stays on the cart until
    /// the next fetch replaces it.
    pub fn is_blocking_at(&self, now: Timestamp) -> bool {
        match self {
            DiscountState::NoDiscount => false,
            DiscountState::Coupon { .. } | DiscountState::Referral { .. } => true,
            DiscountState::FlashOffer { expires_at, .. } => {
                expires_at.is_none_or(|expires_at| now < expires_at)
            }
        }
    }

    /// Check that `requested` may be applied on top of this state.
    ///
    /// # Errors
    ///
    /// - [`DiscountConflict::Automatic`]: flash offers cannot be requested.
    /// - [`DiscountConflict::AlreadyApplied`]: the same kind is already applied.
    /// - [`DiscountConflict::Exclusive`]: another kind is active.
    pub fn check_apply(
        &self,
        requested: DiscountKind,
        now: Timestamp,
    ) -> Result<(), DiscountConflict> {
        if requested == DiscountKind::FlashOffer {
            return Err(DiscountConflict::Automatic);
        }

        if !self.is_blocking_at(now) {
            return Ok(());
        }

        match self.kind() {
            None => Ok(()),
            Some(active) if active == requested => Err(DiscountConflict::AlreadyApplied(active)),
            Some(active) => Err(DiscountConflict::Exclusive { active, requested }),
        }
    }

    /// Check that `kind` is the active discount and may be removed.
    ///
    /// # Errors
    ///
    /// - [`DiscountConflict::Automatic`]: flash offers cannot be removed.
    /// - [`DiscountConflict::NotApplied`]: `kind` is not active.
    pub fn check_remove(&self, kind: DiscountKind) -> Result<(), DiscountConflict> {
        if kind == DiscountKind::FlashOffer {
            return Err(DiscountConflict::Automatic);
        }

        if self.kind() == Some(kind) {
            Ok(())
        } else {
            Err(DiscountConflict::NotApplied(kind))
        }
    }

    fn amount_if(&self, kind: DiscountKind) -> Amount {
        if self.kind() == Some(kind) {
            self.amount()
        } else {
            zero()
        }
    }
}

impl fmt::Display for DiscountState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountState::NoDiscount => f.write_str("No discount"),
            DiscountState::Coupon { code, .. } => write!(f, "Coupon {code}"),
            DiscountState::Referral { code, .. } => write!(f, "Referral {code}"),
            DiscountState::FlashOffer { percent, .. } => {
                write!(f, "Flash offer {}%", percent_points(*percent).normalize())
            }
        }
    }
}

/// Raw discount fields as the cart API reports them.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountFields {
    /// Applied coupon code
    pub coupon_code: Option<String>,

    /// Coupon amount
    pub coupon_discount: Amount,

    /// Applied referral code
    pub referral_code: Option<String>,

    /// Referral amount
    pub referral_discount: Amount,

    /// Flash offer amount
    pub flash_discount: Amount,

    /// Flash offer percentage
    pub flash_percent: Percentage,

    /// Flash offer end time
    pub flash_expires_at: Option<Timestamp>,
}

impl DiscountFields {
    /// Fields describing a cart with no discount at all.
    pub fn none() -> Self {
        Self {
            coupon_code: None,
            coupon_discount: zero(),
            referral_code: None,
            referral_discount: zero(),
            flash_discount: zero(),
            flash_percent: Percentage::from(Decimal::ZERO),
            flash_expires_at: None,
        }
    }
}

/// A code counts as applied when the server named it or charged an amount for it.
fn applied_code(code: Option<String>, amount: Amount) -> Option<String> {
    match code.filter(|code| !code.trim().is_empty()) {
        Some(code) => Some(code),
        None if amount.to_minor_units() > 0 => Some(String::new()),
        None => None,
    }
}

/// Converts a fractional percentage to percent points for display.
pub fn percent_points(percentage: Percentage) -> Decimal {
    // `Percentage` is a fraction (e.g. 0.25), so multiply by 100 to print percent points.
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// # Errors
///
/// Returns an error if the percentage calculation overflows or cannot be safely represented
/// (`DiscountError::PercentConversion`).
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}
