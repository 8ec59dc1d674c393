//! Flash offers

use decimal_percentage::Percentage;
use jiff::{SignedDuration, Timestamp};
use rusty_money::Money;

use crate::{
    discounts::{DiscountError, percent_of_minor},
    money::{self, Amount, CURRENCY},
};

/// A time-boxed, storefront-wide percentage discount.
///
/// The server applies it to every cart without a coupon or referral code; the client only uses
/// it to announce the offer and preview savings.
#[derive(Debug, Clone, PartialEq)]
pub struct FlashOffer {
    /// Offer title
    pub title: String,

    /// Percentage off the items price
    pub percent: Percentage,

    /// Cap on the discount, if any
    pub max_discount: Option<Amount>,

    /// When the offer starts, if scheduled
    pub starts_at: Option<Timestamp>,

    /// When the offer ends
    pub ends_at: Timestamp,
}

impl FlashOffer {
    /// Whether the offer is running at `now`.
    pub fn is_live_at(&self, now: Timestamp) -> bool {
        self.starts_at.is_none_or(|starts_at| starts_at <= now) && now < self.ends_at
    }

    /// Time left until the offer ends, or `None` once it has ended.
    pub fn remaining_at(&self, now: Timestamp) -> Option<SignedDuration> {
        let remaining = self.ends_at.duration_since(now);

        remaining.is_positive().then_some(remaining)
    }

    /// Estimate the discount this offer would give on `items_price`.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the percentage cannot be represented in minor units.
    pub fn estimate(&self, items_price: Amount) -> Result<Amount, DiscountError> {
        let minor = percent_of_minor(&self.percent, items_price.to_minor_units())?;
        let uncapped = Money::from_minor(minor, CURRENCY);

        Ok(match self.max_discount {
            Some(cap) => money::min(uncapped, cap),
            None => uncapped,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn offer() -> Result<FlashOffer, jiff::Error> {
        Ok(FlashOffer {
            title: "Diwali Flash Sale".to_string(),
            percent: Percentage::from(0.2),
            max_discount: Some(Money::from_minor(15_000, CURRENCY)),
            starts_at: Some("2026-11-01T00:00:00Z".parse()?),
            ends_at: "2026-11-02T00:00:00Z".parse()?,
        })
    }

    #[test]
    fn live_only_between_start_and_end() -> TestResult {
        let offer = offer()?;

        assert!(!offer.is_live_at("2026-10-31T23:59:59Z".parse()?));
        assert!(offer.is_live_at("2026-11-01T12:00:00Z".parse()?));
        assert!(!offer.is_live_at("2026-11-02T00:00:00Z".parse()?));

        Ok(())
    }

    #[test]
    fn remaining_time_until_end() -> TestResult {
        let offer = offer()?;

        assert_eq!(
            offer.remaining_at("2026-11-01T22:00:00Z".parse()?),
            Some(SignedDuration::from_hours(2))
        );
        assert_eq!(offer.remaining_at("2026-11-03T00:00:00Z".parse()?), None);

        Ok(())
    }

    #[test]
    fn estimate_below_cap() -> TestResult {
        let offer = offer()?;

        assert_eq!(
            offer.estimate(Money::from_minor(50_000, CURRENCY))?,
            Money::from_minor(10_000, CURRENCY)
        );

        Ok(())
    }

    #[test]
    fn estimate_is_capped() -> TestResult {
        let offer = offer()?;

        assert_eq!(
            offer.estimate(Money::from_minor(200_000, CURRENCY))?,
            Money::from_minor(15_000, CURRENCY)
        );

        Ok(())
    }
}
