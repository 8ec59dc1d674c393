//! Cart store errors.

use thiserror::Error;

use bazaar::{discounts::DiscountConflict, products::ProductId, quantity::ClampWarning};

use crate::api::ApiError;

/// Why a cart store operation did not go through.
///
/// The `Display` text of each variant is what the shopper sees.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// A mutually exclusive discount was attempted. No request was made.
    #[error(transparent)]
    Conflict(#[from] DiscountConflict),

    /// The server refused the coupon.
    #[error("{0}")]
    InvalidCoupon(String),

    /// The server refused the referral code.
    #[error("{0}")]
    InvalidReferral(String),

    /// The server refused the request, e.g. for insufficient stock.
    #[error("{0}")]
    Rejected(String),

    /// The request failed or timed out.
    #[error("Something went wrong, please try again")]
    Network(#[source] ApiError),

    /// The product is not in the cart.
    #[error("This product is no longer in your cart")]
    ItemNotFound(ProductId),

    /// The quantity cannot be changed at all.
    #[error("{0}")]
    Unavailable(ClampWarning),

    /// Another cart update is still in flight.
    #[error("Please wait for the current update to finish")]
    Busy,

    /// The shopper's input was rejected before sending.
    #[error("{0}")]
    InvalidInput(&'static str),
}

impl From<ApiError> for CartStoreError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Rejected { message, .. } => Self::Rejected(message),
            other => Self::Network(other),
        }
    }
}

impl CartStoreError {
    /// Re-labels a server rejection as an invalid coupon.
    pub(crate) fn into_coupon_rejection(self) -> Self {
        match self {
            Self::Rejected(message) => Self::InvalidCoupon(message),
            other => other,
        }
    }

    /// Re-labels a server rejection as an invalid referral code.
    pub(crate) fn into_referral_rejection(self) -> Self {
        match self {
            Self::Rejected(message) => Self::InvalidReferral(message),
            other => other,
        }
    }

    /// Whether the failure was caught on the client without a request.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Conflict(_)
                | Self::ItemNotFound(_)
                | Self::Unavailable(_)
                | Self::Busy
                | Self::InvalidInput(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use bazaar::discounts::DiscountKind;

    use super::*;

    #[test]
    fn rejection_keeps_server_message() {
        let error = CartStoreError::from(ApiError::Rejected {
            status: 400,
            message: "Coupon has expired".to_string(),
        });

        assert_eq!(error.to_string(), "Coupon has expired");
        assert!(!error.is_local());
    }

    #[test]
    fn coupon_rejection_is_relabelled() {
        let error = CartStoreError::Rejected("Invalid coupon".to_string()).into_coupon_rejection();

        assert!(matches!(error, CartStoreError::InvalidCoupon(ref m) if m == "Invalid coupon"));
    }

    #[test]
    fn network_errors_are_generic() {
        let error = CartStoreError::from(ApiError::InvalidSessionCookie);

        assert_eq!(error.to_string(), "Something went wrong, please try again");
    }

    #[test]
    fn conflicts_are_local() {
        let error = CartStoreError::from(DiscountConflict::NotApplied(DiscountKind::Coupon));

        assert!(error.is_local());
        assert_eq!(error.to_string(), "No coupon is applied");
    }
}
