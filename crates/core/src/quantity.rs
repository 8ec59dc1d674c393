//! Quantity clamping
//!
//! Guards every quantity the client sends to the cart API. A requested quantity outside the
//! valid range is replaced with the nearest valid value rather than rejected, and at most one
//! warning explains why.

use std::fmt;

/// Hard cap on units of a single product per cart.
pub const MAX_PER_PRODUCT: u32 = 5;

/// Smallest quantity a cart line can hold.
pub const MIN_QUANTITY: u32 = 1;

/// Upper bound on the quantity of a single cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityLimit {
    max: u32,
}

impl QuantityLimit {
    /// Limit for a product with the given stock, `min(MAX_PER_PRODUCT, stock)`.
    ///
    /// Unknown stock is limited by the hard cap alone.
    pub fn for_stock(stock: Option<u32>) -> Self {
        let max = stock.map_or(MAX_PER_PRODUCT, |stock| stock.min(MAX_PER_PRODUCT));

        Self { max }
    }

    /// The largest allowed quantity.
    pub fn max(self) -> u32 {
        self.max
    }

    /// Whether `quantity` is within the limit.
    pub fn allows(self, quantity: u32) -> bool {
        (MIN_QUANTITY..=self.max).contains(&quantity)
    }

    /// Warning for a line that already holds this limit.
    pub fn reached(self) -> ClampWarning {
        match self.max {
            0 => ClampWarning::OutOfStock,
            max if max < MAX_PER_PRODUCT => ClampWarning::LimitedStock(max),
            _ => ClampWarning::MaxPerProduct,
        }
    }
}

/// Reason a requested quantity was substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClampWarning {
    /// The request exceeded [`MAX_PER_PRODUCT`].
    MaxPerProduct,

    /// The request exceeded the stock on hand.
    LimitedStock(u32),

    /// The request was below [`MIN_QUANTITY`].
    BelowMinimum,

    /// The product has no stock, so no quantity can be sent.
    OutOfStock,
}

impl fmt::Display for ClampWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClampWarning::MaxPerProduct => {
                write!(f, "Maximum allowed quantity is {MAX_PER_PRODUCT} per product")
            }
            ClampWarning::LimitedStock(stock) => write!(f, "Only {stock} available"),
            ClampWarning::BelowMinimum => write!(f, "Minimum quantity is {MIN_QUANTITY}"),
            ClampWarning::OutOfStock => f.write_str("This product is out of stock"),
        }
    }
}

/// Outcome of clamping a requested quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityDecision {
    /// Quantity to send.
    pub quantity: u32,

    /// Why the request was substituted, if it was.
    pub warning: Option<ClampWarning>,

    /// Whether a network call is needed at all.
    pub send: bool,
}

/// Clamp a requested quantity for a line currently holding `current` units.
///
/// The returned quantity never exceeds `min(MAX_PER_PRODUCT, stock)`. When the clamped value
/// equals `current`, `send` is false and no request should be made.
pub fn clamp_quantity(requested: u32, current: u32, stock: Option<u32>) -> QuantityDecision {
    if stock == Some(0) {
        return QuantityDecision {
            quantity: current,
            warning: Some(ClampWarning::OutOfStock),
            send: false,
        };
    }

    let limit = QuantityLimit::for_stock(stock);

    let (quantity, warning) = if requested > limit.max() {
        // Only the bound that was actually hit is reported.
        let warning = match stock {
            Some(stock) if stock < MAX_PER_PRODUCT => ClampWarning::LimitedStock(stock),
            _ => ClampWarning::MaxPerProduct,
        };

        (limit.max(), Some(warning))
    } else if requested < MIN_QUANTITY {
        (MIN_QUANTITY, Some(ClampWarning::BelowMinimum))
    } else {
        (requested, None)
    };

    QuantityDecision {
        quantity,
        warning,
        send: quantity != current,
    }
}
