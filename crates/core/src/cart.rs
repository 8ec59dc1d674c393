//! Cart

use crate::{
    discounts::DiscountState,
    money::{Amount, zero},
    products::{ProductId, ProductSnapshot},
    quantity::QuantityLimit,
    totals::{self, CartTotals, TotalsError},
};

/// A product and the number of units of it in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    /// Product reference
    pub product_id: ProductId,

    /// Units in the cart, at least one
    pub quantity: u32,

    /// Product details as of the last fetch
    pub product: ProductSnapshot,
}

impl CartItem {
    /// Creates a cart line.
    pub fn new(product_id: ProductId, quantity: u32, product: ProductSnapshot) -> Self {
        Self {
            product_id,
            quantity,
            product,
        }
    }

    /// Quantity limit for this line.
    pub fn limit(&self) -> QuantityLimit {
        QuantityLimit::for_stock(self.product.stock)
    }

    /// Unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalsError`] if the line total overflows.
    pub fn line_total(&self) -> Result<Amount, TotalsError> {
        totals::line_total(self.product.unit_price(), self.quantity, self.product_id.as_str())
    }
}

/// Pricing fields as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartPricing {
    /// Sum of line totals
    pub items_price: Amount,

    /// Shipping charge
    pub shipping_price: Amount,

    /// Amount payable
    pub total_price: Amount,
}

impl CartPricing {
    /// Pricing of an empty cart.
    pub fn zero() -> Self {
        Self {
            items_price: zero(),
            shipping_price: zero(),
            total_price: zero(),
        }
    }
}

/// The client's copy of the shopper's cart.
///
/// Prices and discounts come from the server and are replaced wholesale on every fetch; the
/// client never prices a cart on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
    pricing: CartPricing,
    discount: DiscountState,
}

impl Cart {
    /// Creates a cart.
    pub fn new(items: Vec<CartItem>, pricing: CartPricing, discount: DiscountState) -> Self {
        Self {
            items,
            pricing,
            discount,
        }
    }

    /// A cart with no items and no discount.
    pub fn empty() -> Self {
        Self::new(Vec::new(), CartPricing::zero(), DiscountState::NoDiscount)
    }

    /// Lines in display order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The line holding `product_id`, if any.
    pub fn item(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    /// Whether `product_id` is in the cart.
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.item(product_id).is_some()
    }

    /// Server-reported pricing.
    pub fn pricing(&self) -> &CartPricing {
        &self.pricing
    }

    /// The active discount.
    pub fn discount(&self) -> &DiscountState {
        &self.discount
    }

    /// Totals to display, with only the active discount taken off.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalsError`] if money arithmetic fails.
    pub fn totals(&self) -> Result<CartTotals, TotalsError> {
        CartTotals::compute(
            self.pricing.items_price,
            self.pricing.shipping_price,
            &self.discount,
        )
    }

    /// Sum of line totals from the item snapshots.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalsError`] if a line total overflows.
    pub fn computed_items_price(&self) -> Result<Amount, TotalsError> {
        totals::items_subtotal(&self.items)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::empty()
    }
}
