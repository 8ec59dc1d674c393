//! Cart page
//!
//! Translates shopper commands into [`CartStore`] calls and store state into something a view
//! can render without further decisions.

use jiff::Timestamp;
use thiserror::Error;

use bazaar::{
    cart::CartItem,
    discounts::{DiscountConflict, DiscountKind, DiscountState},
    money::Amount,
    products::ProductId,
    totals::{CartTotals, TotalsError},
};

use crate::store::{CartStore, Outcome};

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// The command went through.
    Success,

    /// The command went through with a substitution.
    Warning,

    /// The command failed.
    Error,
}

/// Feedback for a shopper command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Presentation level
    pub level: NotificationLevel,

    /// Text for the shopper
    pub message: String,
}

impl Notification {
    /// Notification for a store outcome, or `None` if there is nothing to say.
    pub fn from_outcome(outcome: Outcome) -> Option<Self> {
        let level = match (outcome.success, outcome.warning) {
            (false, _) => NotificationLevel::Error,
            (true, Some(_)) => NotificationLevel::Warning,
            (true, None) => NotificationLevel::Success,
        };

        let message = match (outcome.message, level) {
            (Some(message), _) => message,
            (None, NotificationLevel::Error) => "Something went wrong, please try again".into(),
            (None, _) => return None,
        };

        Some(Self { level, message })
    }
}

/// State of a discount code input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscountInput {
    /// A code can be entered.
    Available,

    /// This kind is applied with the given code.
    Applied(String),

    /// Disabled while another discount is active.
    Blocked(DiscountKind),
}

impl DiscountInput {
    fn for_kind(discount: &DiscountState, kind: DiscountKind, now: Timestamp) -> Self {
        match discount.check_apply(kind, now) {
            Err(DiscountConflict::AlreadyApplied(_)) => {
                Self::Applied(discount.code().unwrap_or_default().to_string())
            }
            Err(DiscountConflict::Exclusive { active, .. }) => Self::Blocked(active),
            Ok(()) | Err(DiscountConflict::NotApplied(_) | DiscountConflict::Automatic) => {
                Self::Available
            }
        }
    }

    /// Whether the input accepts a new code.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// One row of the cart table.
#[derive(Debug, Clone, PartialEq)]
pub struct LineView {
    /// Product
    pub product_id: ProductId,

    /// Product title
    pub title: String,

    /// Price per unit, after any sale price
    pub unit_price: Amount,

    /// Whether the unit price is a sale price
    pub on_sale: bool,

    /// Units in the cart
    pub quantity: u32,

    /// Largest quantity the line may hold
    pub max_quantity: u32,

    /// Whether the increment control is enabled
    pub can_increment: bool,

    /// Whether the decrement control is enabled
    pub can_decrement: bool,

    /// `unit_price × quantity`, if representable
    pub line_total: Option<Amount>,
}

impl LineView {
    fn new(item: &CartItem, updating: bool) -> Self {
        let max_quantity = item.limit().max();

        Self {
            product_id: item.product_id.clone(),
            title: item.product.title.clone(),
            unit_price: item.product.unit_price(),
            on_sale: item.product.is_on_sale(),
            quantity: item.quantity,
            max_quantity,
            can_increment: !updating && item.quantity < max_quantity,
            can_decrement: !updating && item.quantity > 1,
            line_total: item.line_total().ok(),
        }
    }
}

/// Everything the cart page renders.
#[derive(Debug, Clone, PartialEq)]
pub struct CartView {
    /// Cart rows in server order
    pub lines: Vec<LineView>,

    /// Totals summary
    pub totals: CartTotals,

    /// Label of the active discount, if any
    pub discount_label: Option<String>,

    /// Coupon input state
    pub coupon: DiscountInput,

    /// Referral input state
    pub referral: DiscountInput,

    /// A fetch is in flight
    pub is_loading: bool,

    /// A mutation is in flight
    pub is_updating: bool,
}

impl CartView {
    /// Whether there is nothing in the cart.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// What the shopper is about to order.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSummary {
    /// Lines to order
    pub items: Vec<CartItem>,

    /// Totals to charge
    pub totals: CartTotals,

    /// Applied coupon or referral code
    pub applied_code: Option<String>,

    /// Discount included in the totals
    pub discount: DiscountState,
}

/// Why the cart cannot proceed to checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("Your cart is empty")]
    EmptyCart,

    /// A line exceeds its quantity limit.
    #[error("Only {max} of {title} can be ordered")]
    QuantityUnavailable {
        /// Product title
        title: String,

        /// Allowed quantity
        max: u32,
    },

    /// A line's product has sold out.
    #[error("{0} is out of stock")]
    OutOfStock(String),

    /// A cart request is still in flight.
    #[error("Please wait for the current update to finish")]
    Busy,

    /// Totals could not be computed.
    #[error(transparent)]
    Totals(#[from] TotalsError),
}

/// Controller behind the cart page.
#[derive(Debug, Clone)]
pub struct CartPage {
    store: CartStore,
}

impl CartPage {
    /// Creates a page over the given store.
    #[must_use]
    pub fn new(store: CartStore) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &CartStore {
        &self.store
    }

    /// Load the cart. Only failures are reported.
    pub async fn load(&self) -> Option<Notification> {
        Notification::from_outcome(self.store.fetch_cart().await)
    }

    /// Add one unit to a line.
    pub async fn increment(&self, product_id: ProductId) -> Option<Notification> {
        let Some(current) = self.quantity_of(&product_id) else {
            return Notification::from_outcome(self.store.add_item(product_id, 1).await);
        };

        self.set_quantity(product_id, current.saturating_add(1))
            .await
    }

    /// Take one unit off a line. A line is never decremented below one unit.
    pub async fn decrement(&self, product_id: ProductId) -> Option<Notification> {
        let current = self.quantity_of(&product_id).unwrap_or_default();

        self.set_quantity(product_id, current.saturating_sub(1))
            .await
    }

    /// Set a line's quantity.
    pub async fn set_quantity(&self, product_id: ProductId, quantity: u32) -> Option<Notification> {
        Notification::from_outcome(self.store.update_quantity(product_id, quantity).await)
    }

    /// Add units of a product.
    pub async fn add(&self, product_id: ProductId, quantity: u32) -> Option<Notification> {
        Notification::from_outcome(self.store.add_item(product_id, quantity).await)
    }

    /// Remove a line.
    pub async fn remove(&self, product_id: ProductId) -> Option<Notification> {
        Notification::from_outcome(self.store.remove_item(product_id).await)
    }

    /// Empty the cart.
    pub async fn clear(&self) -> Option<Notification> {
        Notification::from_outcome(self.store.clear_cart().await)
    }

    /// Apply a coupon code.
    pub async fn apply_coupon(&self, code: &str) -> Option<Notification> {
        Notification::from_outcome(self.store.apply_coupon(code).await)
    }

    /// Remove the coupon.
    pub async fn remove_coupon(&self) -> Option<Notification> {
        Notification::from_outcome(self.store.remove_coupon().await)
    }

    /// Apply a referral code.
    pub async fn apply_referral(&self, code: &str) -> Option<Notification> {
        Notification::from_outcome(self.store.apply_referral(code).await)
    }

    /// Remove the referral code.
    pub async fn remove_referral(&self) -> Option<Notification> {
        Notification::from_outcome(self.store.remove_referral().await)
    }

    /// Render state at the current time.
    pub fn view(&self) -> CartView {
        self.view_at(Timestamp::now())
    }

    /// Render state as of `now`.
    pub fn view_at(&self, now: Timestamp) -> CartView {
        let cart = self.store.cart();
        let is_updating = self.store.is_updating();
        let discount = cart.discount();

        let totals = cart.totals().unwrap_or_else(|_overflow| {
            let pricing = cart.pricing();

            CartTotals {
                items_price: pricing.items_price,
                shipping_price: pricing.shipping_price,
                discount: discount.amount(),
                total: pricing.total_price,
            }
        });

        CartView {
            lines: cart
                .items()
                .iter()
                .map(|item| LineView::new(item, is_updating))
                .collect(),
            totals,
            discount_label: discount.kind().map(|_| discount.to_string()),
            coupon: DiscountInput::for_kind(discount, DiscountKind::Coupon, now),
            referral: DiscountInput::for_kind(discount, DiscountKind::Referral, now),
            is_loading: self.store.is_loading(),
            is_updating,
        }
    }

    /// Validate the cart for checkout.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if the cart is empty, a line is out of bounds, or a request is
    /// still in flight.
    pub fn checkout(&self) -> Result<CheckoutSummary, CheckoutError> {
        if self.store.is_updating() || self.store.is_loading() {
            return Err(CheckoutError::Busy);
        }

        let cart = self.store.cart();

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        for item in cart.items() {
            let limit = item.limit();

            if limit.max() == 0 {
                return Err(CheckoutError::OutOfStock(item.product.title.clone()));
            }

            if !limit.allows(item.quantity) {
                return Err(CheckoutError::QuantityUnavailable {
                    title: item.product.title.clone(),
                    max: limit.max(),
                });
            }
        }

        let totals = cart.totals()?;
        let discount = cart.discount().clone();

        Ok(CheckoutSummary {
            items: cart.items().to_vec(),
            totals,
            applied_code: discount.code().map(str::to_string),
            discount,
        })
    }

    fn quantity_of(&self, product_id: &ProductId) -> Option<u32> {
        self.store
            .cart()
            .item(product_id)
            .map(|item| item.quantity)
    }
}
