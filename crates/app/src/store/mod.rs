//! Cart store
//!
//! The client's single source of truth for the shopper's cart. Every mutation goes through the
//! remote API and local state changes only once the server has confirmed it; prices and
//! discounts are always taken from the server's cart rather than computed locally.
//!
//! Operations never fail outward. Each resolves to an [`Outcome`] the caller can show as a
//! notification.

use std::sync::{Arc, PoisonError, RwLock};

use jiff::Timestamp;
use tracing::{debug, error, info, warn};

use bazaar::{
    cart::Cart,
    discounts::{DiscountConflict, DiscountKind, flash::FlashOffer},
    products::ProductId,
    quantity::{ClampWarning, MIN_QUANTITY, QuantityLimit, clamp_quantity},
};

use crate::api::CartApi;

mod errors;
mod sequence;

pub use errors::CartStoreError;
pub use sequence::{RequestSequence, Ticket};

/// Result of a store operation, shaped for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Whether the operation went through.
    pub success: bool,

    /// Text for the shopper, if there is anything to say.
    pub message: Option<String>,

    /// Set when a requested quantity was substituted.
    pub warning: Option<ClampWarning>,
}

impl Outcome {
    /// A successful outcome.
    pub fn succeeded(message: Option<String>) -> Self {
        Self {
            success: true,
            message,
            warning: None,
        }
    }

    /// A failed outcome.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            warning: None,
        }
    }
}

/// What a successful operation has to report.
#[derive(Debug, Default)]
struct Applied {
    message: Option<String>,
    warning: Option<ClampWarning>,
}

impl Applied {
    fn silent() -> Self {
        Self::default()
    }

    fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            warning: None,
        }
    }

    fn warned(warning: Option<ClampWarning>) -> Self {
        Self {
            message: warning.map(|warning| warning.to_string()),
            warning,
        }
    }
}

#[derive(Debug, Default)]
struct CartState {
    cart: Cart,
    loaded: bool,
    loading: usize,
    updating: bool,
}

/// Handle to the shopper's cart.
///
/// Cloning is cheap; clones share state. Create one per session at the application root and
/// hand it to whatever needs it.
#[derive(Clone)]
pub struct CartStore {
    api: Arc<dyn CartApi>,
    state: Arc<RwLock<CartState>>,
    sequence: Arc<RequestSequence>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.state)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Creates a store with an empty, not yet loaded cart.
    #[must_use]
    pub fn new(api: Arc<dyn CartApi>) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(CartState::default())),
            sequence: Arc::new(RequestSequence::default()),
        }
    }

    /// A copy of the current cart.
    pub fn cart(&self) -> Cart {
        self.read(|state| state.cart.clone())
    }

    /// Whether a cart has been fetched at least once.
    pub fn is_loaded(&self) -> bool {
        self.read(|state| state.loaded)
    }

    /// Whether a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.read(|state| state.loading > 0)
    }

    /// Whether a mutation is in flight.
    pub fn is_updating(&self) -> bool {
        self.read(|state| state.updating)
    }

    /// Load the cart from the server, replacing local state wholesale.
    pub async fn fetch_cart(&self) -> Outcome {
        finish("fetch_cart", self.refetch().await.map(|()| Applied::silent()))
    }

    /// Add `quantity` units of a product.
    ///
    /// The combined quantity is clamped the same way as [`CartStore::update_quantity`].
    pub async fn add_item(&self, product_id: ProductId, quantity: u32) -> Outcome {
        finish("add_item", self.try_add_item(product_id, quantity).await)
    }

    /// Set the quantity of a line, clamped to `min(5, stock)`.
    ///
    /// A clamped request is still sent with the clamped value, and the outcome carries the
    /// warning. Nothing is sent when the clamped value equals the current quantity.
    pub async fn update_quantity(&self, product_id: ProductId, requested: u32) -> Outcome {
        finish(
            "update_quantity",
            self.try_update_quantity(product_id, requested).await,
        )
    }

    /// Remove a line, then refetch so pricing matches the server.
    pub async fn remove_item(&self, product_id: ProductId) -> Outcome {
        finish("remove_item", self.try_remove_item(product_id).await)
    }

    /// Empty the cart on the server and locally, dropping any discount.
    pub async fn clear_cart(&self) -> Outcome {
        finish("clear_cart", self.try_clear_cart().await)
    }

    /// Apply a coupon. Refused locally while a referral code or flash offer is active.
    pub async fn apply_coupon(&self, code: &str) -> Outcome {
        finish(
            "apply_coupon",
            self.try_apply_code(DiscountKind::Coupon, code).await,
        )
    }

    /// Remove the applied coupon.
    pub async fn remove_coupon(&self) -> Outcome {
        finish(
            "remove_coupon",
            self.try_remove_code(DiscountKind::Coupon).await,
        )
    }

    /// Apply a referral code. Refused locally while a coupon or flash offer is active.
    pub async fn apply_referral(&self, code: &str) -> Outcome {
        finish(
            "apply_referral",
            self.try_apply_code(DiscountKind::Referral, code).await,
        )
    }

    /// Remove the applied referral code.
    pub async fn remove_referral(&self) -> Outcome {
        finish(
            "remove_referral",
            self.try_remove_code(DiscountKind::Referral).await,
        )
    }

    /// The storefront's running flash offer, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] if the offer could not be fetched.
    pub async fn active_offer(&self) -> Result<Option<FlashOffer>, CartStoreError> {
        Ok(self.api.active_offer().await?)
    }

    async fn refetch(&self) -> Result<(), CartStoreError> {
        let _loading = self.begin_loading();
        let ticket = self.sequence.issue();

        let cart = self.api.get_cart().await?;

        self.commit(ticket, cart);

        Ok(())
    }

    async fn try_add_item(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Applied, CartStoreError> {
        if quantity < MIN_QUANTITY {
            return Err(CartStoreError::InvalidInput("Quantity must be at least 1"));
        }

        let _updating = self.begin_update()?;

        let (current, stock) = self.read(|state| {
            state
                .cart
                .item(&product_id)
                .map_or((0, None), |item| (item.quantity, item.product.stock))
        });

        let decision = clamp_quantity(current.saturating_add(quantity), current, stock);

        let Some(added) = decision
            .quantity
            .checked_sub(current)
            .filter(|added| *added > 0)
        else {
            let warning = decision
                .warning
                .unwrap_or_else(|| QuantityLimit::for_stock(stock).reached());
            warn!(product = %product_id, %warning, "nothing left to add");

            return Err(CartStoreError::Unavailable(warning));
        };

        if let Some(warning) = decision.warning {
            warn!(product = %product_id, quantity, added, %warning, "added quantity clamped");
        }

        let ticket = self.sequence.issue();
        let cart = self.api.add_item(product_id.clone(), added).await?;
        self.commit(ticket, cart);

        info!(product = %product_id, added, "item added to cart");

        Ok(Applied {
            message: Some(
                decision
                    .warning
                    .map_or_else(|| "Added to cart".to_string(), |w| w.to_string()),
            ),
            warning: decision.warning,
        })
    }

    async fn try_update_quantity(
        &self,
        product_id: ProductId,
        requested: u32,
    ) -> Result<Applied, CartStoreError> {
        let _updating = self.begin_update()?;

        let (current, stock) = self
            .read(|state| {
                state
                    .cart
                    .item(&product_id)
                    .map(|item| (item.quantity, item.product.stock))
            })
            .ok_or_else(|| CartStoreError::ItemNotFound(product_id.clone()))?;

        let decision = clamp_quantity(requested, current, stock);

        if let Some(warning) = decision.warning {
            warn!(
                product = %product_id,
                requested,
                clamped = decision.quantity,
                %warning,
                "requested quantity clamped"
            );
        }

        if !decision.send {
            return match decision.warning {
                Some(warning @ ClampWarning::OutOfStock) => {
                    Err(CartStoreError::Unavailable(warning))
                }
                warning => Ok(Applied::warned(warning)),
            };
        }

        let ticket = self.sequence.issue();
        let cart = self
            .api
            .update_quantity(product_id.clone(), decision.quantity)
            .await?;
        self.commit(ticket, cart);

        info!(product = %product_id, quantity = decision.quantity, "cart quantity updated");

        Ok(Applied::warned(decision.warning))
    }

    async fn try_remove_item(&self, product_id: ProductId) -> Result<Applied, CartStoreError> {
        let _updating = self.begin_update()?;

        if !self.read(|state| state.cart.contains(&product_id)) {
            return Err(CartStoreError::ItemNotFound(product_id));
        }

        self.api.remove_item(product_id.clone()).await?;

        info!(product = %product_id, "item removed from cart");

        self.refetch().await?;

        Ok(Applied::message("Item removed from cart"))
    }

    async fn try_clear_cart(&self) -> Result<Applied, CartStoreError> {
        let _updating = self.begin_update()?;
        let ticket = self.sequence.issue();

        self.api.clear_cart().await?;
        self.commit(ticket, Cart::empty());

        info!("cart cleared");

        Ok(Applied::message("Cart cleared"))
    }

    async fn try_apply_code(
        &self,
        kind: DiscountKind,
        code: &str,
    ) -> Result<Applied, CartStoreError> {
        let code = code.trim();

        if code.is_empty() {
            return Err(CartStoreError::InvalidInput(match kind {
                DiscountKind::Referral => "Please enter a referral code",
                DiscountKind::Coupon | DiscountKind::FlashOffer => "Please enter a coupon code",
            }));
        }

        let _updating = self.begin_update()?;

        self.read(|state| state.cart.discount().check_apply(kind, Timestamp::now()))?;

        let ticket = self.sequence.issue();

        let cart = match kind {
            DiscountKind::Coupon => self
                .api
                .apply_coupon(code.to_string())
                .await
                .map_err(|e| CartStoreError::from(e).into_coupon_rejection())?,
            DiscountKind::Referral => self
                .api
                .apply_referral(code.to_string())
                .await
                .map_err(|e| CartStoreError::from(e).into_referral_rejection())?,
            DiscountKind::FlashOffer => {
                return Err(DiscountConflict::Automatic.into());
            }
        };

        self.commit(ticket, cart);

        info!(%kind, code, "discount applied");

        Ok(Applied::message(match kind {
            DiscountKind::Referral => format!("Referral code {code} applied"),
            DiscountKind::Coupon | DiscountKind::FlashOffer => format!("Coupon {code} applied"),
        }))
    }

    async fn try_remove_code(&self, kind: DiscountKind) -> Result<Applied, CartStoreError> {
        let _updating = self.begin_update()?;

        self.read(|state| state.cart.discount().check_remove(kind))?;

        let ticket = self.sequence.issue();

        let cart = match kind {
            DiscountKind::Coupon => self.api.remove_coupon().await?,
            DiscountKind::Referral => self.api.remove_referral().await?,
            DiscountKind::FlashOffer => {
                return Err(DiscountConflict::Automatic.into());
            }
        };

        self.commit(ticket, cart);

        info!(%kind, "discount removed");

        Ok(Applied::message(match kind {
            DiscountKind::Referral => "Referral code removed",
            DiscountKind::Coupon | DiscountKind::FlashOffer => "Coupon removed",
        }))
    }

    /// Replace the cart if `ticket` is still the latest request. Returns whether it committed.
    fn commit(&self, ticket: Ticket, cart: Cart) -> bool {
        warn_on_total_mismatch(&cart);

        self.write(|state| {
            // Checked under the write lock so an older response can't land after a newer one.
            if !self.sequence.is_current(ticket) {
                debug!(?ticket, "discarding superseded cart response");

                return false;
            }

            state.cart = cart;
            state.loaded = true;

            true
        })
    }

    fn begin_update(&self) -> Result<FlagGuard, CartStoreError> {
        self.write(|state| {
            if state.updating {
                return Err(CartStoreError::Busy);
            }

            state.updating = true;

            Ok(())
        })?;

        Ok(FlagGuard {
            state: Arc::clone(&self.state),
            flag: Flag::Updating,
        })
    }

    fn begin_loading(&self) -> FlagGuard {
        self.write(|state| state.loading += 1);

        FlagGuard {
            state: Arc::clone(&self.state),
            flag: Flag::Loading,
        }
    }

    fn read<T>(&self, f: impl FnOnce(&CartState) -> T) -> T {
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write<T>(&self, f: impl FnOnce(&mut CartState) -> T) -> T {
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner))
    }
}

#[derive(Debug, Clone, Copy)]
enum Flag {
    Loading,
    Updating,
}

/// Clears an in-flight flag when the operation ends, however it ends.
#[derive(Debug)]
struct FlagGuard {
    state: Arc<RwLock<CartState>>,
    flag: Flag,
}

impl Drop for FlagGuard {
    fn drop(&mut self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        match self.flag {
            Flag::Loading => state.loading = state.loading.saturating_sub(1),
            Flag::Updating => state.updating = false,
        }
    }
}

fn warn_on_total_mismatch(cart: &Cart) {
    match cart.totals() {
        Ok(totals) if totals.total != cart.pricing().total_price => {
            warn!(
                derived = %totals.total,
                reported = %cart.pricing().total_price,
                "server total differs from derived total"
            );
        }
        Ok(_) => {}
        Err(error) => warn!(%error, "could not derive cart totals"),
    }
}

fn finish(operation: &'static str, result: Result<Applied, CartStoreError>) -> Outcome {
    match result {
        Ok(applied) => Outcome {
            success: true,
            message: applied.message,
            warning: applied.warning,
        },
        Err(failure) => {
            match &failure {
                CartStoreError::Network(source) => {
                    error!(operation, error = %source, "cart request failed");
                }
                local if local.is_local() => {
                    warn!(operation, error = %local, "cart operation refused");
                }
                rejected => warn!(operation, error = %rejected, "cart operation rejected"),
            }

            Outcome::failed(failure.to_string())
        }
    }
}
