//! Storefront cart API
//!
//! The cart, coupon, referral, offer and wishlist endpoints of the storefront backend. Stores
//! depend on the [`CartApi`] and [`WishlistApi`] traits; [`HttpCartApi`] is the `reqwest`
//! implementation.

use async_trait::async_trait;
use mockall::automock;

use bazaar::{cart::Cart, discounts::flash::FlashOffer, products::ProductId};

mod errors;
mod http;
mod records;

pub use errors::ApiError;
pub use http::HttpCartApi;

/// Remote cart operations.
#[automock]
#[async_trait]
pub trait CartApi: Send + Sync {
    /// `GET /api/cart`
    async fn get_cart(&self) -> Result<Cart, ApiError>;

    /// `POST /api/cart`, adding `quantity` units of a product.
    async fn add_item(&self, product_id: ProductId, quantity: u32) -> Result<Cart, ApiError>;

    /// `PUT /api/cart`, setting the quantity of a line.
    async fn update_quantity(&self, product_id: ProductId, quantity: u32)
    -> Result<Cart, ApiError>;

    /// `DELETE /api/cart/remove/:productId`
    async fn remove_item(&self, product_id: ProductId) -> Result<(), ApiError>;

    /// `DELETE /api/cart/clear-cart`
    async fn clear_cart(&self) -> Result<(), ApiError>;

    /// `POST /api/cart/apply-coupon`
    async fn apply_coupon(&self, code: String) -> Result<Cart, ApiError>;

    /// `POST /api/cart/remove-coupon`
    async fn remove_coupon(&self) -> Result<Cart, ApiError>;

    /// `POST /api/cart/apply-referral`
    async fn apply_referral(&self, code: String) -> Result<Cart, ApiError>;

    /// `POST /api/cart/remove-referral`
    async fn remove_referral(&self) -> Result<Cart, ApiError>;

    /// `GET /api/offers/active`
    async fn active_offer(&self) -> Result<Option<FlashOffer>, ApiError>;
}

/// Remote wishlist operations.
#[automock]
#[async_trait]
pub trait WishlistApi: Send + Sync {
    /// `POST /api/wishlist`
    async fn add_to_wishlist(&self, product_id: ProductId) -> Result<(), ApiError>;

    /// `DELETE /api/wishlist/:productId`
    async fn remove_from_wishlist(&self, product_id: ProductId) -> Result<(), ApiError>;
}
