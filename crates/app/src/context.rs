//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    api::{ApiError, HttpCartApi},
    config::ApiConfig,
    page::CartPage,
    store::CartStore,
    wishlist::WishlistStore,
};

/// Errors raised while building the app context.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// The HTTP client could not be built from the configuration.
    #[error("failed to build storefront client")]
    Client(#[source] ApiError),
}

/// Stores shared by one shopper session.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Cart store
    pub cart: CartStore,

    /// Wishlist store
    pub wishlist: WishlistStore,
}

impl AppContext {
    /// Build application context from API configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn from_config(config: &ApiConfig) -> Result<Self, AppInitError> {
        let api = Arc::new(HttpCartApi::new(config).map_err(AppInitError::Client)?);

        Ok(Self {
            cart: CartStore::new(api.clone()),
            wishlist: WishlistStore::new(api),
        })
    }

    /// A cart page over this session's cart.
    pub fn cart_page(&self) -> CartPage {
        CartPage::new(self.cart.clone())
    }
}
