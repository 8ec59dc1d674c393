//! Wishlist store
//!
//! Membership flips immediately and is rolled back if the server refuses.

use std::{
    collections::BTreeSet,
    sync::{Arc, PoisonError, RwLock},
};

use thiserror::Error;
use tracing::{info, warn};

use bazaar::products::ProductId;

use crate::{
    api::{ApiError, WishlistApi},
    store::Outcome,
};

/// Why a wishlist toggle did not go through.
#[derive(Debug, Error)]
pub enum WishlistError {
    /// A toggle for the same product is still in flight.
    #[error("Please wait for the current update to finish")]
    Busy,

    /// The server refused the change.
    #[error("{0}")]
    Rejected(String),

    /// The request failed or timed out.
    #[error("Something went wrong, please try again")]
    Network(#[source] ApiError),
}

impl From<ApiError> for WishlistError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Rejected { message, .. } => Self::Rejected(message),
            other => Self::Network(other),
        }
    }
}

#[derive(Debug, Default)]
struct WishlistState {
    items: BTreeSet<ProductId>,
    pending: BTreeSet<ProductId>,
}

/// The shopper's wishlist.
#[derive(Clone)]
pub struct WishlistStore {
    api: Arc<dyn WishlistApi>,
    state: Arc<RwLock<WishlistState>>,
}

impl std::fmt::Debug for WishlistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl WishlistStore {
    /// Creates an empty wishlist.
    #[must_use]
    pub fn new(api: Arc<dyn WishlistApi>) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(WishlistState::default())),
        }
    }

    /// Replace membership with the server's list.
    pub fn replace(&self, product_ids: impl IntoIterator<Item = ProductId>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        state.items = product_ids.into_iter().collect();
    }

    /// Whether the product is wishlisted.
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .contains(product_id)
    }

    /// Wishlisted products in id order.
    pub fn items(&self) -> Vec<ProductId> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .iter()
            .cloned()
            .collect()
    }

    /// Whether a toggle for the product is in flight.
    pub fn is_pending(&self, product_id: &ProductId) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .contains(product_id)
    }

    /// Add the product if absent, remove it if present.
    pub async fn toggle(&self, product_id: ProductId) -> Outcome {
        match self.try_toggle(product_id.clone()).await {
            Ok(message) => Outcome::succeeded(Some(message.to_string())),
            Err(error) => {
                warn!(product = %product_id, %error, "wishlist toggle failed");

                Outcome::failed(error.to_string())
            }
        }
    }

    async fn try_toggle(&self, product_id: ProductId) -> Result<&'static str, WishlistError> {
        let mut toggle = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

            if !state.pending.insert(product_id.clone()) {
                return Err(WishlistError::Busy);
            }

            let adding = !state.items.contains(&product_id);
            flip(&mut state.items, &product_id, adding);

            PendingToggle {
                state: Arc::clone(&self.state),
                product_id: product_id.clone(),
                adding,
                confirmed: false,
            }
        };

        let adding = toggle.adding;

        if adding {
            self.api.add_to_wishlist(product_id.clone()).await?;
        } else {
            self.api.remove_from_wishlist(product_id.clone()).await?;
        }

        toggle.confirmed = true;

        info!(product = %product_id, adding, "wishlist updated");

        Ok(if adding {
            "Added to wishlist"
        } else {
            "Removed from wishlist"
        })
    }
}

/// Clears the pending mark on drop and reverts the flip unless the server confirmed it.
#[derive(Debug)]
struct PendingToggle {
    state: Arc<RwLock<WishlistState>>,
    product_id: ProductId,
    adding: bool,
    confirmed: bool,
}

impl Drop for PendingToggle {
    fn drop(&mut self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        state.pending.remove(&self.product_id);

        if !self.confirmed {
            flip(&mut state.items, &self.product_id, !self.adding);
        }
    }
}

fn flip(items: &mut BTreeSet<ProductId>, product_id: &ProductId, present: bool) {
    if present {
        items.insert(product_id.clone());
    } else {
        items.remove(product_id);
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use crate::api::MockWishlistApi;

    use super::*;

    #[tokio::test]
    async fn toggle_adds_then_removes() {
        let mut api = MockWishlistApi::new();

        api.expect_add_to_wishlist()
            .once()
            .withf(|id| id.as_str() == "a")
            .return_once(|_| Ok(()));
        api.expect_remove_from_wishlist()
            .once()
            .withf(|id| id.as_str() == "a")
            .return_once(|_| Ok(()));

        let store = WishlistStore::new(Arc::new(api));
        let id = ProductId::from("a");

        let added = store.toggle(id.clone()).await;
        assert_eq!(added, Outcome::succeeded(Some("Added to wishlist".to_string())));
        assert!(store.contains(&id));

        let removed = store.toggle(id.clone()).await;
        assert!(removed.success);
        assert!(!store.contains(&id));
        assert!(!store.is_pending(&id));
    }

    #[tokio::test]
    async fn failed_add_rolls_back() {
        let mut api = MockWishlistApi::new();

        api.expect_add_to_wishlist().once().return_once(|_| {
            Err(ApiError::Rejected {
                status: 401,
                message: "Please log in".to_string(),
            })
        });

        let store = WishlistStore::new(Arc::new(api));
        let id = ProductId::from("a");

        let outcome = store.toggle(id.clone()).await;

        assert_eq!(outcome, Outcome::failed("Please log in"));
        assert!(!store.contains(&id));
    }

    #[tokio::test]
    async fn failed_remove_rolls_back() {
        let mut api = MockWishlistApi::new();

        api.expect_remove_from_wishlist()
            .once()
            .return_once(|_| Err(ApiError::InvalidSessionCookie));

        let store = WishlistStore::new(Arc::new(api));
        let id = ProductId::from("a");

        store.replace([id.clone()]);

        let outcome = store.toggle(id.clone()).await;

        assert!(!outcome.success);
        assert!(store.contains(&id));
    }

    #[tokio::test]
    async fn pending_toggle_is_busy() {
        let mut api = MockWishlistApi::new();

        api.expect_add_to_wishlist().never();

        let store = WishlistStore::new(Arc::new(api));
        let id = ProductId::from("a");

        store
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .insert(id.clone());

        let outcome = store.toggle(id.clone()).await;

        assert_eq!(
            outcome,
            Outcome::failed("Please wait for the current update to finish")
        );
    }

    struct StalledWishlist;

    #[async_trait::async_trait]
    impl WishlistApi for StalledWishlist {
        async fn add_to_wishlist(&self, _product_id: ProductId) -> Result<(), ApiError> {
            std::future::pending().await
        }

        async fn remove_from_wishlist(&self, _product_id: ProductId) -> Result<(), ApiError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn abandoned_toggle_rolls_back() {
        let store = WishlistStore::new(Arc::new(StalledWishlist));
        let id = ProductId::from("a");

        let timed_out =
            tokio::time::timeout(Duration::from_millis(20), store.toggle(id.clone())).await;

        assert!(timed_out.is_err());
        assert!(!store.is_pending(&id));
        assert!(!store.contains(&id));

        store.replace([id.clone()]);

        let timed_out =
            tokio::time::timeout(Duration::from_millis(20), store.toggle(id.clone())).await;

        assert!(timed_out.is_err());
        assert!(!store.is_pending(&id));
        assert!(store.contains(&id));
    }

    #[test]
    fn replace_sets_membership() {
        let store = WishlistStore::new(Arc::new(MockWishlistApi::new()));

        store.replace([ProductId::from("b"), ProductId::from("a")]);

        assert_eq!(
            store.items(),
            vec![ProductId::from("a"), ProductId::from("b")]
        );
    }
}
