//! `reqwest` implementation of the storefront cart API.

use async_trait::async_trait;
use reqwest::{
    Client, Method, RequestBuilder, Response,
    header::{COOKIE, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use bazaar::{cart::Cart, discounts::flash::FlashOffer, products::ProductId};

use crate::{
    api::{
        ApiError, CartApi, WishlistApi,
        records::{CartRecord, Envelope, ErrorBody, OfferRecord},
    },
    config::{ApiConfig, with_trailing_slash},
};

/// HTTP client for the storefront cart API.
///
/// Requests carry credentials through a cookie store, optionally seeded with a session cookie
/// from [`ApiConfig`].
#[derive(Debug, Clone)]
pub struct HttpCartApi {
    base_url: Url,
    http: Client,
}

impl HttpCartApi {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cookie is not a valid header value or the HTTP client
    /// cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();

        if let Some(cookie) = &config.session_cookie {
            let mut value = HeaderValue::from_str(cookie.as_str())
                .map_err(|_invalid| ApiError::InvalidSessionCookie)?;
            value.set_sensitive(true);

            headers.insert(COOKIE, value);
        }

        let http = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            base_url: with_trailing_slash(config.base_url.clone()),
            http,
        })
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.base_url.join(path)?;

        debug!(%method, %url, "storefront api request");

        Ok(self.http.request(method, url))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = ensure_success(request.send().await?).await?;
        let envelope: Envelope<T> = response.json().await?;

        Ok(envelope.data)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        ensure_success(request.send().await?).await?;

        Ok(())
    }

    async fn send_cart(&self, request: RequestBuilder) -> Result<Cart, ApiError> {
        let record: CartRecord = self.send(request).await?;

        Ok(Cart::try_from(record)?)
    }
}

/// Turn a non-2xx response into [`ApiError::Rejected`], using the body's `message` when present.
async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    debug!(status = status.as_u16(), %message, "storefront api rejected request");

    Err(ApiError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl CartApi for HttpCartApi {
    async fn get_cart(&self) -> Result<Cart, ApiError> {
        self.send_cart(self.request(Method::GET, "api/cart")?).await
    }

    async fn add_item(&self, product_id: ProductId, quantity: u32) -> Result<Cart, ApiError> {
        let body = serde_json::json!({ "productId": product_id.as_str(), "quantity": quantity });

        self.send_cart(self.request(Method::POST, "api/cart")?.json(&body))
            .await
    }

    async fn update_quantity(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        let body = serde_json::json!({ "productId": product_id.as_str(), "quantity": quantity });

        self.send_cart(self.request(Method::PUT, "api/cart")?.json(&body))
            .await
    }

    async fn remove_item(&self, product_id: ProductId) -> Result<(), ApiError> {
        let path = format!("api/cart/remove/{product_id}");

        self.send_empty(self.request(Method::DELETE, &path)?).await
    }

    async fn clear_cart(&self) -> Result<(), ApiError> {
        self.send_empty(self.request(Method::DELETE, "api/cart/clear-cart")?)
            .await
    }

    async fn apply_coupon(&self, code: String) -> Result<Cart, ApiError> {
        let body = serde_json::json!({ "code": code });

        self.send_cart(self.request(Method::POST, "api/cart/apply-coupon")?.json(&body))
            .await
    }

    async fn remove_coupon(&self) -> Result<Cart, ApiError> {
        self.send_cart(self.request(Method::POST, "api/cart/remove-coupon")?)
            .await
    }

    async fn apply_referral(&self, code: String) -> Result<Cart, ApiError> {
        let body = serde_json::json!({ "code": code });

        self.send_cart(
            self.request(Method::POST, "api/cart/apply-referral")?
                .json(&body),
        )
        .await
    }

    async fn remove_referral(&self) -> Result<Cart, ApiError> {
        self.send_cart(self.request(Method::POST, "api/cart/remove-referral")?)
            .await
    }

    async fn active_offer(&self) -> Result<Option<FlashOffer>, ApiError> {
        let record: Option<OfferRecord> = self
            .send(self.request(Method::GET, "api/offers/active")?)
            .await?;

        match record {
            Some(record) => Ok(record.into_offer()?),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl WishlistApi for HttpCartApi {
    async fn add_to_wishlist(&self, product_id: ProductId) -> Result<(), ApiError> {
        let body = serde_json::json!({ "productId": product_id.as_str() });

        self.send_empty(self.request(Method::POST, "api/wishlist")?.json(&body))
            .await
    }

    async fn remove_from_wishlist(&self, product_id: ProductId) -> Result<(), ApiError> {
        let path = format!("api/wishlist/{product_id}");

        self.send_empty(self.request(Method::DELETE, &path)?).await
    }
}
