//! Contract tests for `HttpCartApi` against a mock storefront.

use bazaar::{
    discounts::DiscountState,
    money::{Amount, CURRENCY},
    products::ProductId,
};
use bazaar_app::{
    api::{ApiError, CartApi, HttpCartApi, WishlistApi},
    config::ApiConfig,
};
use rusty_money::Money;
use testresult::TestResult;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

fn inr(minor: i64) -> Amount {
    Money::from_minor(minor, CURRENCY)
}

fn client(server: &MockServer) -> TestResult<HttpCartApi> {
    let config = ApiConfig::new(server.uri().parse()?).with_session_cookie("accessToken=abc123");

    Ok(HttpCartApi::new(&config)?)
}

fn cart_body(items: serde_json::Value, extra: serde_json::Value) -> serde_json::Value {
    let mut data = serde_json::json!({
        "items": items,
        "itemsPrice": 500,
        "shippingPrice": 49,
        "totalPrice": 549
    });

    if let (Some(data), Some(extra)) = (data.as_object_mut(), extra.as_object()) {
        data.extend(extra.clone());
    }

    serde_json::json!({ "data": data })
}

fn kurta(quantity: u32) -> serde_json::Value {
    serde_json::json!([{
        "product": {
            "_id": "kurta-1",
            "title": "Block print kurta",
            "price": 650,
            "discountPrice": 500,
            "stock": 3,
            "images": ["https://cdn.example/kurta.jpg"]
        },
        "quantity": quantity
    }])
}

// ── GET /api/cart ────────────────────────────────────────────────────

#[tokio::test]
async fn get_cart_parses_envelope_and_sends_session() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .and(header("cookie", "accessToken=abc123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(cart_body(kurta(1), serde_json::json!({}))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cart = client(&server)?.get_cart().await?;

    assert_eq!(cart.len(), 1);
    assert_eq!(cart.pricing().total_price, inr(54_900));
    assert_eq!(cart.discount(), &DiscountState::NoDiscount);

    let item = cart.item(&ProductId::from("kurta-1")).ok_or("missing kurta")?;

    assert_eq!(item.quantity, 1);
    assert_eq!(item.product.stock, Some(3));
    assert_eq!(item.product.unit_price(), inr(50_000));

    Ok(())
}

#[tokio::test]
async fn base_url_path_is_kept() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/store/api/cart"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(cart_body(kurta(2), serde_json::json!({}))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = ApiConfig::new(format!("{}/store", server.uri()).parse()?);
    let cart = HttpCartApi::new(&config)?.get_cart().await?;

    assert_eq!(
        cart.item(&ProductId::from("kurta-1")).map(|item| item.quantity),
        Some(2)
    );

    Ok(())
}

// ── PUT /api/cart ────────────────────────────────────────────────────

#[tokio::test]
async fn update_quantity_sends_clamped_body() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/cart"))
        .and(body_json(serde_json::json!({ "productId": "kurta-1", "quantity": 3 })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(cart_body(kurta(3), serde_json::json!({}))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cart = client(&server)?
        .update_quantity(ProductId::from("kurta-1"), 3)
        .await?;

    assert_eq!(
        cart.item(&ProductId::from("kurta-1")).map(|item| item.quantity),
        Some(3)
    );

    Ok(())
}

#[tokio::test]
async fn insufficient_stock_is_a_rejection() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/cart"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({ "message": "Only 2 items left in stock" })),
        )
        .mount(&server)
        .await;

    let error = client(&server)?
        .update_quantity(ProductId::from("kurta-1"), 3)
        .await
        .err()
        .ok_or("expected a rejection")?;

    assert!(error.is_rejection(), "unexpected error {error:?}");
    assert!(
        matches!(
            &error,
            ApiError::Rejected { status: 400, message } if message == "Only 2 items left in stock"
        ),
        "unexpected error {error:?}"
    );

    Ok(())
}

#[tokio::test]
async fn rejection_without_body_uses_status_reason() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let error = client(&server)?
        .get_cart()
        .await
        .err()
        .ok_or("expected a rejection")?;

    assert!(
        matches!(
            &error,
            ApiError::Rejected { status: 401, message } if message == "Unauthorized"
        ),
        "unexpected error {error:?}"
    );

    Ok(())
}

// ── Discounts ────────────────────────────────────────────────────────

#[tokio::test]
async fn apply_coupon_returns_discounted_cart() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/cart/apply-coupon"))
        .and(body_json(serde_json::json!({ "code": "SAVE50" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_body(
            kurta(1),
            serde_json::json!({ "couponCode": "SAVE50", "discount": 50, "totalPrice": 499 }),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let cart = client(&server)?.apply_coupon("SAVE50".to_string()).await?;

    assert_eq!(
        cart.discount(),
        &DiscountState::Coupon {
            code: "SAVE50".to_string(),
            amount: inr(5_000),
        }
    );
    assert_eq!(cart.totals()?.total, inr(49_900));

    Ok(())
}

#[tokio::test]
async fn remove_referral_posts_without_body() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/cart/remove-referral"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(cart_body(kurta(1), serde_json::json!({}))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cart = client(&server)?.remove_referral().await?;

    assert_eq!(cart.discount(), &DiscountState::NoDiscount);

    Ok(())
}

// ── DELETE endpoints ─────────────────────────────────────────────────

#[tokio::test]
async fn remove_and_clear_hit_their_paths() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/cart/remove/kurta-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "message": "Removed" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/cart/clear-cart"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server)?;

    api.remove_item(ProductId::from("kurta-1")).await?;
    api.clear_cart().await?;

    Ok(())
}

// ── GET /api/offers/active ───────────────────────────────────────────

#[tokio::test]
async fn no_active_offer_is_none() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/offers/active"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": null })),
        )
        .mount(&server)
        .await;

    assert_eq!(client(&server)?.active_offer().await?, None);

    Ok(())
}

#[tokio::test]
async fn active_offer_is_parsed() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/offers/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "title": "Diwali sale",
                "discountPercent": 10,
                "maxDiscount": 200,
                "startTime": "2026-10-20T00:00:00Z",
                "endTime": "2026-11-02T00:00:00Z",
                "isActive": true
            }
        })))
        .mount(&server)
        .await;

    let offer = client(&server)?
        .active_offer()
        .await?
        .ok_or("expected an offer")?;

    assert_eq!(offer.title, "Diwali sale");
    assert_eq!(offer.max_discount, Some(inr(20_000)));
    assert_eq!(offer.estimate(inr(100_000))?, inr(10_000));

    Ok(())
}

// ── Wishlist ─────────────────────────────────────────────────────────

#[tokio::test]
async fn wishlist_add_and_remove() -> TestResult {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/wishlist"))
        .and(body_json(serde_json::json!({ "productId": "kurta-1" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/wishlist/kurta-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server)?;

    api.add_to_wishlist(ProductId::from("kurta-1")).await?;
    api.remove_from_wishlist(ProductId::from("kurta-1")).await?;

    Ok(())
}
