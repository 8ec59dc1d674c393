//! Wire records
//!
//! JSON shapes of the storefront API, converted into `bazaar` models at the edge. Amounts arrive
//! as rupees and are converted to minor units here.

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Deserialize;

use bazaar::{
    cart::{Cart, CartItem, CartPricing},
    discounts::{DiscountFields, DiscountState, flash::FlashOffer},
    money::{MoneyConversionError, from_major},
    products::{ProductId, ProductSnapshot},
};

/// `{ data: <payload> }`
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// `{ message }` error body
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartRecord {
    #[serde(default)]
    items: Vec<CartItemRecord>,
    #[serde(default)]
    items_price: Decimal,
    #[serde(default)]
    shipping_price: Decimal,
    #[serde(default)]
    flash_discount: Decimal,
    #[serde(default)]
    flash_discount_percent: Decimal,
    #[serde(default)]
    flash_offer_ends_at: Option<Timestamp>,
    #[serde(default)]
    referral_discount: Decimal,
    #[serde(default)]
    referral_code: Option<String>,
    #[serde(default)]
    discount: Decimal,
    #[serde(default)]
    coupon_code: Option<String>,
    #[serde(default)]
    total_price: Decimal,
}

#[derive(Debug, Deserialize)]
struct CartItemRecord {
    product: ProductRecord,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductRecord {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    title: String,
    price: Decimal,
    #[serde(default)]
    discount_price: Option<Decimal>,
    #[serde(default)]
    stock: Option<i64>,
    #[serde(default)]
    images: Vec<ImageRecord>,
}

/// Images come either as bare URLs or as uploaded-asset objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImageRecord {
    Url(String),
    Asset { url: String },
}

impl ImageRecord {
    fn into_url(self) -> String {
        match self {
            ImageRecord::Url(url) | ImageRecord::Asset { url } => url,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OfferRecord {
    #[serde(default)]
    title: String,
    discount_percent: Decimal,
    #[serde(default)]
    max_discount: Option<Decimal>,
    #[serde(default)]
    start_time: Option<Timestamp>,
    end_time: Timestamp,
    #[serde(default = "default_active")]
    is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Flash percentages arrive as percent points (`10` for 10%).
fn percentage_from_points(points: Decimal) -> Percentage {
    Percentage::from(points / Decimal::ONE_HUNDRED)
}

impl TryFrom<CartRecord> for Cart {
    type Error = MoneyConversionError;

    fn try_from(record: CartRecord) -> Result<Self, Self::Error> {
        let items = record
            .items
            .into_iter()
            .map(CartItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let pricing = CartPricing {
            items_price: from_major(record.items_price)?,
            shipping_price: from_major(record.shipping_price)?,
            total_price: from_major(record.total_price)?,
        };

        let discount = DiscountState::reconcile(DiscountFields {
            coupon_code: record.coupon_code,
            coupon_discount: from_major(record.discount)?,
            referral_code: record.referral_code,
            referral_discount: from_major(record.referral_discount)?,
            flash_discount: from_major(record.flash_discount)?,
            flash_percent: percentage_from_points(record.flash_discount_percent),
            flash_expires_at: record.flash_offer_ends_at,
        });

        Ok(Cart::new(items, pricing, discount))
    }
}

impl TryFrom<CartItemRecord> for CartItem {
    type Error = MoneyConversionError;

    fn try_from(record: CartItemRecord) -> Result<Self, Self::Error> {
        let product = record.product;

        let snapshot = ProductSnapshot {
            title: product.title,
            price: from_major(product.price)?,
            discount_price: product.discount_price.map(from_major).transpose()?,
            // Negative stock is reported by some catalog imports; treat it as none left.
            stock: product
                .stock
                .map(|stock| u32::try_from(stock.max(0)).unwrap_or(u32::MAX)),
            images: product
                .images
                .into_iter()
                .map(ImageRecord::into_url)
                .collect(),
        };

        Ok(CartItem::new(
            ProductId::from(product.id),
            record.quantity,
            snapshot,
        ))
    }
}

impl OfferRecord {
    /// Converts into a [`FlashOffer`], or `None` if the server flagged it inactive.
    pub(crate) fn into_offer(self) -> Result<Option<FlashOffer>, MoneyConversionError> {
        if !self.is_active {
            return Ok(None);
        }

        Ok(Some(FlashOffer {
            title: self.title,
            percent: percentage_from_points(self.discount_percent),
            max_discount: self.max_discount.map(from_major).transpose()?,
            starts_at: self.start_time,
            ends_at: self.end_time,
        }))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::Money;
    use testresult::TestResult;

    use bazaar::money::CURRENCY;

    use super::*;

    fn inr(minor: i64) -> bazaar::money::Amount {
        Money::from_minor(minor, CURRENCY)
    }

    #[test]
    fn cart_payload_converts_to_minor_units() -> TestResult {
        let json = serde_json::json!({
            "items": [{
                "product": {
                    "_id": "65f1",
                    "title": "Block print kurta",
                    "price": 650,
                    "discountPrice": 500,
                    "stock": 3,
                    "images": [{ "url": "https://cdn.example/kurta.jpg", "public_id": "k1" }]
                },
                "quantity": 1
            }],
            "itemsPrice": 500,
            "shippingPrice": 49,
            "discount": 50,
            "couponCode": "SAVE50",
            "totalPrice": 499
        });

        let record: CartRecord = serde_json::from_value(json)?;
        let cart = Cart::try_from(record)?;

        assert_eq!(cart.pricing().items_price, inr(50_000));
        assert_eq!(cart.pricing().shipping_price, inr(4_900));
        assert_eq!(cart.pricing().total_price, inr(49_900));
        assert_eq!(
            cart.discount(),
            &DiscountState::Coupon {
                code: "SAVE50".to_string(),
                amount: inr(5_000),
            }
        );

        let item = cart.items().first().ok_or("missing item")?;

        assert_eq!(item.product.unit_price(), inr(50_000));
        assert_eq!(item.product.stock, Some(3));
        assert_eq!(item.product.images, vec!["https://cdn.example/kurta.jpg"]);

        Ok(())
    }

    #[test]
    fn flash_discount_reconciles_with_percentage() -> TestResult {
        let json = serde_json::json!({
            "items": [],
            "itemsPrice": 1000,
            "shippingPrice": 0,
            "flashDiscount": 100,
            "flashDiscountPercent": 10,
            "flashOfferEndsAt": "2026-11-02T00:00:00Z",
            "totalPrice": 900
        });

        let record: CartRecord = serde_json::from_value(json)?;
        let cart = Cart::try_from(record)?;

        assert_eq!(cart.discount().flash_discount(), inr(10_000));
        assert_eq!(cart.discount().to_string(), "Flash offer 10%");

        Ok(())
    }

    #[test]
    fn negative_stock_means_out_of_stock() -> TestResult {
        let json = serde_json::json!({
            "product": { "_id": "x", "title": "Mug", "price": 10, "stock": -2 },
            "quantity": 1
        });

        let record: CartItemRecord = serde_json::from_value(json)?;
        let item = CartItem::try_from(record)?;

        assert_eq!(item.product.stock, Some(0));

        Ok(())
    }

    #[test]
    fn negative_amounts_are_rejected() -> TestResult {
        let json = serde_json::json!({ "items": [], "itemsPrice": -5 });

        let record: CartRecord = serde_json::from_value(json)?;

        assert!(Cart::try_from(record).is_err());

        Ok(())
    }

    #[test]
    fn inactive_offer_is_none() -> TestResult {
        let json = serde_json::json!({
            "title": "Over",
            "discountPercent": 15,
            "endTime": "2026-11-02T00:00:00Z",
            "isActive": false
        });

        let record: OfferRecord = serde_json::from_value(json)?;

        assert_eq!(record.into_offer()?, None);

        Ok(())
    }

    #[test]
    fn active_offer_converts() -> TestResult {
        let json = serde_json::json!({
            "title": "Diwali",
            "discountPercent": 20,
            "maxDiscount": 150,
            "endTime": "2026-11-02T00:00:00Z"
        });

        let record: OfferRecord = serde_json::from_value(json)?;
        let offer = record.into_offer()?.ok_or("expected an offer")?;

        assert_eq!(offer.title, "Diwali");
        assert_eq!(offer.max_discount, Some(inr(15_000)));
        assert_eq!(offer.percent, Percentage::from(Decimal::new(20, 2)));

        Ok(())
    }
}
