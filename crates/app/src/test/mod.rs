//! Test fixtures

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::Money;

use bazaar::{
    cart::{Cart, CartItem, CartPricing},
    discounts::DiscountState,
    money::{Amount, CURRENCY, zero},
    products::{ProductId, ProductSnapshot},
    totals::{CartTotals, items_subtotal},
};

pub(crate) fn inr(minor: i64) -> Amount {
    Money::from_minor(minor, CURRENCY)
}

/// A line of `quantity` units priced at `price_minor` paise each.
pub(crate) fn item(id: &str, quantity: u32, stock: Option<u32>, price_minor: i64) -> CartItem {
    let mut product = ProductSnapshot::new(format!("Product {id}"), inr(price_minor));
    product.stock = stock;

    CartItem::new(ProductId::from(id), quantity, product)
}

pub(crate) fn coupon(code: &str, minor: i64) -> DiscountState {
    DiscountState::Coupon {
        code: code.to_string(),
        amount: inr(minor),
    }
}

pub(crate) fn referral(code: &str, minor: i64) -> DiscountState {
    DiscountState::Referral {
        code: code.to_string(),
        amount: inr(minor),
    }
}

/// A 10% flash offer with no known end.
pub(crate) fn flash(minor: i64) -> DiscountState {
    DiscountState::FlashOffer {
        percent: Percentage::from(Decimal::new(10, 2)),
        amount: inr(minor),
        expires_at: None,
    }
}

/// A cart whose reported pricing agrees with its lines, with free shipping.
pub(crate) fn cart_of(items: Vec<CartItem>, discount: DiscountState) -> Cart {
    let items_price = items_subtotal(&items).expect("fixture subtotal");
    let totals = CartTotals::compute(items_price, zero(), &discount).expect("fixture totals");

    let pricing = CartPricing {
        items_price,
        shipping_price: zero(),
        total_price: totals.total,
    };

    Cart::new(items, pricing, discount)
}
