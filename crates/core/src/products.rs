//! Products

use std::fmt;

use crate::money::Amount;

/// Catalog identifier of a product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a product id from the catalog's identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The catalog's view of a product at the time the cart was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    /// Product title
    pub title: String,

    /// List price
    pub price: Amount,

    /// Sale price, if the product is on sale
    pub discount_price: Option<Amount>,

    /// Units in stock, if the catalog reported it
    pub stock: Option<u32>,

    /// Image URLs
    pub images: Vec<String>,
}

impl ProductSnapshot {
    /// Creates a snapshot with only a title and list price.
    pub fn new(title: impl Into<String>, price: Amount) -> Self {
        Self {
            title: title.into(),
            price,
            discount_price: None,
            stock: None,
            images: Vec::new(),
        }
    }

    /// Sets the sale price.
    #[must_use]
    pub fn with_discount_price(mut self, discount_price: Amount) -> Self {
        self.discount_price = Some(discount_price);
        self
    }

    /// Sets the stock level.
    #[must_use]
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = Some(stock);
        self
    }

    /// Price charged for one unit.
    ///
    /// The sale price only counts when it is positive and below the list price.
    pub fn unit_price(&self) -> Amount {
        match self.discount_price {
            Some(sale)
                if sale.to_minor_units() > 0
                    && sale.to_minor_units() < self.price.to_minor_units() =>
            {
                sale
            }
            _ => self.price,
        }
    }

    /// Whether the product is currently on sale.
    pub fn is_on_sale(&self) -> bool {
        self.unit_price() != self.price
    }
}
