//! Storefront client: the remote cart API, the stores that mirror it, and the cart page.

pub mod api;
pub mod config;
pub mod context;
pub mod page;
pub mod store;
pub mod wishlist;

#[cfg(test)]
mod test;
