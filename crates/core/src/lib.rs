//! Bazaar
//!
//! Client-side cart pricing rules for the Bazaar storefront: quantity clamping, discount mutual
//! exclusion and total reconciliation. Nothing in this crate performs I/O; the remote cart API
//! and the stores that drive it live in `bazaar-app`.

pub mod cart;
pub mod discounts;
pub mod money;
pub mod products;
pub mod quantity;
pub mod totals;

pub mod prelude;
