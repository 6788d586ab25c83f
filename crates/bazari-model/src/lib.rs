#![forbid(unsafe_code)]
//! Storefront domain SSOT.
//!
//! Identifiers, enumerations, and the three persisted entities (`User`,
//! `Product`, `Order`). Orders carry denormalized snapshots of the products
//! they reference; nothing in this crate performs I/O.

mod ids;
mod order;
mod product;
mod user;

pub use ids::{OrderId, ParseError, ProductId, UserId, ID_MAX_LEN};
pub use order::{
    compute_total, LineItem, Order, OrderStatus, PaymentMethod, PAYMENT_METHODS, STATUSES,
};
pub use product::{validate_price, ImageRef, Product, NAME_MAX_LEN};
pub use user::{Role, User};

pub const CRATE_NAME: &str = "bazari-model";
