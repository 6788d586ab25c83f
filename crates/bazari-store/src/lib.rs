#![forbid(unsafe_code)]
//! Persistence for the storefront: three collections (users, products,
//! orders) keyed by opaque identifiers. Orders hold denormalized snapshot
//! copies of product fields, and a user's order history is a JSON list of
//! order ids on the user row — the document layout of the system this one
//! replaces, kept deliberately.

use async_trait::async_trait;
use bazari_model::{Order, OrderId, OrderStatus, Product, ProductId, User, UserId};
use std::fmt::{Display, Formatter};

mod sqlite;

pub use sqlite::SqliteStore;

pub const CRATE_NAME: &str = "bazari-store";

#[derive(Debug)]
pub enum StoreError {
    /// A uniqueness constraint (email, third-party id) was violated.
    Conflict(String),
    Sql(String),
    Encoding(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict(msg) => write!(f, "conflict: {msg}"),
            Self::Sql(msg) => write!(f, "sql failure: {msg}"),
            Self::Encoding(msg) => write!(f, "encoding failure: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Self::Conflict(err.to_string())
            }
            _ => Self::Sql(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_google_id(&self, google_id: &str)
        -> Result<Option<User>, StoreError>;
    async fn find_user_by_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    /// Full-row overwrite keyed by id.
    async fn update_user(&self, user: &User) -> Result<(), StoreError>;
    /// Returns false when no such user existed. Orders referencing the user
    /// are left in place; order and user lifetimes are independent.
    async fn delete_user(&self, id: &UserId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;
    async fn update_product(&self, product: &Product) -> Result<(), StoreError>;
    async fn delete_product(&self, id: &ProductId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists the order and appends its id to the purchaser's history
    /// list. Whether the two writes share a transaction is an implementation
    /// property; see `SqliteStore::with_atomic_history_append`.
    async fn persist_order(&self, order: &Order) -> Result<(), StoreError>;
    async fn find_order(&self, id: &OrderId) -> Result<Option<Order>, StoreError>;
    /// Resolves a history list, preserving its order. Ids that no longer
    /// resolve are skipped.
    async fn orders_for_user(&self, ids: &[OrderId]) -> Result<Vec<Order>, StoreError>;
    /// Every order in the store, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;
    /// Overwrites the status field only. Returns the updated order, or None
    /// when no such order exists.
    async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError>;
    async fn count_orders(&self) -> Result<u64, StoreError>;
}
