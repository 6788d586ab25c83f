#![forbid(unsafe_code)]
//! The order engine: request validation in a defined order, catalog
//! resolution, snapshot construction, total computation, and the status
//! lifecycle. The engine owns no I/O of its own; it drives the store traits.

use bazari_model::{
    compute_total, LineItem, Order, OrderId, OrderStatus, PaymentMethod, ProductId, User, UserId,
};
use bazari_store::{CatalogStore, IdentityStore, OrderStore, StoreError};
use chrono::Utc;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::info;

pub const CRATE_NAME: &str = "bazari-orders";

#[derive(Debug)]
pub enum OrderError {
    Invalid(String),
    UserNotFound,
    ProductNotFound(String),
    OrderNotFound,
    TransitionDenied { from: OrderStatus, to: OrderStatus },
    Store(StoreError),
}

impl Display for OrderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(msg) => f.write_str(msg),
            Self::UserNotFound => f.write_str("user not found"),
            Self::ProductNotFound(id) => write!(f, "product not found: {id}"),
            Self::OrderNotFound => f.write_str("order not found"),
            Self::TransitionDenied { from, to } => {
                write!(f, "order is in a terminal state: {from} -> {to} not permitted")
            }
            Self::Store(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl std::error::Error for OrderError {}

impl From<StoreError> for OrderError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Governs `update_status`. The storefront historically allowed any status
/// to move to any other status (manual correction by operators); the
/// terminal-states variant closes `Completed` and `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    #[default]
    Unrestricted,
    TerminalStates,
}

impl TransitionPolicy {
    pub fn parse(input: &str) -> Result<Self, String> {
        match input {
            "unrestricted" => Ok(Self::Unrestricted),
            "terminal-states" => Ok(Self::TerminalStates),
            other => Err(format!("unknown transition policy: {other}")),
        }
    }

    fn permits(self, from: OrderStatus, to: OrderStatus) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::TerminalStates => !from.is_terminal() || from == to,
        }
    }
}

/// One requested line of a purchase, as it arrived on the wire. Field
/// presence is validated here, not at the deserialization boundary, so the
/// failure order stays defined.
#[derive(Debug, Clone)]
pub struct PurchaseLine {
    pub product: Option<String>,
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    pub user_id: Option<String>,
    pub payment_method: Option<String>,
    pub lines: Option<Vec<PurchaseLine>>,
}

pub struct OrderEngine<S> {
    store: Arc<S>,
    transition_policy: TransitionPolicy,
}

impl<S> OrderEngine<S>
where
    S: IdentityStore + CatalogStore + OrderStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            transition_policy: TransitionPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_transition_policy(mut self, policy: TransitionPolicy) -> Self {
        self.transition_policy = policy;
        self
    }

    /// Validates and persists a purchase. Failure order: empty line set,
    /// payment method, purchaser, then per line the field check and the
    /// catalog resolution. Nothing is written until every line resolved;
    /// every snapshot copies the product as it stands right now.
    pub async fn create_order(&self, request: &PurchaseRequest) -> Result<Order, OrderError> {
        let lines = match &request.lines {
            Some(lines) if !lines.is_empty() => lines,
            _ => {
                return Err(OrderError::Invalid(
                    "at least one product is required".to_string(),
                ))
            }
        };

        let payment_method = match &request.payment_method {
            None => {
                return Err(OrderError::Invalid(
                    "payment method is required".to_string(),
                ))
            }
            Some(raw) => PaymentMethod::parse(raw)
                .map_err(|_| OrderError::Invalid("invalid payment method".to_string()))?,
        };

        let user_id = match &request.user_id {
            None => return Err(OrderError::Invalid("user id is required".to_string())),
            Some(raw) => UserId::parse(raw).map_err(|_| OrderError::UserNotFound)?,
        };
        let user = self
            .store
            .find_user(&user_id)
            .await?
            .ok_or(OrderError::UserNotFound)?;

        let mut line_items = Vec::with_capacity(lines.len());
        for line in lines {
            let (raw_product, quantity) = match (&line.product, line.quantity) {
                (Some(product), Some(quantity)) if quantity >= 1 => (product, quantity),
                _ => {
                    return Err(OrderError::Invalid(
                        "each product requires a product id and a quantity of at least 1"
                            .to_string(),
                    ))
                }
            };
            let product_id = ProductId::parse(raw_product)
                .map_err(|_| OrderError::ProductNotFound(raw_product.clone()))?;
            let product = self
                .store
                .find_product(&product_id)
                .await?
                .ok_or_else(|| OrderError::ProductNotFound(raw_product.clone()))?;
            line_items.push(LineItem {
                product: product.id,
                quantity,
                name: product.name,
                category: product.category,
                price: product.price,
                images: product.images,
            });
        }

        let order = Order {
            id: OrderId::generate(),
            user: user.id,
            total_amount: compute_total(&line_items),
            line_items,
            payment_method,
            status: OrderStatus::Pending,
            purchase_date: Utc::now(),
        };
        self.store.persist_order(&order).await?;
        info!(
            order = %order.id,
            user = %order.user,
            total = order.total_amount,
            "order created"
        );
        Ok(order)
    }

    /// The purchaser's history, resolved through the id list on the user
    /// record and served from the stored snapshots.
    pub async fn orders_for_user(&self, raw_user_id: &str) -> Result<Vec<Order>, OrderError> {
        let user_id = UserId::parse(raw_user_id).map_err(|_| OrderError::UserNotFound)?;
        let user = self
            .store
            .find_user(&user_id)
            .await?
            .ok_or(OrderError::UserNotFound)?;
        Ok(self.store.orders_for_user(&user.order_ids).await?)
    }

    /// Every order, newest first, each with its purchaser resolved for
    /// display. A purchaser deleted after the fact resolves to `None`.
    pub async fn list_all(&self) -> Result<Vec<(Order, Option<User>)>, OrderError> {
        let orders = self.store.list_orders().await?;
        let mut resolved = Vec::with_capacity(orders.len());
        for order in orders {
            let purchaser = self.store.find_user(&order.user).await?;
            resolved.push((order, purchaser));
        }
        Ok(resolved)
    }

    pub async fn update_status(
        &self,
        raw_order_id: &str,
        raw_status: Option<&str>,
    ) -> Result<Order, OrderError> {
        let order_id = OrderId::parse(raw_order_id).map_err(|_| OrderError::OrderNotFound)?;
        let current = self
            .store
            .find_order(&order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;
        let status = raw_status
            .and_then(|raw| OrderStatus::parse(raw).ok())
            .ok_or_else(|| OrderError::Invalid("invalid status value".to_string()))?;
        if !self.transition_policy.permits(current.status, status) {
            return Err(OrderError::TransitionDenied {
                from: current.status,
                to: status,
            });
        }
        let updated = self
            .store
            .update_status(&order_id, status)
            .await?
            .ok_or(OrderError::OrderNotFound)?;
        info!(order = %updated.id, from = %current.status, to = %status, "order status updated");
        Ok(updated)
    }
}
