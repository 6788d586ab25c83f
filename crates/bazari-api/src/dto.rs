// SPDX-License-Identifier: Apache-2.0

use bazari_model::{ImageRef, LineItem, Order, OrderId, Product, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Inbound bodies. Fields are Option so missing-field reporting stays under
// the operation's control rather than the deserializer's.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineRequest {
    pub product: Option<String>,
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub products: Option<Vec<OrderLineRequest>>,
    pub payment_method: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    pub id_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub profile_image: Option<ImageRef>,
}

/// Shared body for product create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub images: Option<Vec<ImageRef>>,
}

// ---------------------------------------------------------------------------
// Outbound shapes.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct LineItemDto {
    pub product: String,
    pub quantity: u32,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub images: Vec<ImageRef>,
}

impl From<&LineItem> for LineItemDto {
    fn from(item: &LineItem) -> Self {
        Self {
            product: item.product.as_str().to_string(),
            quantity: item.quantity,
            name: item.name.clone(),
            category: item.category.clone(),
            price: item.price,
            images: item.images.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: String,
    pub user: String,
    pub products: Vec<LineItemDto>,
    pub payment_method: String,
    pub total_amount: f64,
    pub status: String,
    pub purchase_date: DateTime<Utc>,
}

impl From<&Order> for OrderDto {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_str().to_string(),
            user: order.user.as_str().to_string(),
            products: order.line_items.iter().map(LineItemDto::from).collect(),
            payment_method: order.payment_method.as_str().to_string(),
            total_amount: order.total_amount,
            status: order.status.as_str().to_string(),
            purchase_date: order.purchase_date,
        }
    }
}

/// Purchaser summary attached to the administrative order listing. `None`
/// when the account was deleted after the purchase.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaserDto {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<&User> for PurchaserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_str().to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderDto {
    pub id: String,
    pub user: Option<PurchaserDto>,
    pub products: Vec<LineItemDto>,
    pub payment_method: String,
    pub total_amount: f64,
    pub status: String,
    pub purchase_date: DateTime<Utc>,
}

impl AdminOrderDto {
    #[must_use]
    pub fn from_order(order: &Order, purchaser: Option<&User>) -> Self {
        Self {
            id: order.id.as_str().to_string(),
            user: purchaser.map(PurchaserDto::from),
            products: order.line_items.iter().map(LineItemDto::from).collect(),
            payment_method: order.payment_method.as_str().to_string(),
            total_amount: order.total_amount,
            status: order.status.as_str().to_string(),
            purchase_date: order.purchase_date,
        }
    }
}

/// Account shape on the wire; the password hash and verification token never
/// leave the server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub google_id: Option<String>,
    pub profile_image: Option<ImageRef>,
    pub verified: bool,
    pub orders: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_str().to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            google_id: user.google_id.clone(),
            profile_image: user.profile_image.clone(),
            verified: user.verified,
            orders: user
                .order_ids
                .iter()
                .map(|id: &OrderId| id.as_str().to_string())
                .collect(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub images: Vec<ImageRef>,
    pub created_at: DateTime<Utc>,
}

impl From<&Product> for ProductDto {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_str().to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            category: product.category.clone(),
            images: product.images.clone(),
            created_at: product.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderEnvelope {
    pub message: String,
    pub transaction: OrderDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazari_model::{OrderStatus, PaymentMethod, ProductId, UserId};
    use chrono::TimeZone;

    fn sample_order() -> Order {
        Order {
            id: OrderId::parse("o1").expect("id"),
            user: UserId::parse("u1").expect("id"),
            line_items: vec![LineItem {
                product: ProductId::parse("p1").expect("id"),
                quantity: 2,
                name: "Lamp".to_string(),
                category: "home".to_string(),
                price: 100.0,
                images: vec![ImageRef {
                    public_id: "img1".to_string(),
                    url: "https://assets.example/img1".to_string(),
                }],
            }],
            payment_method: PaymentMethod::CreditCard,
            total_amount: 200.0,
            status: OrderStatus::Pending,
            purchase_date: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn order_dto_uses_camel_case_wire_names() {
        let value = serde_json::to_value(OrderDto::from(&sample_order())).expect("serialize");
        assert_eq!(value["paymentMethod"], "credit-card");
        assert_eq!(value["totalAmount"], 200.0);
        assert_eq!(value["status"], "Pending");
        assert_eq!(value["products"][0]["quantity"], 2);
        assert_eq!(value["products"][0]["images"][0]["public_id"], "img1");
    }

    #[test]
    fn create_order_request_accepts_partial_bodies() {
        let req: CreateOrderRequest =
            serde_json::from_str(r#"{"paymentMethod":"paypal"}"#).expect("deserialize");
        assert!(req.products.is_none());
        assert_eq!(req.payment_method.as_deref(), Some("paypal"));
        assert!(req.user_id.is_none());
    }
}
