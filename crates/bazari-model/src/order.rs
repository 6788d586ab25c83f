// SPDX-License-Identifier: Apache-2.0

use crate::ids::{OrderId, ParseError, ProductId, UserId};
use crate::product::ImageRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const PAYMENT_METHODS: [PaymentMethod; 3] = [
    PaymentMethod::CreditCard,
    PaymentMethod::Paypal,
    PaymentMethod::BankTransfer,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    CreditCard,
    Paypal,
    BankTransfer,
}

impl PaymentMethod {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        match input {
            "credit-card" => Ok(Self::CreditCard),
            "paypal" => Ok(Self::Paypal),
            "bank-transfer" => Ok(Self::BankTransfer),
            other => Err(ParseError::Unknown("payment method", other.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "credit-card",
            Self::Paypal => "paypal",
            Self::BankTransfer => "bank-transfer",
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const STATUSES: [OrderStatus; 4] = [
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::Completed,
    OrderStatus::Cancelled,
];

/// `Pending` is the only state set at creation. `Completed` and `Cancelled`
/// are conventionally terminal; whether transitions out of them are allowed
/// is a policy decision made by the caller, not encoded here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        match input {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Completed" => Ok(Self::Completed),
            "Cancelled" => Ok(Self::Cancelled),
            other => Err(ParseError::Unknown("status", other.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One purchased product inside an order. Everything except `product` and
/// `quantity` is a point-in-time copy of the catalog record: later edits or
/// deletion of the product must not alter an order already written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product: ProductId,
    pub quantity: u32,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub images: Vec<ImageRef>,
}

impl LineItem {
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user: UserId,
    pub line_items: Vec<LineItem>,
    pub payment_method: PaymentMethod,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub purchase_date: DateTime<Utc>,
}

/// Sum of the snapshotted line totals. Evaluated once when the order is
/// created; the stored `total_amount` is never recomputed afterwards.
#[must_use]
pub fn compute_total(items: &[LineItem]) -> f64 {
    items.iter().map(LineItem::line_total).sum()
}
