// SPDX-License-Identifier: Apache-2.0

use crate::ids::{ParseError, ProductId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const NAME_MAX_LEN: usize = 256;

/// Reference into the external asset host: the host-side identifier plus a
/// retrievable URL. The binary payload never passes through this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub public_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub images: Vec<ImageRef>,
    pub created_at: DateTime<Utc>,
}

pub fn validate_price(price: f64) -> Result<(), ParseError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ParseError::Negative("price"));
    }
    Ok(())
}
