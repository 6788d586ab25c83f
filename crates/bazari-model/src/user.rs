// SPDX-License-Identifier: Apache-2.0

use crate::ids::{OrderId, ParseError, UserId};
use crate::product::ImageRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        match input {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(ParseError::Unknown("role", other.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A storefront account. `password_hash` is absent for accounts provisioned
/// through a third-party identity provider; `order_ids` is a non-owning
/// history index over orders, appended on every purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: Role,
    pub google_id: Option<String>,
    pub profile_image: Option<ImageRef>,
    pub verified: bool,
    pub verification_token: Option<String>,
    pub order_ids: Vec<OrderId>,
    pub created_at: DateTime<Utc>,
}
