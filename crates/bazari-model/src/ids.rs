// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const ID_MAX_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    Empty(&'static str),
    Trimmed(&'static str),
    TooLong(&'static str, usize),
    Unknown(&'static str, String),
    Negative(&'static str),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(name) => write!(f, "{name} must not be empty"),
            Self::Trimmed(name) => {
                write!(f, "{name} must not contain leading/trailing whitespace")
            }
            Self::TooLong(name, max) => write!(f, "{name} exceeds max length {max}"),
            Self::Unknown(name, value) => write!(f, "unknown {name}: {value}"),
            Self::Negative(name) => write!(f, "{name} must be non-negative"),
        }
    }
}

impl std::error::Error for ParseError {}

fn check_id(name: &'static str, input: &str) -> Result<(), ParseError> {
    if input.is_empty() {
        return Err(ParseError::Empty(name));
    }
    if input.trim() != input {
        return Err(ParseError::Trimmed(name));
    }
    if input.len() > ID_MAX_LEN {
        return Err(ParseError::TooLong(name, ID_MAX_LEN));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        check_id("user id", input)?;
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        check_id("product id", input)?;
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        check_id("order id", input)?;
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
