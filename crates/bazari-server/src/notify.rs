// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use std::fmt::{Display, Formatter};
use tracing::info;

#[derive(Debug)]
pub struct MailError(pub String);

impl Display for MailError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "mail delivery failed: {}", self.0)
    }
}

impl std::error::Error for MailError {}

/// Outbound notification contract. Delivery transport is a deployment
/// concern; the server only depends on this interface.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// Writes the message to the log instead of a wire. Stands in wherever no
/// real transport is configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        info!(to, subject, body_bytes = body.len(), "outbound mail");
        Ok(())
    }
}
