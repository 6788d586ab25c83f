// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub struct VerifyError(pub String);

impl Display for VerifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "third-party verification failed: {}", self.0)
    }
}

impl std::error::Error for VerifyError {}

/// The identity the provider vouches for. `subject` is the provider-side
/// stable id stored on the user record.
#[derive(Debug, Clone)]
pub struct ThirdPartyIdentity {
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
}

#[async_trait]
pub trait ThirdPartyVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<ThirdPartyIdentity, VerifyError>;
}

const TOKENINFO_ENDPOINT: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
}

/// Verifies Google ID tokens against the tokeninfo endpoint. When a client
/// id is configured, the token's audience must match it.
pub struct GoogleTokenVerifier {
    http: reqwest::Client,
    client_id: Option<String>,
}

impl GoogleTokenVerifier {
    #[must_use]
    pub fn new(client_id: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
        }
    }
}

#[async_trait]
impl ThirdPartyVerifier for GoogleTokenVerifier {
    async fn verify(&self, id_token: &str) -> Result<ThirdPartyIdentity, VerifyError> {
        let response = self
            .http
            .get(TOKENINFO_ENDPOINT)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| VerifyError(format!("tokeninfo request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(VerifyError(format!(
                "tokeninfo rejected the token: {}",
                response.status()
            )));
        }
        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| VerifyError(format!("tokeninfo response unreadable: {e}")))?;
        if let Some(client_id) = &self.client_id {
            if &info.aud != client_id {
                return Err(VerifyError("token audience mismatch".to_string()));
            }
        }
        Ok(ThirdPartyIdentity {
            subject: info.sub,
            email: info.email,
            name: info.name,
        })
    }
}
