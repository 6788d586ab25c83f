// SPDX-License-Identifier: Apache-2.0

//! Compact signed bearer tokens: `bz1.<base64url claims>.<base64url sig>`,
//! HMAC-SHA256 over the claims segment with the server-held secret. Claims
//! carry the holder's identity and role; verification never touches the
//! database, so role claims can be stale until the next issuance.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bazari_model::{Role, User};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_VERSION: &str = "bz1";
const MAX_TOKEN_LEN: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TokenError {
    InvalidFormat(String),
    InvalidSignature,
    Expired,
}

impl Display for TokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat(msg) => write!(f, "malformed token: {msg}"),
            Self::InvalidSignature => f.write_str("token signature mismatch"),
            Self::Expired => f.write_str("token expired"),
        }
    }
}

impl std::error::Error for TokenError {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// The holder's user id.
    pub sub: String,
    pub role: Role,
    pub iat: u64,
    pub exp: u64,
}

#[must_use]
pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[derive(Clone)]
pub struct TokenSigner {
    secret: Arc<String>,
    ttl_secs: u64,
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: String, ttl_secs: u64) -> Self {
        Self {
            secret: Arc::new(secret),
            ttl_secs,
        }
    }

    /// Claims for `user` issued now, expiring after the configured ttl.
    #[must_use]
    pub fn issue(&self, user: &User) -> String {
        let iat = now_unix();
        self.sign_claims(&Claims {
            sub: user.id.as_str().to_string(),
            role: user.role,
            iat,
            exp: iat + self.ttl_secs,
        })
    }

    #[must_use]
    pub fn sign_claims(&self, claims: &Claims) -> String {
        let payload = serde_json::to_vec(claims).unwrap_or_default();
        let payload_part = URL_SAFE_NO_PAD.encode(payload);
        let sig_part = URL_SAFE_NO_PAD.encode(self.signature(&payload_part));
        format!("{TOKEN_VERSION}.{payload_part}.{sig_part}")
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        if token.len() > MAX_TOKEN_LEN {
            return Err(TokenError::InvalidFormat(
                "token exceeds max length".to_string(),
            ));
        }
        let parts: Vec<&str> = token.split('.').collect();
        let (payload_part, sig_part) = match parts.as_slice() {
            [version, payload, sig] if *version == TOKEN_VERSION => (*payload, *sig),
            [version, _, _] => {
                return Err(TokenError::InvalidFormat(format!(
                    "unsupported token version: {version}"
                )))
            }
            _ => return Err(TokenError::InvalidFormat("invalid token format".to_string())),
        };

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| TokenError::InvalidFormat(e.to_string()))?;
        mac.update(payload_part.as_bytes());
        let expected = URL_SAFE_NO_PAD
            .decode(sig_part)
            .map_err(|e| TokenError::InvalidFormat(e.to_string()))?;
        mac.verify_slice(&expected)
            .map_err(|_| TokenError::InvalidSignature)?;

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_part)
            .map_err(|e| TokenError::InvalidFormat(e.to_string()))?;
        let claims: Claims = serde_json::from_slice(&payload_bytes)
            .map_err(|e| TokenError::InvalidFormat(e.to_string()))?;
        if claims.exp <= now_unix() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn signature(&self, payload_part: &str) -> Vec<u8> {
        let mut mac = match HmacSha256::new_from_slice(self.secret.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => return Vec::new(),
        };
        mac.update(payload_part.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazari_model::UserId;
    use chrono::Utc;

    fn signer() -> TokenSigner {
        TokenSigner::new("test-secret".to_string(), 3600)
    }

    fn sample_user(role: Role) -> User {
        User {
            id: UserId::parse("u1").expect("id"),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: None,
            role,
            google_id: None,
            profile_image: None,
            verified: true,
            verification_token: None,
            order_ids: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_tokens_verify_and_carry_identity_and_role() {
        let signer = signer();
        let token = signer.issue(&sample_user(Role::Admin));
        let claims = signer.verify(&token).expect("verifies");
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn tampered_payloads_are_rejected() {
        let signer = signer();
        let token = signer.issue(&sample_user(Role::User));
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = Claims {
            sub: "u1".to_string(),
            role: Role::Admin,
            iat: now_unix(),
            exp: now_unix() + 3600,
        };
        parts[1] = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).expect("encode"));
        let tampered = parts.join(".");
        assert_eq!(
            signer.verify(&tampered).expect_err("forged payload"),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn wrong_secret_fails_signature_check() {
        let token = signer().issue(&sample_user(Role::User));
        let other = TokenSigner::new("other-secret".to_string(), 3600);
        assert_eq!(
            other.verify(&token).expect_err("wrong secret"),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let signer = signer();
        let iat = now_unix() - 7200;
        let token = signer.sign_claims(&Claims {
            sub: "u1".to_string(),
            role: Role::User,
            iat,
            exp: iat + 3600,
        });
        assert_eq!(signer.verify(&token).expect_err("stale"), TokenError::Expired);
    }

    #[test]
    fn garbage_and_foreign_versions_are_malformed() {
        let signer = signer();
        assert!(matches!(
            signer.verify("not-a-token").expect_err("garbage"),
            TokenError::InvalidFormat(_)
        ));
        let token = signer.issue(&sample_user(Role::User));
        let downgraded = token.replacen("bz1.", "bz0.", 1);
        assert!(matches!(
            signer.verify(&downgraded).expect_err("version"),
            TokenError::InvalidFormat(_)
        ));
    }
}
