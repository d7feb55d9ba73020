use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::state::AppState;
use crate::users::repo_types::User;

/// Sessions are valid for 7 days from issuance. There is no refresh and no
/// server-side revocation; expiry is the only end of life.
pub const SESSION_TTL: Duration = Duration::days(7);

/// Self-contained identity claims. Trusted only because the signature
/// verifies; no store lookup is needed to establish who the caller is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub name: String,
    pub email: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    pub avatar: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Clone)]
pub struct SessionKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        let secret = state.config.jwt_secret.as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl SessionKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, user: &User) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = SessionClaims {
            sub: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            avatar: user.avatar.clone(),
            iat: now.unix_timestamp() as usize,
            exp: (now + SESSION_TTL).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user.id, "session token issued");
        Ok(token)
    }

    /// Malformed, expired and forged tokens all fail the same way here;
    /// callers translate any failure into a single 401.
    pub fn verify(&self, token: &str) -> anyhow::Result<SessionClaims> {
        let validation = Validation::default();
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "session token verified");
        Ok(data.claims)
    }
}
