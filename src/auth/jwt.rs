use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::auth::claims::{Claims, TokenPurpose};
use crate::config::JwtConfig;
use crate::error::AuthError;
use crate::state::AppState;

/// Holds the signing and verification keys plus the two TTL windows.
/// Built once from config; no key rotation support.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub session_ttl: Duration,
    pub reset_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            session_ttl_days,
            reset_ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            session_ttl: Duration::from_secs((session_ttl_days as u64) * 24 * 60 * 60),
            reset_ttl: Duration::from_secs((reset_ttl_minutes as u64) * 60),
        }
    }
}

impl JwtKeys {
    fn sign_with_purpose(&self, user_id: Uuid, purpose: TokenPurpose) -> Result<String, AuthError> {
        let now = OffsetDateTime::now_utc();
        let ttl = match purpose {
            TokenPurpose::Session => self.session_ttl,
            TokenPurpose::PasswordReset => self.reset_ttl,
        };
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            purpose,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))?;
        debug!(user_id = %user_id, purpose = ?purpose, "jwt signed");
        Ok(token)
    }

    /// Issues a login token (7-day window by default).
    pub fn sign_session(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.sign_with_purpose(user_id, TokenPurpose::Session)
    }

    /// Issues a password-reset token (1-hour window by default).
    pub fn sign_reset(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.sign_with_purpose(user_id, TokenPurpose::PasswordReset)
    }

    /// Decodes and checks signature and expiry. Expired tokens are
    /// distinguished from malformed ones so the boundary can tell the
    /// client to re-authenticate rather than flat-out reject.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::default();
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            }
        })?;
        debug!(user_id = %data.claims.sub, purpose = ?data.claims.purpose, "jwt verified");
        Ok(data.claims)
    }

    /// Verifies a token presented as a login session. A reset token must
    /// not be replayed here.
    pub fn verify_session(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.verify(token)?;
        if claims.purpose != TokenPurpose::Session {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }

    /// Verifies a password-reset token. A session token is not accepted.
    pub fn verify_reset(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.verify(token)?;
        if claims.purpose != TokenPurpose::PasswordReset {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }
}
